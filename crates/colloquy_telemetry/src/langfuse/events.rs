//! Langfuse ingestion wire format.
//!
//! Every recorded action becomes one [`IngestionEvent`]; a flush posts them
//! together as an [`IngestionBatch`].

use chrono::{SecondsFormat, Utc};
use colloquy_core::{ObservationKind, TokenUsage};
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};

/// Event type tags understood by `/api/public/ingestion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum IngestionEventType {
    /// Create or upsert a trace
    TraceCreate,
    /// Open a span
    SpanCreate,
    /// Patch a span
    SpanUpdate,
    /// Open a generation
    GenerationCreate,
    /// Patch a generation
    GenerationUpdate,
}

impl IngestionEventType {
    /// The create event for an observation kind.
    pub fn create_for(kind: ObservationKind) -> Self {
        match kind {
            ObservationKind::Span => Self::SpanCreate,
            ObservationKind::Generation => Self::GenerationCreate,
        }
    }

    /// The update event for an observation kind.
    pub fn update_for(kind: ObservationKind) -> Self {
        match kind {
            ObservationKind::Span => Self::SpanUpdate,
            ObservationKind::Generation => Self::GenerationUpdate,
        }
    }
}

/// One envelope in an ingestion batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct IngestionEvent {
    /// Unique event id, used to match per-event errors
    id: String,
    /// When the event was recorded
    timestamp: String,
    /// Event type tag
    #[serde(rename = "type")]
    event_type: IngestionEventType,
    /// Type-specific payload
    body: JsonValue,
}

impl IngestionEvent {
    /// Wrap a body in a fresh envelope stamped with the current time.
    pub fn new(event_type: IngestionEventType, body: JsonValue) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: now(),
            event_type,
            body,
        }
    }
}

/// Request body for `POST /api/public/ingestion`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionBatch {
    /// Events in record order
    pub batch: Vec<IngestionEvent>,
}

/// Per-event failure reported in a multi-status response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IngestionFailure {
    /// Event id the failure refers to
    pub id: String,
    /// HTTP-like status for the event
    pub status: u16,
    /// Reason, when the server gives one
    #[serde(default)]
    pub message: Option<String>,
}

/// Response body of the ingestion endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IngestionResponse {
    /// Accepted events
    #[serde(default)]
    pub successes: Vec<JsonValue>,
    /// Rejected events
    #[serde(default)]
    pub errors: Vec<IngestionFailure>,
}

/// RFC 3339 UTC timestamp with millisecond precision.
pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Usage object in the shape Langfuse expects on generations.
pub fn usage_body(usage: &TokenUsage) -> JsonValue {
    json!({
        "input": usage.input_tokens(),
        "output": usage.output_tokens(),
        "total": usage.total_tokens(),
        "unit": "TOKENS",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_tags() {
        let event = IngestionEvent::new(IngestionEventType::GenerationUpdate, json!({}));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "generation-update");
        assert_eq!(IngestionEventType::TraceCreate.to_string(), "trace-create");
    }

    #[test]
    fn test_response_tolerates_missing_fields() {
        let response: IngestionResponse = serde_json::from_str("{}").unwrap();
        assert!(response.errors.is_empty());

        let response: IngestionResponse = serde_json::from_str(
            r#"{"successes":[],"errors":[{"id":"e1","status":400,"message":"bad"}]}"#,
        )
        .unwrap();
        assert_eq!(response.errors[0].status, 400);
    }
}
