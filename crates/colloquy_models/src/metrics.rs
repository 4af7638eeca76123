//! Metrics for completion calls.
//!
//! OpenTelemetry instruments for request counts, failures, latency and token
//! usage. Without an installed meter provider they are no-ops.

use colloquy_error::{ModelsError, ModelsErrorKind, OpenAIErrorKind};
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram, Meter},
};
use std::sync::OnceLock;

static METRICS: OnceLock<LlmMetrics> = OnceLock::new();

/// Metrics for completion API interactions, labeled by provider and model.
#[derive(Clone)]
pub struct LlmMetrics {
    /// Meter handle kept alive for metric instruments
    _meter: Meter,
    /// Total completion requests
    pub requests: Counter<u64>,
    /// Failed completion requests
    pub errors: Counter<u64>,
    /// Completion call duration in seconds
    pub duration: Histogram<f64>,
    /// Total tokens used (prompt + completion)
    pub tokens_used: Counter<u64>,
    /// Prompt tokens used
    pub prompt_tokens: Counter<u64>,
    /// Completion tokens used
    pub completion_tokens: Counter<u64>,
}

impl LlmMetrics {
    fn init() -> Self {
        let meter = global::meter("colloquy_llm");

        Self {
            _meter: meter.clone(),
            requests: meter
                .u64_counter("llm.requests")
                .with_description("Total completion requests")
                .build(),
            errors: meter
                .u64_counter("llm.errors")
                .with_description("Failed completion requests")
                .build(),
            duration: meter
                .f64_histogram("llm.duration")
                .with_unit("seconds")
                .with_description("Completion call duration")
                .build(),
            tokens_used: meter
                .u64_counter("llm.tokens")
                .with_description("Total tokens used (prompt + completion)")
                .build(),
            prompt_tokens: meter
                .u64_counter("llm.tokens.prompt")
                .with_description("Prompt tokens used")
                .build(),
            completion_tokens: meter
                .u64_counter("llm.tokens.completion")
                .with_description("Completion tokens used")
                .build(),
        }
    }

    /// Get the global metrics instance.
    pub fn get() -> &'static Self {
        METRICS.get_or_init(Self::init)
    }

    /// Record a successful completion request.
    pub fn record_request(&self, provider: &str, model: &str, duration_secs: f64) {
        let labels = &[
            KeyValue::new("provider", provider.to_string()),
            KeyValue::new("model", model.to_string()),
        ];
        self.requests.add(1, labels);
        self.duration.record(duration_secs, labels);
    }

    /// Record a failed completion request.
    pub fn record_error(&self, provider: &str, model: &str, error_type: &str) {
        let labels = &[
            KeyValue::new("provider", provider.to_string()),
            KeyValue::new("model", model.to_string()),
            KeyValue::new("error_type", error_type.to_string()),
        ];
        self.errors.add(1, labels);
    }

    /// Record token usage from a completion.
    pub fn record_tokens(
        &self,
        model: &str,
        prompt_tokens: u64,
        completion_tokens: u64,
        total_tokens: u64,
    ) {
        let labels = &[KeyValue::new("model", model.to_string())];
        self.tokens_used.add(total_tokens, labels);
        self.prompt_tokens.add(prompt_tokens, labels);
        self.completion_tokens.add(completion_tokens, labels);
    }
}

/// Classify an error for metrics labeling.
///
/// Returns one of: "rate_limit", "auth", "timeout", "network", "empty_reply",
/// "invalid_request", "parse", "unknown".
pub fn classify_error(error: &ModelsError) -> &'static str {
    match &error.kind {
        ModelsErrorKind::OpenAI(kind) => match kind {
            OpenAIErrorKind::RateLimit(_) => "rate_limit",
            OpenAIErrorKind::Unauthorized(_) => "auth",
            OpenAIErrorKind::Timeout(_) => "timeout",
            OpenAIErrorKind::Http(_) => "network",
            OpenAIErrorKind::Api { status, .. } if (400..500).contains(status) => {
                "invalid_request"
            }
            OpenAIErrorKind::Api { .. } => "unknown",
            OpenAIErrorKind::Parse(_) => "parse",
        },
        ModelsErrorKind::EmptyReply(_) => "empty_reply",
        ModelsErrorKind::Builder(_) => "invalid_request",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_provider_errors() {
        let rate = ModelsError::new(OpenAIErrorKind::from_status(429, "quota").into());
        assert_eq!(classify_error(&rate), "rate_limit");

        let auth = ModelsError::new(OpenAIErrorKind::from_status(401, "bad key").into());
        assert_eq!(classify_error(&auth), "auth");

        let empty = ModelsError::new(ModelsErrorKind::EmptyReply("gpt".to_string()));
        assert_eq!(classify_error(&empty), "empty_reply");

        let timeout = ModelsError::new(OpenAIErrorKind::Timeout("100ms elapsed".into()).into());
        assert_eq!(classify_error(&timeout), "timeout");
    }

    #[test]
    fn classification_ignores_message_text() {
        let network = ModelsError::new(OpenAIErrorKind::Http("429 401 rate limit".into()).into());
        assert_eq!(classify_error(&network), "network");

        let bad_request = ModelsError::new(
            OpenAIErrorKind::from_status(400, "unauthorized model").into(),
        );
        assert_eq!(classify_error(&bad_request), "invalid_request");

        let server = ModelsError::new(OpenAIErrorKind::from_status(503, "timeout upstream").into());
        assert_eq!(classify_error(&server), "unknown");
    }
}
