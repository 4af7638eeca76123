//! Value types exchanged with telemetry backends.
//!
//! A telemetry unit (span or generation) is started with a [`SpanStart`] or
//! [`GenerationStart`], identified afterwards by an opaque [`ObservationId`],
//! updated at most once with an [`ObservationUpdate`], and released with an
//! [`ObservationStatus`].

use crate::TokenUsage;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Opaque handle to an open telemetry unit, issued by the backend.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[serde(transparent)]
pub struct ObservationId(String);

impl ObservationId {
    /// Wrap a backend-issued identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The two shapes of telemetry unit.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ObservationKind {
    /// A span grouping nested work (one per session)
    Span,
    /// A model call with usage accounting (one per turn)
    Generation,
}

/// Trace-level correlation keys attached to root spans.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into, strip_option), default)]
pub struct TraceCorrelation {
    /// Session the trace belongs to
    session_id: Option<String>,
    /// User the trace belongs to
    user_id: Option<String>,
}

impl TraceCorrelation {
    /// Creates a new correlation builder.
    pub fn builder() -> TraceCorrelationBuilder {
        TraceCorrelationBuilder::default()
    }
}

/// Parameters for opening a span.
///
/// # Examples
///
/// ```
/// use colloquy_core::SpanStart;
/// use serde_json::json;
///
/// let start = SpanStart::builder()
///     .name("conversation_session_alice_s1")
///     .input(json!({"user_id": "alice"}))
///     .build()
///     .unwrap();
///
/// assert!(start.parent().is_none());
/// assert_eq!(start.metadata(), &json!(null));
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct SpanStart {
    /// Display name of the span
    name: String,
    /// Input payload
    #[builder(default)]
    input: JsonValue,
    /// Flat annotation record
    #[builder(default)]
    metadata: JsonValue,
    /// Enclosing observation, if nested
    #[builder(default, setter(strip_option))]
    parent: Option<ObservationId>,
    /// Trace correlation keys, honoured on root spans
    #[builder(default)]
    correlation: TraceCorrelation,
}

impl SpanStart {
    /// Creates a new span start builder.
    pub fn builder() -> SpanStartBuilder {
        SpanStartBuilder::default()
    }
}

/// Parameters for opening a generation.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct GenerationStart {
    /// Display name of the generation
    name: String,
    /// Model identifier
    model: String,
    /// Sampling parameters (temperature, max_tokens)
    #[builder(default)]
    model_parameters: JsonValue,
    /// Input payload
    #[builder(default)]
    input: JsonValue,
    /// Flat annotation record
    #[builder(default)]
    metadata: JsonValue,
    /// Enclosing observation, if nested
    #[builder(default, setter(strip_option))]
    parent: Option<ObservationId>,
}

impl GenerationStart {
    /// Creates a new generation start builder.
    pub fn builder() -> GenerationStartBuilder {
        GenerationStartBuilder::default()
    }
}

/// The single update applied to a unit before it closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ObservationUpdate {
    /// Output payload
    output: JsonValue,
    /// Token usage, for generations
    usage: Option<TokenUsage>,
}

impl ObservationUpdate {
    /// An update carrying only an output payload.
    pub fn new(output: impl Into<JsonValue>) -> Self {
        Self {
            output: output.into(),
            usage: None,
        }
    }

    /// An update carrying an output payload and token usage.
    pub fn with_usage(output: impl Into<JsonValue>, usage: TokenUsage) -> Self {
        Self {
            output: output.into(),
            usage: Some(usage),
        }
    }
}

/// How a unit was released.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum ObservationStatus {
    /// Updated with its output, then released
    #[display("completed")]
    Completed,
    /// Released without an update
    #[display("abandoned")]
    Abandoned,
    /// The guarded work failed
    #[display("failed: {}", _0)]
    Failed(String),
}
