//! Capability traits consumed by the conversation engine.

use async_trait::async_trait;
use colloquy_core::{
    GenerateRequest, GenerateResponse, GenerationStart, ObservationId, ObservationStatus,
    ObservationUpdate, SpanStart,
};
use colloquy_error::ColloquyResult;

/// Completion capability: turn a message sequence into a reply.
///
/// Implementations make exactly one outbound call per `generate` and never
/// retry on their own.
#[async_trait]
pub trait ColloquyDriver: Send + Sync {
    /// Generate a reply for the given request.
    async fn generate(&self, req: &GenerateRequest) -> ColloquyResult<GenerateResponse>;

    /// Provider name (e.g., "openai").
    fn provider_name(&self) -> &'static str;

    /// Model used when the request does not name one.
    fn model_name(&self) -> &str;
}

/// Telemetry capability: record nested spans and generations, flush durably.
///
/// Every unit follows the same lifecycle: `start_*` issues an id, `update` is
/// applied at most once, and `end` releases it exactly once. Backends may
/// buffer everything until [`flush`](Self::flush).
#[async_trait]
pub trait TelemetryBackend: Send + Sync {
    /// Backend name (e.g., "langfuse").
    fn backend_name(&self) -> &'static str;

    /// Open a span. Spans without a parent start a new trace.
    fn start_span(&self, start: &SpanStart) -> ColloquyResult<ObservationId>;

    /// Open a generation, normally nested inside a span.
    fn start_generation(&self, start: &GenerationStart) -> ColloquyResult<ObservationId>;

    /// Attach the output payload (and usage, for generations).
    fn update(&self, id: &ObservationId, update: &ObservationUpdate) -> ColloquyResult<()>;

    /// Release the unit.
    fn end(&self, id: &ObservationId, status: &ObservationStatus) -> ColloquyResult<()>;

    /// Block until every previously recorded unit is durably delivered.
    async fn flush(&self) -> ColloquyResult<()>;
}
