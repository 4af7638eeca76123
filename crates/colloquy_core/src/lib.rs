//! Core data types for Colloquy.
//!
//! This crate provides the data model shared by the completion drivers, the
//! telemetry backends and the conversation orchestration.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod history;
mod message;
mod request;
mod role;
mod telemetry;
mod usage;

pub use history::ConversationHistory;
pub use message::{Message, MessageBuilder};
pub use request::{
    GenerateRequest, GenerateRequestBuilder, GenerateResponse, GenerateResponseBuilder,
};
pub use role::Role;
pub use telemetry::{
    GenerationStart, GenerationStartBuilder, ObservationId, ObservationKind, ObservationStatus,
    ObservationUpdate, SpanStart, SpanStartBuilder, TraceCorrelation, TraceCorrelationBuilder,
};
pub use usage::TokenUsage;
