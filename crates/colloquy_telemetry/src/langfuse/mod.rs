//! Langfuse ingestion backend.

mod client;
mod events;

pub use client::{LANGFUSE_DEFAULT_HOST, LangfuseTelemetry};
pub use events::{
    IngestionBatch, IngestionEvent, IngestionEventType, IngestionFailure, IngestionResponse, now,
    usage_body,
};
