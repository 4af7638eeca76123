//! Telemetry backends for Colloquy.
//!
//! Three implementations of [`TelemetryBackend`](colloquy_interface::TelemetryBackend):
//!
//! - [`LangfuseTelemetry`] buffers ingestion events and posts them to a
//!   Langfuse project on flush
//! - [`OtelTelemetry`] records OpenTelemetry spans (stdout exporter by default)
//! - [`InMemoryTelemetry`] keeps everything in process for tests and dry runs

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod in_memory;
mod kind;
pub mod langfuse;
mod otel;

pub use in_memory::{InMemoryTelemetry, RecordedObservation};
pub use kind::TelemetryBackendKind;
pub use langfuse::{LANGFUSE_DEFAULT_HOST, LangfuseTelemetry};
pub use otel::OtelTelemetry;
