//! Colloquy: simulated multi-user LLM conversations with tracing.
//!
//! Scripted users hold multi-turn conversations with a chat-completions model.
//! Every session becomes a trace span and every turn a generation carrying the
//! prompt, reply, sampling parameters and token usage.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use colloquy::{ColloquyConfig, run};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ColloquyConfig::load()?;
//!     let summary = run(&config).await?;
//!     println!("{} sessions", summary.sessions().len());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `colloquy_error` - Error types
//! - `colloquy_core` - Messages, history, telemetry value types
//! - `colloquy_interface` - `ColloquyDriver` and `TelemetryBackend` traits
//! - `colloquy_models` - OpenAI chat-completions driver
//! - `colloquy_telemetry` - Langfuse, OpenTelemetry and in-memory backends
//! - `colloquy_conversation` - Turn executor, session orchestrator, scenario runner
//!
//! This crate re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod app;
mod config;
mod observability;

pub use app::{build_driver, build_telemetry, load_catalog, run};
pub use config::{
    ColloquyConfig, CompletionConfig, ConversationConfig, LoggingConfig, ScenariosConfig,
    TelemetryConfig,
};
pub use observability::{ObservabilityConfig, ObservabilityGuard, init_observability_with_config};

pub use colloquy_conversation::*;
pub use colloquy_core::*;
pub use colloquy_error::*;
pub use colloquy_interface::*;
pub use colloquy_models::*;
pub use colloquy_telemetry::*;
