//! Multi-turn conversation orchestration for Colloquy.
//!
//! Scripted users hold multi-turn conversations with a completion model while
//! every session and turn is recorded to a telemetry backend:
//!
//! - [`TurnExecutor`] runs one exchange inside a generation-scoped unit
//! - [`SessionOrchestrator`] runs a session's turns inside a session span,
//!   skipping failed turns
//! - [`ScenarioRunner`] runs a [`ScenarioCatalog`] and flushes telemetry once
//!
//! Capabilities are passed in explicitly: a
//! [`ColloquyDriver`](colloquy_interface::ColloquyDriver) for completions and a
//! [`TelemetryBackend`](colloquy_interface::TelemetryBackend) for traces.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod metadata;
mod observation;
mod observer;
mod runner;
mod scenario;
mod session;
mod settings;
mod turn;

pub use metadata::{SessionMetadata, TurnMetadata, build_session_metadata, build_turn_metadata};
pub use observation::Observation;
pub use observer::{ConsoleTranscript, ConversationObserver, SilentObserver};
pub use runner::{RunSummary, ScenarioRunner, SessionIdGenerator};
pub use scenario::{ScenarioCatalog, SessionScenario, UserScenario};
pub use session::{
    SessionDescriptor, SessionDescriptorBuilder, SessionOrchestrator, SessionReport, SessionState,
    TurnOutcome, TurnRecord,
};
pub use settings::{
    ConversationSettings, ConversationSettingsBuilder, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT,
};
pub use turn::{TurnContext, TurnContextBuilder, TurnExecutor, TurnReply};
