//! Error types for Colloquy.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! Every error converts into [`ColloquyError`] so `?` works across crates.
//!
//! # Examples
//!
//! ```
//! use colloquy_error::{ColloquyResult, ConfigError};
//!
//! fn api_key() -> ColloquyResult<String> {
//!     Err(ConfigError::new("OPENAI_API_KEY not set"))?
//! }
//!
//! assert!(api_key().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod error;
mod models;
mod scenario;
mod telemetry;

pub use builder::{BuilderError, BuilderErrorKind};
pub use config::ConfigError;
pub use error::{ColloquyError, ColloquyErrorKind, ColloquyResult};
pub use models::{ModelsError, ModelsErrorKind, ModelsResult, OpenAIErrorKind};
pub use scenario::{ScenarioError, ScenarioErrorKind};
pub use telemetry::{TelemetryError, TelemetryErrorKind};
