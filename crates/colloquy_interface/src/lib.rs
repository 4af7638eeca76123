//! Trait definitions for Colloquy.
//!
//! This crate defines the two external capabilities the conversation engine
//! depends on: [`ColloquyDriver`] for completions and [`TelemetryBackend`] for
//! hierarchical telemetry. Both are passed in explicitly so tests can swap in
//! doubles.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{ColloquyDriver, TelemetryBackend};
