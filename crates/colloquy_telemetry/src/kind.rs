//! Backend selection.

use serde::{Deserialize, Serialize};

/// Which telemetry backend a run records into.
///
/// # Examples
///
/// ```
/// use colloquy_telemetry::TelemetryBackendKind;
/// use std::str::FromStr;
///
/// assert_eq!(TelemetryBackendKind::from_str("langfuse").unwrap(), TelemetryBackendKind::Langfuse);
/// assert_eq!(TelemetryBackendKind::Stdout.to_string(), "stdout");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TelemetryBackendKind {
    /// Langfuse ingestion API
    #[default]
    Langfuse,
    /// OpenTelemetry spans printed by the stdout exporter
    Stdout,
    /// Kept in process memory only
    Memory,
}
