//! Telemetry backend error types.

/// Specific error conditions for telemetry backends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum TelemetryErrorKind {
    /// Observation id was never started or already ended
    #[display("Unknown observation: {}", _0)]
    UnknownObservation(String),
    /// Observation was updated more than once
    #[display("Observation '{}' already updated", _0)]
    AlreadyUpdated(String),
    /// Internal buffer lock was poisoned by a panicking thread
    #[display("Telemetry buffer lock poisoned")]
    LockPoisoned,
    /// Ingestion request could not be sent
    #[display("Ingestion request failed: {}", _0)]
    Http(String),
    /// Ingestion endpoint rejected the batch
    #[display("Ingestion rejected with status {}: {}", status, message)]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },
    /// Some events in an accepted batch failed
    #[display("{} of {} ingestion events failed", failed, total)]
    PartialFailure {
        /// Number of failed events
        failed: usize,
        /// Number of events sent
        total: usize,
    },
    /// Exporter failed to flush
    #[display("Exporter flush failed: {}", _0)]
    Export(String),
}

/// Error type for telemetry operations.
///
/// # Examples
///
/// ```
/// use colloquy_error::{TelemetryError, TelemetryErrorKind};
///
/// let err = TelemetryError::new(TelemetryErrorKind::LockPoisoned);
/// assert!(format!("{}", err).contains("poisoned"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Telemetry Error: {} at line {} in {}", kind, line, file)]
pub struct TelemetryError {
    /// The specific error condition
    pub kind: TelemetryErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl TelemetryError {
    /// Create a new TelemetryError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TelemetryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
