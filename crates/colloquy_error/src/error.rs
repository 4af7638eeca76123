//! Top-level error wrapper types.

use crate::{BuilderError, ConfigError, ModelsError, ScenarioError, TelemetryError};

/// Every failure a Colloquy crate can surface.
///
/// # Examples
///
/// ```
/// use colloquy_error::{ColloquyError, TelemetryError, TelemetryErrorKind};
///
/// let telemetry_err = TelemetryError::new(TelemetryErrorKind::LockPoisoned);
/// let err: ColloquyError = telemetry_err.into();
/// assert!(format!("{}", err).contains("Telemetry Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum ColloquyErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
    /// Completion provider error
    #[from(ModelsError)]
    Models(ModelsError),
    /// Telemetry backend error
    #[from(TelemetryError)]
    Telemetry(TelemetryError),
    /// Scenario catalog error
    #[from(ScenarioError)]
    Scenario(ScenarioError),
}

/// Colloquy error with kind discrimination.
///
/// # Examples
///
/// ```
/// use colloquy_error::{ColloquyErrorKind, ColloquyResult, ConfigError};
///
/// fn might_fail() -> ColloquyResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(matches!(err.kind(), ColloquyErrorKind::Config(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Colloquy Error: {}", _0)]
pub struct ColloquyError(Box<ColloquyErrorKind>);

impl ColloquyError {
    /// Create a new error from a kind.
    pub fn new(kind: ColloquyErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ColloquyErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to ColloquyErrorKind
impl<T> From<T> for ColloquyError
where
    T: Into<ColloquyErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Colloquy operations.
pub type ColloquyResult<T> = std::result::Result<T, ColloquyError>;
