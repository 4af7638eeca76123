//! Completion provider errors.

/// OpenAI-compatible chat-completions error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum OpenAIErrorKind {
    /// Request never reached the server or the connection dropped
    #[display("Request failed: {}", _0)]
    Http(String),
    /// No response within the client timeout
    #[display("Request timed out: {}", _0)]
    Timeout(String),
    /// Server answered with a non-success status
    #[display("API error {}: {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },
    /// Quota or rate limit exhausted (HTTP 429)
    #[display("Rate limited: {}", _0)]
    RateLimit(String),
    /// Credentials rejected (HTTP 401/403)
    #[display("Unauthorized: {}", _0)]
    Unauthorized(String),
    /// Response body did not match the chat-completions schema
    #[display("Failed to parse response: {}", _0)]
    Parse(String),
}

impl OpenAIErrorKind {
    /// Classify a non-success HTTP status into an error kind.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            429 => Self::RateLimit(message),
            401 | 403 => Self::Unauthorized(message),
            _ => Self::Api { status, message },
        }
    }
}

/// Model provider error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::From)]
pub enum ModelsErrorKind {
    /// OpenAI-compatible endpoint error
    #[display("OpenAI: {}", _0)]
    OpenAI(OpenAIErrorKind),

    /// The completion contained no reply text
    #[display("Model '{}' returned no reply text", _0)]
    #[from(ignore)]
    EmptyReply(String),

    /// Builder error (derive_builder failures)
    #[display("Builder error: {}", _0)]
    #[from(ignore)]
    Builder(String),
}

/// Model provider error with location tracking.
///
/// # Examples
///
/// ```
/// use colloquy_error::{ModelsError, ModelsErrorKind, OpenAIErrorKind};
///
/// let err = ModelsError::new(OpenAIErrorKind::from_status(429, "slow down").into());
/// assert!(matches!(err.kind, ModelsErrorKind::OpenAI(OpenAIErrorKind::RateLimit(_))));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Models Error: {} at {}:{}", kind, file, line)]
pub struct ModelsError {
    /// The specific error kind
    pub kind: ModelsErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// Source file where error occurred
    pub file: &'static str,
}

impl ModelsError {
    /// Create a new models error.
    #[track_caller]
    pub fn new(kind: ModelsErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Result type for model operations.
pub type ModelsResult<T> = Result<T, ModelsError>;
