//! Scenario catalog error types.

/// Specific error conditions for scenario catalogs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ScenarioErrorKind {
    /// Failed to read catalog file
    #[display("Failed to read scenario file: {}", _0)]
    FileRead(String),
    /// Failed to parse TOML content
    #[display("Failed to parse scenario TOML: {}", _0)]
    TomlParse(String),
    /// Catalog defines no users
    #[display("Scenario catalog defines no users")]
    NoUsers,
    /// A user entry has a blank id
    #[display("User #{} has an empty id", _0)]
    EmptyUserId(usize),
    /// A user entry has no sessions
    #[display("User '{}' has no sessions", _0)]
    NoSessions(String),
    /// A session entry has a blank label
    #[display("User '{}' has a session with an empty label", _0)]
    EmptySessionLabel(String),
    /// A session script has no prompts
    #[display("Session '{}' of user '{}' has no prompts", session, user)]
    NoPrompts {
        /// User id
        user: String,
        /// Session label
        session: String,
    },
    /// A prompt is empty or whitespace
    #[display("Prompt {} of session '{}' (user '{}') is blank", index, session, user)]
    BlankPrompt {
        /// User id
        user: String,
        /// Session label
        session: String,
        /// 1-based prompt position
        index: usize,
    },
}

/// Error type for scenario catalog operations.
///
/// # Examples
///
/// ```
/// use colloquy_error::{ScenarioError, ScenarioErrorKind};
///
/// let err = ScenarioError::new(ScenarioErrorKind::NoUsers);
/// assert!(format!("{}", err).contains("no users"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Scenario Error: {} at line {} in {}", kind, line, file)]
pub struct ScenarioError {
    /// The specific error condition
    pub kind: ScenarioErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ScenarioError {
    /// Create a new ScenarioError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ScenarioErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
