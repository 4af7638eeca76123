//! Scenario catalogs: which users run which scripted sessions.
//!
//! Catalogs are TOML documents. Array-of-tables keep the natural order of
//! users and sessions:
//!
//! ```toml
//! [[users]]
//! id = "alice"
//!
//! [[users.sessions]]
//! label = "session_1"
//! prompts = ["Hi!", "Tell me more."]
//! ```

use colloquy_error::{ScenarioError, ScenarioErrorKind};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, instrument};

const BUILTIN_SCENARIOS: &str = include_str!("scenarios.toml");

/// One scripted session of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct SessionScenario {
    /// Logical session label, unique per user
    label: String,
    /// Prompts, in order
    #[serde(default)]
    prompts: Vec<String>,
}

/// A user and their sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct UserScenario {
    /// User id
    id: String,
    /// Sessions, in order
    #[serde(default)]
    sessions: Vec<SessionScenario>,
}

/// Ordered mapping user → session label → prompts.
///
/// # Examples
///
/// ```
/// use colloquy_conversation::ScenarioCatalog;
///
/// let catalog: ScenarioCatalog = r#"
///     [[users]]
///     id = "alice"
///
///     [[users.sessions]]
///     label = "s1"
///     prompts = ["Hi", "Follow-up"]
/// "#
/// .parse()
/// .unwrap();
///
/// assert_eq!(catalog.session_count(), 1);
/// assert_eq!(catalog.total_turns(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ScenarioCatalog {
    /// Users, in run order
    #[serde(default)]
    users: Vec<UserScenario>,
}

impl ScenarioCatalog {
    /// The catalog bundled with the binary.
    pub fn builtin() -> Result<Self, ScenarioError> {
        BUILTIN_SCENARIOS.parse()
    }

    /// Load and validate a catalog file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ScenarioError::new(ScenarioErrorKind::FileRead(e.to_string())))?;
        content.parse()
    }

    /// Check every structural rule a runnable catalog must satisfy.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, in catalog order.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.users.is_empty() {
            return Err(ScenarioError::new(ScenarioErrorKind::NoUsers));
        }
        for (index, user) in self.users.iter().enumerate() {
            if user.id.trim().is_empty() {
                return Err(ScenarioError::new(ScenarioErrorKind::EmptyUserId(index + 1)));
            }
            if user.sessions.is_empty() {
                return Err(ScenarioError::new(ScenarioErrorKind::NoSessions(
                    user.id.clone(),
                )));
            }
            for session in &user.sessions {
                if session.label.trim().is_empty() {
                    return Err(ScenarioError::new(ScenarioErrorKind::EmptySessionLabel(
                        user.id.clone(),
                    )));
                }
                if session.prompts.is_empty() {
                    return Err(ScenarioError::new(ScenarioErrorKind::NoPrompts {
                        user: user.id.clone(),
                        session: session.label.clone(),
                    }));
                }
                if let Some(blank) = session.prompts.iter().position(|p| p.trim().is_empty()) {
                    return Err(ScenarioError::new(ScenarioErrorKind::BlankPrompt {
                        user: user.id.clone(),
                        session: session.label.clone(),
                        index: blank + 1,
                    }));
                }
            }
        }
        Ok(())
    }

    /// Every (user id, session) pair in run order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &SessionScenario)> {
        self.users.iter().flat_map(|user| {
            user.sessions
                .iter()
                .map(move |session| (user.id.as_str(), session))
        })
    }

    /// Number of sessions across all users.
    pub fn session_count(&self) -> usize {
        self.users.iter().map(|user| user.sessions.len()).sum()
    }

    /// Number of prompts across all sessions.
    pub fn total_turns(&self) -> usize {
        self.entries().map(|(_, session)| session.prompts.len()).sum()
    }
}

impl FromStr for ScenarioCatalog {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let catalog: Self = toml::from_str(s)
            .map_err(|e| ScenarioError::new(ScenarioErrorKind::TomlParse(e.to_string())))?;
        catalog.validate()?;
        debug!(
            users = catalog.users.len(),
            sessions = catalog.session_count(),
            "Parsed scenario catalog"
        );
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_order() {
        let catalog = ScenarioCatalog::builtin().unwrap();
        let entries: Vec<(&str, &str, usize)> = catalog
            .entries()
            .map(|(user, session)| (user, session.label().as_str(), session.prompts().len()))
            .collect();

        assert_eq!(
            entries,
            vec![
                ("nishant_tomar", "session_1", 4),
                ("megha_singh", "session_1", 3),
                ("megha_singh", "session_2", 3),
                ("rajat_rajput", "session_1", 5),
            ]
        );
        assert_eq!(catalog.total_turns(), 15);
    }

    #[test]
    fn test_missing_prompts_field_means_no_prompts() {
        let err = "[[users]]\nid = \"a\"\n\n[[users.sessions]]\nlabel = \"s\"\n"
            .parse::<ScenarioCatalog>()
            .unwrap_err();
        assert!(matches!(err.kind, ScenarioErrorKind::NoPrompts { .. }));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = "[[users]\nid = ".parse::<ScenarioCatalog>().unwrap_err();
        assert!(matches!(err.kind, ScenarioErrorKind::TomlParse(_)));
    }
}
