//! Role types for conversation participants.

use serde::{Deserialize, Serialize};

/// Who authored a message.
///
/// Serializes in lowercase, matching the chat-completions wire format.
///
/// # Examples
///
/// ```
/// use colloquy_core::Role;
///
/// assert_ne!(Role::User, Role::Assistant);
/// assert_eq!(format!("{}", Role::System), "system");
/// assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Fixed instruction placed ahead of the conversation
    #[display("system")]
    System,
    /// Prompt from the simulated user
    #[display("user")]
    User,
    /// Reply from the model
    #[display("assistant")]
    Assistant,
}
