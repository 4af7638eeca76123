//! Annotation records attached to session spans and turn generations.

use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};

/// Flat annotation record for a session span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct SessionMetadata {
    /// Unique session id
    session_id: String,
    /// Owning user
    user_id: String,
    /// Turn the record describes (0 before any turn runs)
    turn_number: usize,
    /// Prompts in the session script
    total_turns: usize,
    /// RFC 3339 local time of creation
    timestamp: String,
}

impl SessionMetadata {
    /// The record as a flat JSON object.
    pub fn to_json(&self) -> JsonValue {
        json!({
            "session_id": self.session_id,
            "user_id": self.user_id,
            "turn_number": self.turn_number,
            "total_turns": self.total_turns,
            "timestamp": self.timestamp,
        })
    }
}

/// Flat annotation record for one turn's generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct TurnMetadata {
    /// Unique session id
    session_id: String,
    /// Owning user
    user_id: String,
    /// 1-based turn number
    turn_number: usize,
    /// Model requested
    model: String,
    /// Sampling temperature
    temperature: f64,
    /// Reply length cap
    max_tokens: u32,
    /// RFC 3339 local time of creation
    timestamp: String,
}

impl TurnMetadata {
    /// The record as a flat JSON object.
    pub fn to_json(&self) -> JsonValue {
        json!({
            "session_id": self.session_id,
            "user_id": self.user_id,
            "turn_number": self.turn_number,
            "model": self.model,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "timestamp": self.timestamp,
        })
    }
}

fn timestamp() -> String {
    chrono::Local::now().to_rfc3339()
}

/// Build the annotation record for a session span.
///
/// # Examples
///
/// ```
/// use colloquy_conversation::build_session_metadata;
///
/// let metadata = build_session_metadata("alice_s1_20250101_120000", "alice", 0, 3);
/// assert_eq!(*metadata.total_turns(), 3);
/// assert_eq!(metadata.to_json()["user_id"], "alice");
/// ```
pub fn build_session_metadata(
    session_id: &str,
    user_id: &str,
    turn_number: usize,
    total_turns: usize,
) -> SessionMetadata {
    SessionMetadata {
        session_id: session_id.to_string(),
        user_id: user_id.to_string(),
        turn_number,
        total_turns,
        timestamp: timestamp(),
    }
}

/// Build the annotation record for one turn.
pub fn build_turn_metadata(
    session_id: &str,
    user_id: &str,
    turn_number: usize,
    model: &str,
    temperature: f64,
    max_tokens: u32,
) -> TurnMetadata {
    TurnMetadata {
        session_id: session_id.to_string(),
        user_id: user_id.to_string(),
        turn_number,
        model: model.to_string(),
        temperature,
        max_tokens,
        timestamp: timestamp(),
    }
}
