//! Shared helpers for conversation tests.

#![allow(dead_code)]

mod mock_driver;

pub use mock_driver::{MockDriver, MockResponse};

use colloquy_conversation::ConversationSettings;
use std::time::Duration;

/// Default settings without pacing delays.
pub fn fast_settings() -> ConversationSettings {
    ConversationSettings::builder()
        .turn_delay(Duration::ZERO)
        .session_delay(Duration::ZERO)
        .build()
        .expect("build settings")
}
