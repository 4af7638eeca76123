//! Conversation tuning knobs.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default model for every turn.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Instruction sent ahead of every turn's history.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Keep responses concise but informative.";

/// Parameters shared by every session of a run.
///
/// Temperature drifts upward with the turn number so later turns sample a
/// little more freely; see [`temperature_for_turn`](Self::temperature_for_turn).
///
/// # Examples
///
/// ```
/// use colloquy_conversation::ConversationSettings;
///
/// let settings = ConversationSettings::default();
/// assert!((settings.temperature_for_turn(1) - 0.75).abs() < 1e-9);
/// assert_eq!(*settings.max_tokens(), 150);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into), default, build_fn(validate = "Self::validate"))]
pub struct ConversationSettings {
    /// Model requested for every turn
    model: String,
    /// Reply length cap per turn
    max_tokens: u32,
    /// Temperature before any turn offset
    base_temperature: f64,
    /// Temperature added per turn number
    temperature_step: f64,
    /// Ceiling for the per-turn temperature
    max_temperature: f64,
    /// Fixed system instruction
    system_prompt: String,
    /// Pause after every turn
    turn_delay: Duration,
    /// Pause after every session
    session_delay: Duration,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 150,
            base_temperature: 0.7,
            temperature_step: 0.05,
            max_temperature: 2.0,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            turn_delay: Duration::from_millis(1000),
            session_delay: Duration::from_millis(2000),
        }
    }
}

impl ConversationSettings {
    /// Creates a new settings builder seeded with the defaults.
    pub fn builder() -> ConversationSettingsBuilder {
        ConversationSettingsBuilder::default()
    }

    /// Sampling temperature for a 1-based turn number.
    ///
    /// `min(base + turn_number * step, max)`: deterministic and never
    /// decreasing as the turn number grows.
    pub fn temperature_for_turn(&self, turn_number: usize) -> f64 {
        (self.base_temperature + turn_number as f64 * self.temperature_step)
            .min(self.max_temperature)
    }
}

impl ConversationSettingsBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(step) = self.temperature_step
            && step < 0.0
        {
            return Err(format!("temperature_step must not be negative, got {step}"));
        }
        if let Some(0) = self.max_tokens {
            return Err("max_tokens must be positive".to_string());
        }
        if let Some(model) = &self.model
            && model.trim().is_empty()
        {
            return Err("model must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_grows_then_caps() {
        let settings = ConversationSettings::builder()
            .base_temperature(1.9)
            .temperature_step(0.05)
            .build()
            .unwrap();

        assert!(settings.temperature_for_turn(1) > 1.9);
        assert_eq!(settings.temperature_for_turn(10), 2.0);
        assert_eq!(settings.temperature_for_turn(100), 2.0);
    }

    #[test]
    fn test_builder_keeps_defaults() {
        let settings = ConversationSettings::builder()
            .turn_delay(Duration::ZERO)
            .build()
            .unwrap();
        assert_eq!(settings.model(), DEFAULT_MODEL);
        assert_eq!(settings.system_prompt(), DEFAULT_SYSTEM_PROMPT);
        assert_eq!(*settings.session_delay(), Duration::from_millis(2000));
    }

    #[test]
    fn test_negative_step_rejected() {
        let result = ConversationSettings::builder().temperature_step(-0.1).build();
        assert!(result.is_err());
    }
}
