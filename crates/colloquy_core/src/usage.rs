//! Token accounting reported by the completion endpoint.

use serde::{Deserialize, Serialize};

/// Token counts for one completion.
///
/// # Examples
///
/// ```
/// use colloquy_core::TokenUsage;
///
/// let usage = TokenUsage::new(12, 30, 42);
/// assert_eq!(*usage.total_tokens(), 42);
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
    derive_getters::Getters,
)]
pub struct TokenUsage {
    /// Tokens in the prompt (system instruction, history and new prompt)
    input_tokens: u64,
    /// Tokens in the reply
    output_tokens: u64,
    /// Sum reported by the provider
    total_tokens: u64,
}

impl TokenUsage {
    /// Create a usage record from provider-reported counts.
    pub fn new(input_tokens: u64, output_tokens: u64, total_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}
