//! Request and response types for completions.

use crate::{Message, TokenUsage};
use serde::{Deserialize, Serialize};

/// Completion request: the full message sequence plus sampling parameters.
///
/// # Examples
///
/// ```
/// use colloquy_core::{GenerateRequest, Message};
///
/// let request = GenerateRequest::builder()
///     .messages(vec![Message::user("Hello!")])
///     .max_tokens(Some(150))
///     .temperature(Some(0.75))
///     .model(Some("gpt-3.5-turbo".to_string()))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.messages().len(), 1);
/// assert_eq!(*request.max_tokens(), Some(150));
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Default,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(default)]
pub struct GenerateRequest {
    /// The conversation messages to send
    messages: Vec<Message>,
    /// Maximum number of tokens to generate
    max_tokens: Option<u32>,
    /// Sampling temperature
    temperature: Option<f32>,
    /// Model identifier to use
    model: Option<String>,
}

impl GenerateRequest {
    /// Creates a new request builder.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }
}

/// Completion response: reply text and token usage.
///
/// # Examples
///
/// ```
/// use colloquy_core::{GenerateResponse, TokenUsage};
///
/// let response = GenerateResponse::builder()
///     .text("Hello! How can I help?")
///     .usage(TokenUsage::new(10, 6, 16))
///     .build()
///     .unwrap();
///
/// assert_eq!(response.text(), "Hello! How can I help?");
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
#[builder(setter(into))]
pub struct GenerateResponse {
    /// Generated reply text
    text: String,
    /// Token accounting for this call
    #[builder(default)]
    usage: TokenUsage,
    /// Model that actually served the request, when reported
    #[builder(default)]
    model: Option<String>,
    /// Provider finish reason, when reported
    #[builder(default)]
    finish_reason: Option<String>,
}

impl GenerateResponse {
    /// Creates a new response builder.
    pub fn builder() -> GenerateResponseBuilder {
        GenerateResponseBuilder::default()
    }
}
