//! Chat-completions wire types.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// One message in a chat-completions request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Builder, Getters)]
#[builder(setter(into))]
pub struct OpenAIMessage {
    /// "system", "user" or "assistant"
    role: String,
    /// Message text
    content: String,
}

impl OpenAIMessage {
    /// Creates a new builder for `OpenAIMessage`.
    pub fn builder() -> OpenAIMessageBuilder {
        OpenAIMessageBuilder::default()
    }
}

/// Chat-completions request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder, Getters)]
#[builder(setter(into))]
pub struct OpenAIRequest {
    /// Model identifier
    model: String,
    /// Ordered conversation
    messages: Vec<OpenAIMessage>,
    /// Sampling temperature
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Maximum tokens to generate
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl OpenAIRequest {
    /// Creates a new builder for `OpenAIRequest`.
    pub fn builder() -> OpenAIRequestBuilder {
        OpenAIRequestBuilder::default()
    }
}

/// Message returned inside a choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct OpenAIResponseMessage {
    /// Author role, normally "assistant"
    role: String,
    /// Reply text; absent for refusals and tool calls
    #[serde(default)]
    content: Option<String>,
}

/// One candidate completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct OpenAIChoice {
    /// Position among the returned choices
    #[serde(default)]
    index: u32,
    /// The generated message
    message: OpenAIResponseMessage,
    /// Why generation stopped
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Token usage block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct OpenAIUsage {
    /// Prompt tokens
    #[serde(default)]
    prompt_tokens: u64,
    /// Completion tokens
    #[serde(default)]
    completion_tokens: u64,
    /// Prompt plus completion
    #[serde(default)]
    total_tokens: u64,
}

/// Chat-completions response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct OpenAIResponse {
    /// Completion id
    #[serde(default)]
    id: String,
    /// Model that served the request
    #[serde(default)]
    model: Option<String>,
    /// Candidate completions
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
    /// Token accounting
    #[serde(default)]
    usage: OpenAIUsage,
}
