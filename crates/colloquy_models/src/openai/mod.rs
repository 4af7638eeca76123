//! OpenAI-compatible chat-completions driver.

mod client;
mod dto;

pub use client::{OPENAI_API_BASE, OpenAIClient};
pub use dto::{
    OpenAIChoice, OpenAIMessage, OpenAIMessageBuilder, OpenAIRequest, OpenAIRequestBuilder,
    OpenAIResponse, OpenAIResponseMessage, OpenAIUsage,
};
