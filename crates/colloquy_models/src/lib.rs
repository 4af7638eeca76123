//! Completion provider integrations for Colloquy.
//!
//! # Example
//!
//! ```no_run
//! use colloquy_core::{GenerateRequest, Message};
//! use colloquy_interface::ColloquyDriver;
//! use colloquy_models::OpenAIClient;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAIClient::from_env("OPENAI_API_KEY", "gpt-3.5-turbo")?;
//! let request = GenerateRequest::builder()
//!     .messages(vec![Message::user("Hello")])
//!     .build()?;
//! let response = client.generate(&request).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod metrics;
mod openai;

pub use metrics::{LlmMetrics, classify_error};
pub use openai::{
    OPENAI_API_BASE, OpenAIChoice, OpenAIClient, OpenAIMessage, OpenAIMessageBuilder,
    OpenAIRequest, OpenAIRequestBuilder, OpenAIResponse, OpenAIResponseMessage, OpenAIUsage,
};
