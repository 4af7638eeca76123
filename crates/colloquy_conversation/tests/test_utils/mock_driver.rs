//! Scripted completion driver for testing.

use async_trait::async_trait;
use colloquy_core::{GenerateRequest, GenerateResponse, TokenUsage};
use colloquy_error::{ColloquyResult, ModelsError, OpenAIErrorKind};
use colloquy_interface::ColloquyDriver;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A single scripted response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Reply with the given text
    Reply(String),
    /// Fail with the given error
    Error(OpenAIErrorKind),
}

/// Driver that answers from a script and records every request.
///
/// Once the script runs out it echoes the last user message as `Echo: ...`.
pub struct MockDriver {
    script: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<GenerateRequest>>,
    model_name: String,
}

impl MockDriver {
    /// Driver that plays the given responses in order.
    pub fn scripted(responses: impl IntoIterator<Item = MockResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
            model_name: "mock-model".to_string(),
        }
    }

    /// Driver that replies with each text in order.
    pub fn replies<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Self {
        Self::scripted(texts.into_iter().map(|t| MockResponse::Reply(t.into())))
    }

    /// Driver that echoes every prompt.
    pub fn echo() -> Self {
        Self::scripted([])
    }

    /// Driver whose every call fails.
    pub fn failing(calls: usize) -> Self {
        Self::scripted(
            (0..calls).map(|_| MockResponse::Error(OpenAIErrorKind::Http("connection reset".into()))),
        )
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ColloquyDriver for MockDriver {
    async fn generate(&self, req: &GenerateRequest) -> ColloquyResult<GenerateResponse> {
        self.requests.lock().unwrap().push(req.clone());

        let next = self.script.lock().unwrap().pop_front();
        let text = match next {
            Some(MockResponse::Reply(text)) => text,
            Some(MockResponse::Error(kind)) => return Err(ModelsError::new(kind.into()).into()),
            None => {
                let prompt = req
                    .messages()
                    .last()
                    .map(|m| m.content().clone())
                    .unwrap_or_default();
                format!("Echo: {prompt}")
            }
        };

        Ok(GenerateResponse::builder()
            .text(text)
            .usage(TokenUsage::new(10, 5, 15))
            .build()
            .expect("build response"))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
