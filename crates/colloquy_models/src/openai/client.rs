use crate::openai::{OpenAIMessage, OpenAIRequest, OpenAIResponse};
use crate::{LlmMetrics, classify_error};
use colloquy_core::{GenerateRequest, GenerateResponse, TokenUsage};
use colloquy_error::{
    ColloquyResult, ConfigError, ModelsError, ModelsErrorKind, ModelsResult, OpenAIErrorKind,
};
use colloquy_interface::ColloquyDriver;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, instrument};

/// Default OpenAI API root.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for any endpoint speaking the OpenAI chat-completions protocol.
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OpenAIClient {
    /// Creates a new client against the public OpenAI API.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Bearer token
    /// * `model` - Default model (e.g., "gpt-3.5-turbo")
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        debug!("Creating new OpenAI client");
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: OPENAI_API_BASE.to_string(),
            model: model.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Creates a client whose API key is read from the named environment variable.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the variable is unset or blank.
    #[instrument(skip_all, fields(api_key_env = %api_key_env))]
    pub fn from_env(api_key_env: &str, model: impl Into<String>) -> ColloquyResult<Self> {
        let api_key = std::env::var(api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::new(format!("{} not set", api_key_env)))?;
        Ok(Self::new(api_key, model))
    }

    /// Point the client at another OpenAI-compatible API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The API root requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a request to the chat-completions endpoint.
    #[instrument(skip(self, request), fields(model = %request.model()))]
    pub async fn generate_openai(&self, request: &OpenAIRequest) -> ModelsResult<OpenAIResponse> {
        debug!(messages = request.messages().len(), "Sending chat completion request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(
                    error = ?e,
                    timeout = e.is_timeout(),
                    "Failed to send chat completion request"
                );
                let kind = if e.is_timeout() {
                    OpenAIErrorKind::Timeout(format!("{:?} elapsed", self.timeout))
                } else {
                    OpenAIErrorKind::Http(e.to_string())
                };
                ModelsError::new(kind.into())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Chat completion endpoint returned error");
            return Err(ModelsError::new(
                OpenAIErrorKind::from_status(status.as_u16(), body).into(),
            ));
        }

        let parsed: OpenAIResponse = response.json().await.map_err(|e| {
            error!(error = ?e, "Failed to parse chat completion response");
            ModelsError::new(OpenAIErrorKind::Parse(e.to_string()).into())
        })?;

        debug!(response_id = %parsed.id(), choices = parsed.choices().len(), "Received chat completion");
        Ok(parsed)
    }

    /// Converts a Colloquy request into the wire format.
    fn convert_request(&self, request: &GenerateRequest) -> ModelsResult<OpenAIRequest> {
        let messages = request
            .messages()
            .iter()
            .map(|msg| {
                OpenAIMessage::builder()
                    .role(msg.role().to_string())
                    .content(msg.content().clone())
                    .build()
                    .map_err(|e| ModelsError::new(ModelsErrorKind::Builder(e.to_string())))
            })
            .collect::<ModelsResult<Vec<_>>>()?;

        let model = request.model().clone().unwrap_or_else(|| self.model.clone());

        OpenAIRequest::builder()
            .model(model)
            .messages(messages)
            .temperature(*request.temperature())
            .max_tokens(*request.max_tokens())
            .build()
            .map_err(|e| ModelsError::new(ModelsErrorKind::Builder(e.to_string())))
    }

    /// Converts the first choice of a wire response into a Colloquy response.
    fn convert_response(model: &str, response: &OpenAIResponse) -> ModelsResult<GenerateResponse> {
        let choice = response
            .choices()
            .first()
            .ok_or_else(|| ModelsError::new(ModelsErrorKind::EmptyReply(model.to_string())))?;

        let text = choice
            .message()
            .content()
            .as_deref()
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ModelsError::new(ModelsErrorKind::EmptyReply(model.to_string())))?;

        let usage = response.usage();
        GenerateResponse::builder()
            .text(text)
            .usage(TokenUsage::new(
                *usage.prompt_tokens(),
                *usage.completion_tokens(),
                *usage.total_tokens(),
            ))
            .model(response.model().clone())
            .finish_reason(choice.finish_reason().clone())
            .build()
            .map_err(|e| ModelsError::new(ModelsErrorKind::Builder(e.to_string())))
    }
}

#[async_trait::async_trait]
impl ColloquyDriver for OpenAIClient {
    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, request), fields(provider = "openai"))]
    async fn generate(&self, request: &GenerateRequest) -> ColloquyResult<GenerateResponse> {
        let openai_request = self.convert_request(request)?;
        let model = openai_request.model().clone();
        let metrics = LlmMetrics::get();
        let started = Instant::now();

        let result = self
            .generate_openai(&openai_request)
            .await
            .and_then(|response| Self::convert_response(&model, &response));

        match result {
            Ok(response) => {
                metrics.record_request(self.provider_name(), &model, started.elapsed().as_secs_f64());
                let usage = response.usage();
                metrics.record_tokens(
                    &model,
                    *usage.input_tokens(),
                    *usage.output_tokens(),
                    *usage.total_tokens(),
                );
                Ok(response)
            }
            Err(e) => {
                metrics.record_error(self.provider_name(), &model, classify_error(&e));
                Err(e.into())
            }
        }
    }
}
