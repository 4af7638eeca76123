//! Single-turn execution.

use crate::{ConversationSettings, Observation, build_turn_metadata};
use colloquy_core::{
    ConversationHistory, GenerateRequest, GenerationStart, Message, ObservationId,
    ObservationKind, ObservationUpdate, TokenUsage,
};
use colloquy_error::{
    BuilderError, BuilderErrorKind, ColloquyResult, ModelsError, ModelsErrorKind,
};
use colloquy_interface::{ColloquyDriver, TelemetryBackend};
use serde_json::json;
use tracing::{debug, instrument};

/// Everything one turn needs besides the history.
#[derive(Debug, Clone, PartialEq, derive_getters::Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct TurnContext {
    /// Session the turn belongs to
    session_id: String,
    /// Owning user
    user_id: String,
    /// 1-based position in the session
    turn_number: usize,
    /// New user prompt
    prompt: String,
    /// Model to request
    model: String,
    /// Sampling temperature
    temperature: f64,
    /// Reply length cap
    max_tokens: u32,
    /// Session span the generation nests under
    #[builder(default, setter(strip_option))]
    parent: Option<ObservationId>,
}

impl TurnContext {
    /// Creates a new turn context builder.
    pub fn builder() -> TurnContextBuilder {
        TurnContextBuilder::default()
    }
}

/// A successful turn's reply.
#[derive(Debug, Clone, PartialEq, derive_getters::Getters)]
pub struct TurnReply {
    /// Reply text
    text: String,
    /// Provider-reported token usage
    usage: TokenUsage,
}

impl TurnReply {
    /// Pair a reply with its usage.
    pub fn new(text: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            text: text.into(),
            usage,
        }
    }
}

/// Runs one prompt/reply exchange inside a generation-scoped telemetry unit.
pub struct TurnExecutor<'a, D: ColloquyDriver> {
    driver: &'a D,
    telemetry: &'a dyn TelemetryBackend,
    settings: &'a ConversationSettings,
}

impl<'a, D: ColloquyDriver> TurnExecutor<'a, D> {
    /// Create an executor over the given capabilities.
    pub fn new(
        driver: &'a D,
        telemetry: &'a dyn TelemetryBackend,
        settings: &'a ConversationSettings,
    ) -> Self {
        Self {
            driver,
            telemetry,
            settings,
        }
    }

    /// Message sequence for a turn: system instruction, prior history, then the prompt.
    pub fn build_messages(&self, prompt: &str, history: &ConversationHistory) -> Vec<Message> {
        std::iter::once(Message::system(self.settings.system_prompt().clone()))
            .chain(history.iter().cloned())
            .chain(std::iter::once(Message::user(prompt)))
            .collect()
    }

    /// Execute one turn against a read-only view of the history.
    ///
    /// The caller appends the exchange on success. On failure the generation
    /// is released with an error status and carries no output.
    ///
    /// # Errors
    ///
    /// Returns the completion error unchanged, or an empty-reply error when the
    /// provider answers without text.
    #[instrument(
        skip(self, context, history),
        fields(
            session_id = %context.session_id(),
            turn = context.turn_number(),
            context_len = history.len()
        )
    )]
    pub async fn execute_turn(
        &self,
        context: &TurnContext,
        history: &ConversationHistory,
    ) -> ColloquyResult<TurnReply> {
        let metadata = build_turn_metadata(
            context.session_id(),
            context.user_id(),
            *context.turn_number(),
            context.model(),
            *context.temperature(),
            *context.max_tokens(),
        );

        let mut start = GenerationStart::builder();
        start
            .name(format!("chat_turn_{}", context.turn_number()))
            .model(context.model().clone())
            .model_parameters(json!({
                "temperature": context.temperature(),
                "max_tokens": context.max_tokens(),
            }))
            .input(json!({
                "prompt": context.prompt(),
                "conversation_context": history.len(),
            }))
            .metadata(metadata.to_json());
        if let Some(parent) = context.parent() {
            start.parent(parent.clone());
        }
        let mut generation = match start.build() {
            Ok(start) => Observation::generation(self.telemetry, &start),
            Err(e) => {
                tracing::warn!(error = %e, "Invalid generation parameters, turn runs untraced");
                Observation::detached(self.telemetry, ObservationKind::Generation)
            }
        };

        let request = GenerateRequest::builder()
            .messages(self.build_messages(context.prompt(), history))
            .temperature(Some(*context.temperature() as f32))
            .max_tokens(Some(*context.max_tokens()))
            .model(Some(context.model().clone()))
            .build()
            .map_err(|e| BuilderError::new(BuilderErrorKind::ValidationFailed(e.to_string())))?;

        debug!(messages = request.messages().len(), "Requesting completion");
        let response = match self.driver.generate(&request).await {
            Ok(response) if response.text().trim().is_empty() => {
                let e = ModelsError::new(ModelsErrorKind::EmptyReply(context.model().clone()));
                generation.fail(e.to_string());
                return Err(e.into());
            }
            Ok(response) => response,
            Err(e) => {
                generation.fail(e.to_string());
                return Err(e);
            }
        };

        let reply = TurnReply::new(response.text().clone(), *response.usage());
        generation.update(ObservationUpdate::with_usage(
            json!(reply.text()),
            *reply.usage(),
        ));
        debug!(
            total_tokens = reply.usage().total_tokens(),
            "Turn completed"
        );
        Ok(reply)
    }
}
