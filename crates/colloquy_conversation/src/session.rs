//! Session orchestration.

use crate::{
    ConversationObserver, ConversationSettings, Observation, SilentObserver, TurnContext,
    TurnExecutor, build_session_metadata,
};
use colloquy_core::{
    ConversationHistory, ObservationKind, ObservationUpdate, SpanStart, TokenUsage,
    TraceCorrelation,
};
use colloquy_error::{BuilderError, BuilderErrorKind, ColloquyResult};
use colloquy_interface::{ColloquyDriver, TelemetryBackend};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, instrument, warn};

/// One scripted session, ready to run.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct SessionDescriptor {
    /// Owning user
    user_id: String,
    /// Unique session id
    session_id: String,
    /// Prompts, in order
    prompts: Vec<String>,
    /// Model requested for every turn
    model: String,
}

impl SessionDescriptor {
    /// Creates a new session descriptor builder.
    pub fn builder() -> SessionDescriptorBuilder {
        SessionDescriptorBuilder::default()
    }
}

/// Lifecycle of a session. There is no failed terminal state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionState {
    /// Not yet run
    #[default]
    NotStarted,
    /// Turns in progress
    Running,
    /// Every turn attempted
    Completed,
}

/// What happened on one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// The model replied; the exchange entered the history
    Replied {
        /// Reply text
        reply: String,
        /// Provider-reported token usage
        usage: TokenUsage,
    },
    /// The turn was skipped
    Failed {
        /// Rendered completion error
        reason: String,
    },
}

impl TurnOutcome {
    /// Whether the turn produced a reply.
    pub fn is_replied(&self) -> bool {
        matches!(self, Self::Replied { .. })
    }
}

/// One attempted turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct TurnRecord {
    /// 1-based position in the session
    turn_number: usize,
    /// Prompt sent
    prompt: String,
    /// Sampling temperature used
    temperature: f64,
    /// Reply or failure
    outcome: TurnOutcome,
}

/// Result of running one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct SessionReport {
    /// Unique session id
    session_id: String,
    /// Owning user
    user_id: String,
    /// Transcript of successful turns
    history: ConversationHistory,
    /// Every attempted turn, in order
    turns: Vec<TurnRecord>,
    /// Terminal state
    state: SessionState,
}

impl SessionReport {
    /// Number of turns that produced a reply.
    pub fn successful_turns(&self) -> usize {
        self.turns.iter().filter(|t| t.outcome.is_replied()).count()
    }

    /// Number of turns that were skipped.
    pub fn failed_turns(&self) -> usize {
        self.turns.len() - self.successful_turns()
    }

    /// Consume the report, keeping the final history.
    pub fn into_history(self) -> ConversationHistory {
        self.history
    }
}

/// Drives one session turn by turn inside a session-scoped span.
///
/// A failed turn is reported and skipped; the remaining turns still run and
/// see only the history of successful ones.
pub struct SessionOrchestrator<'a, D: ColloquyDriver> {
    driver: &'a D,
    telemetry: &'a dyn TelemetryBackend,
    settings: &'a ConversationSettings,
    observer: &'a dyn ConversationObserver,
}

impl<'a, D: ColloquyDriver> SessionOrchestrator<'a, D> {
    /// Create an orchestrator that reports progress nowhere.
    pub fn new(
        driver: &'a D,
        telemetry: &'a dyn TelemetryBackend,
        settings: &'a ConversationSettings,
    ) -> Self {
        Self {
            driver,
            telemetry,
            settings,
            observer: &SilentObserver,
        }
    }

    /// Report progress to the given observer.
    pub fn with_observer(mut self, observer: &'a dyn ConversationObserver) -> Self {
        self.observer = observer;
        self
    }

    fn session_span_start(session: &SessionDescriptor) -> ColloquyResult<SpanStart> {
        let metadata = build_session_metadata(
            session.session_id(),
            session.user_id(),
            0,
            session.prompts().len(),
        );
        let correlation = TraceCorrelation::builder()
            .session_id(session.session_id().clone())
            .user_id(session.user_id().clone())
            .build()
            .map_err(|e| BuilderError::new(BuilderErrorKind::ValidationFailed(e.to_string())))?;

        SpanStart::builder()
            .name(format!("conversation_session_{}", session.session_id()))
            .input(json!({
                "user_id": session.user_id(),
                "session_id": session.session_id(),
            }))
            .metadata(metadata.to_json())
            .correlation(correlation)
            .build()
            .map_err(|e| BuilderError::new(BuilderErrorKind::ValidationFailed(e.to_string())).into())
    }

    /// Run every prompt of the session in order and return the report.
    ///
    /// Never fails: turn errors are recorded in the report and telemetry
    /// errors are logged.
    #[instrument(
        skip(self, session),
        fields(session_id = %session.session_id(), user_id = %session.user_id())
    )]
    pub async fn run_session(&self, session: &SessionDescriptor) -> SessionReport {
        let mut state = SessionState::NotStarted;
        let total_turns = session.prompts().len();

        let mut span = match Self::session_span_start(session) {
            Ok(start) => Observation::span(self.telemetry, &start),
            Err(e) => {
                warn!(error = %e, "Invalid session span parameters, session runs untraced");
                Observation::detached(self.telemetry, ObservationKind::Span)
            }
        };

        state = transition(state, SessionState::Running);
        info!(total_turns, "Session started");
        self.observer.session_started(session);

        let executor = TurnExecutor::new(self.driver, self.telemetry, self.settings);
        let mut history = ConversationHistory::new();
        let mut turns = Vec::with_capacity(total_turns);

        for (index, prompt) in session.prompts().iter().enumerate() {
            let turn_number = index + 1;
            let temperature = self.settings.temperature_for_turn(turn_number);
            self.observer.turn_started(session, turn_number, prompt);

            let result = match self.turn_context(session, turn_number, prompt, temperature, &span) {
                Ok(context) => executor.execute_turn(&context, &history).await,
                Err(e) => Err(e),
            };

            let outcome = match result {
                Ok(reply) => {
                    history.push_exchange(prompt.clone(), reply.text().clone());
                    self.observer.turn_replied(session, turn_number, reply.text());
                    TurnOutcome::Replied {
                        reply: reply.text().clone(),
                        usage: *reply.usage(),
                    }
                }
                Err(e) => {
                    error!(turn = turn_number, error = %e, "Turn failed, continuing session");
                    let reason = e.to_string();
                    self.observer.turn_failed(session, turn_number, &reason);
                    TurnOutcome::Failed { reason }
                }
            };

            turns.push(TurnRecord {
                turn_number,
                prompt: prompt.clone(),
                temperature,
                outcome,
            });

            if !self.settings.turn_delay().is_zero() {
                tokio::time::sleep(*self.settings.turn_delay()).await;
            }
        }

        span.update(ObservationUpdate::new(json!({
            "total_turns": total_turns,
            "conversation_completed": true,
            "final_context_length": history.len(),
        })));
        drop(span);

        state = transition(state, SessionState::Completed);
        let report = SessionReport {
            session_id: session.session_id().clone(),
            user_id: session.user_id().clone(),
            history,
            turns,
            state,
        };
        info!(
            successful = report.successful_turns(),
            failed = report.failed_turns(),
            "Session completed"
        );
        self.observer.session_completed(&report);
        report
    }

    fn turn_context(
        &self,
        session: &SessionDescriptor,
        turn_number: usize,
        prompt: &str,
        temperature: f64,
        span: &Observation<'_>,
    ) -> ColloquyResult<TurnContext> {
        let mut builder = TurnContext::builder();
        builder
            .session_id(session.session_id().clone())
            .user_id(session.user_id().clone())
            .turn_number(turn_number)
            .prompt(prompt)
            .model(session.model().clone())
            .temperature(temperature)
            .max_tokens(*self.settings.max_tokens());
        if let Some(parent) = span.id() {
            builder.parent(parent.clone());
        }
        builder
            .build()
            .map_err(|e| BuilderError::new(BuilderErrorKind::ValidationFailed(e.to_string())).into())
    }
}

fn transition(from: SessionState, to: SessionState) -> SessionState {
    tracing::debug!(from = %from, to = %to, "Session state transition");
    to
}
