use crate::langfuse::{
    IngestionBatch, IngestionEvent, IngestionEventType, IngestionResponse, now, usage_body,
};
use colloquy_core::{
    GenerationStart, ObservationId, ObservationKind, ObservationStatus, ObservationUpdate,
    SpanStart,
};
use colloquy_error::{
    ColloquyErrorKind, ColloquyResult, ConfigError, TelemetryError, TelemetryErrorKind,
};
use colloquy_interface::TelemetryBackend;
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value as JsonValue, json};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Default Langfuse cloud host.
pub const LANGFUSE_DEFAULT_HOST: &str = "https://cloud.langfuse.com";

const INGESTION_PATH: &str = "/api/public/ingestion";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct OpenObservation {
    trace_id: String,
    kind: ObservationKind,
    is_root: bool,
    updated: bool,
}

#[derive(Debug, Default)]
struct LangfuseState {
    pending: Vec<IngestionEvent>,
    open: HashMap<ObservationId, OpenObservation>,
}

/// Telemetry backend that ships observations to Langfuse.
///
/// Events are buffered in memory as they happen and posted as a single
/// ingestion batch on [`flush`](TelemetryBackend::flush). A span without a
/// parent opens a new trace carrying the session and user ids; everything
/// nested beneath it joins that trace.
#[derive(Debug)]
pub struct LangfuseTelemetry {
    client: Client,
    host: String,
    public_key: String,
    secret_key: String,
    timeout: Duration,
    state: Mutex<LangfuseState>,
}

impl LangfuseTelemetry {
    /// Creates a backend for the given host and project keys.
    pub fn new(
        host: impl Into<String>,
        public_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        let host = host.into().trim_end_matches('/').to_string();
        debug!(host = %host, "Creating Langfuse telemetry backend");
        Self {
            client: Client::new(),
            host,
            public_key: public_key.into(),
            secret_key: secret_key.into(),
            timeout: DEFAULT_TIMEOUT,
            state: Mutex::new(LangfuseState::default()),
        }
    }

    /// Creates a backend whose keys are read from the named environment variables.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either key is unset or blank.
    #[instrument(skip_all, fields(host = %host))]
    pub fn from_env(public_key_env: &str, secret_key_env: &str, host: &str) -> ColloquyResult<Self> {
        let public_key = read_key(public_key_env)?;
        let secret_key = read_key(secret_key_env)?;
        Ok(Self::new(host, public_key, secret_key))
    }

    /// Override the ingestion request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The host batches are posted to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Number of events waiting for the next flush.
    pub fn pending_events(&self) -> usize {
        self.lock().map(|state| state.pending.len()).unwrap_or_default()
    }

    /// Drain and return the buffered events without sending them.
    pub fn take_pending(&self) -> ColloquyResult<IngestionBatch> {
        Ok(IngestionBatch {
            batch: std::mem::take(&mut self.lock()?.pending),
        })
    }

    fn lock(&self) -> ColloquyResult<MutexGuard<'_, LangfuseState>> {
        self.state
            .lock()
            .map_err(|_| TelemetryError::new(TelemetryErrorKind::LockPoisoned).into())
    }

    /// Resolve the trace an observation joins, opening a new trace for roots.
    fn join_trace(
        state: &mut LangfuseState,
        parent: Option<&ObservationId>,
        open_trace: impl FnOnce(&str) -> IngestionEvent,
    ) -> ColloquyResult<String> {
        match parent {
            Some(parent) => state
                .open
                .get(parent)
                .map(|observation| observation.trace_id.clone())
                .ok_or_else(|| {
                    TelemetryError::new(TelemetryErrorKind::UnknownObservation(parent.to_string()))
                        .into()
                }),
            None => {
                let trace_id = uuid::Uuid::new_v4().to_string();
                state.pending.push(open_trace(&trace_id));
                Ok(trace_id)
            }
        }
    }

    fn open(
        &self,
        kind: ObservationKind,
        parent: Option<&ObservationId>,
        open_trace: impl FnOnce(&str) -> IngestionEvent,
        body: impl FnOnce(&str, &str) -> JsonValue,
    ) -> ColloquyResult<ObservationId> {
        let mut state = self.lock()?;
        let trace_id = Self::join_trace(&mut state, parent, open_trace)?;
        let id = uuid::Uuid::new_v4().to_string();

        state.pending.push(IngestionEvent::new(
            IngestionEventType::create_for(kind),
            body(&id, &trace_id),
        ));

        let id = ObservationId::new(id);
        state.open.insert(
            id.clone(),
            OpenObservation {
                trace_id,
                kind,
                is_root: parent.is_none(),
                updated: false,
            },
        );
        Ok(id)
    }

    /// Posts one batch and checks the multi-status response.
    #[instrument(skip(self, events), fields(events = events.len()))]
    async fn send_batch(&self, events: &[IngestionEvent]) -> ColloquyResult<()> {
        let total = events.len();
        let response = self
            .client
            .post(format!("{}{}", self.host, INGESTION_PATH))
            .basic_auth(&self.public_key, Some(&self.secret_key))
            .timeout(self.timeout)
            .json(&json!({ "batch": events }))
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Failed to send ingestion batch");
                TelemetryError::new(TelemetryErrorKind::Http(e.to_string()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Ingestion endpoint rejected batch");
            return Err(TelemetryError::new(TelemetryErrorKind::Rejected {
                status: status.as_u16(),
                message: body,
            })
            .into());
        }

        // 200 may come back with an empty body
        let parsed = if status == StatusCode::MULTI_STATUS {
            response.json::<IngestionResponse>().await.unwrap_or_default()
        } else {
            IngestionResponse::default()
        };

        if !parsed.errors.is_empty() {
            for failure in &parsed.errors {
                warn!(
                    event_id = %failure.id,
                    status = failure.status,
                    message = failure.message.as_deref().unwrap_or(""),
                    "Ingestion event rejected"
                );
            }
            return Err(TelemetryError::new(TelemetryErrorKind::PartialFailure {
                failed: parsed.errors.len(),
                total,
            })
            .into());
        }

        debug!(total, "Ingestion batch accepted");
        Ok(())
    }
}

fn read_key(var: &str) -> ColloquyResult<String> {
    std::env::var(var)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| ConfigError::new(format!("{} not set", var)).into())
}

/// Drop nulls so partial updates never clear fields set earlier.
fn compact(body: JsonValue) -> JsonValue {
    match body {
        JsonValue::Object(map) => JsonValue::Object(
            map.into_iter()
                .filter(|(_, value)| !value.is_null())
                .collect::<Map<_, _>>(),
        ),
        other => other,
    }
}

#[async_trait::async_trait]
impl TelemetryBackend for LangfuseTelemetry {
    fn backend_name(&self) -> &'static str {
        "langfuse"
    }

    fn start_span(&self, start: &SpanStart) -> ColloquyResult<ObservationId> {
        let started_at = now();
        self.open(
            ObservationKind::Span,
            start.parent().as_ref(),
            |trace_id| {
                IngestionEvent::new(
                    IngestionEventType::TraceCreate,
                    compact(json!({
                        "id": trace_id,
                        "timestamp": started_at,
                        "name": start.name(),
                        "sessionId": start.correlation().session_id(),
                        "userId": start.correlation().user_id(),
                        "input": start.input(),
                        "metadata": start.metadata(),
                    })),
                )
            },
            |id, trace_id| {
                compact(json!({
                    "id": id,
                    "traceId": trace_id,
                    "parentObservationId": start.parent(),
                    "name": start.name(),
                    "startTime": started_at,
                    "input": start.input(),
                    "metadata": start.metadata(),
                }))
            },
        )
    }

    fn start_generation(&self, start: &GenerationStart) -> ColloquyResult<ObservationId> {
        let started_at = now();
        self.open(
            ObservationKind::Generation,
            start.parent().as_ref(),
            |trace_id| {
                IngestionEvent::new(
                    IngestionEventType::TraceCreate,
                    compact(json!({
                        "id": trace_id,
                        "timestamp": started_at,
                        "name": start.name(),
                        "input": start.input(),
                    })),
                )
            },
            |id, trace_id| {
                compact(json!({
                    "id": id,
                    "traceId": trace_id,
                    "parentObservationId": start.parent(),
                    "name": start.name(),
                    "startTime": started_at,
                    "model": start.model(),
                    "modelParameters": start.model_parameters(),
                    "input": start.input(),
                    "metadata": start.metadata(),
                }))
            },
        )
    }

    fn update(&self, id: &ObservationId, update: &ObservationUpdate) -> ColloquyResult<()> {
        let mut state = self.lock()?;
        let observation = state.open.get_mut(id).ok_or_else(|| {
            TelemetryError::new(TelemetryErrorKind::UnknownObservation(id.to_string()))
        })?;
        if observation.updated {
            return Err(TelemetryError::new(TelemetryErrorKind::AlreadyUpdated(id.to_string())).into());
        }
        observation.updated = true;
        let observation = observation.clone();

        state.pending.push(IngestionEvent::new(
            IngestionEventType::update_for(observation.kind),
            compact(json!({
                "id": id,
                "traceId": observation.trace_id,
                "output": update.output(),
                "usage": update.usage().as_ref().map(usage_body),
            })),
        ));

        // Mirror a root span's output onto its trace
        if observation.is_root {
            state.pending.push(IngestionEvent::new(
                IngestionEventType::TraceCreate,
                json!({ "id": observation.trace_id, "output": update.output() }),
            ));
        }
        Ok(())
    }

    fn end(&self, id: &ObservationId, status: &ObservationStatus) -> ColloquyResult<()> {
        let mut state = self.lock()?;
        let observation = state.open.remove(id).ok_or_else(|| {
            TelemetryError::new(TelemetryErrorKind::UnknownObservation(id.to_string()))
        })?;

        let (level, message) = match status {
            ObservationStatus::Completed => ("DEFAULT", None),
            ObservationStatus::Abandoned => ("WARNING", Some("abandoned".to_string())),
            ObservationStatus::Failed(reason) => ("ERROR", Some(reason.clone())),
        };

        state.pending.push(IngestionEvent::new(
            IngestionEventType::update_for(observation.kind),
            compact(json!({
                "id": id,
                "traceId": observation.trace_id,
                "endTime": now(),
                "level": level,
                "statusMessage": message,
            })),
        ));
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "langfuse"))]
    async fn flush(&self) -> ColloquyResult<()> {
        let events = std::mem::take(&mut self.lock()?.pending);
        if events.is_empty() {
            debug!("Nothing to flush");
            return Ok(());
        }

        let count = events.len();
        match self.send_batch(&events).await {
            Ok(()) => {
                info!(events = count, "Flushed telemetry to Langfuse");
                Ok(())
            }
            Err(e) => {
                // Rejected batches are dropped; unsent ones wait for the next flush
                if matches!(
                    e.kind(),
                    ColloquyErrorKind::Telemetry(TelemetryError {
                        kind: TelemetryErrorKind::Http(_),
                        ..
                    })
                ) {
                    let mut state = self.lock()?;
                    let newer = std::mem::replace(&mut state.pending, events);
                    state.pending.extend(newer);
                }
                Err(e)
            }
        }
    }
}
