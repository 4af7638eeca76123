//! In-memory telemetry backend.

use colloquy_core::{
    GenerationStart, ObservationId, ObservationKind, ObservationStatus, ObservationUpdate,
    SpanStart, TraceCorrelation,
};
use colloquy_error::{ColloquyResult, TelemetryError, TelemetryErrorKind};
use colloquy_interface::TelemetryBackend;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Everything recorded about one telemetry unit.
#[derive(Debug, Clone, PartialEq, Serialize, derive_getters::Getters)]
pub struct RecordedObservation {
    /// Backend-issued id
    id: ObservationId,
    /// Span or generation
    kind: ObservationKind,
    /// Display name
    name: String,
    /// Enclosing observation
    parent: Option<ObservationId>,
    /// Model, for generations
    model: Option<String>,
    /// Sampling parameters, for generations
    model_parameters: JsonValue,
    /// Input payload
    input: JsonValue,
    /// Annotation record
    metadata: JsonValue,
    /// Trace correlation keys, for spans
    correlation: Option<TraceCorrelation>,
    /// The single update, if any
    update: Option<ObservationUpdate>,
    /// Release status, once ended
    status: Option<ObservationStatus>,
}

/// Telemetry backend that keeps every unit in memory.
///
/// It enforces the unit lifecycle strictly: updating twice, or touching a
/// unit after it ended, is an error. Used by tests and dry runs.
///
/// # Examples
///
/// ```
/// use colloquy_core::{ObservationStatus, ObservationUpdate, SpanStart};
/// use colloquy_interface::TelemetryBackend;
/// use colloquy_telemetry::InMemoryTelemetry;
///
/// let telemetry = InMemoryTelemetry::new();
/// let start = SpanStart::builder().name("session").build().unwrap();
/// let id = telemetry.start_span(&start).unwrap();
/// telemetry.update(&id, &ObservationUpdate::new(serde_json::json!({"ok": true}))).unwrap();
/// telemetry.end(&id, &ObservationStatus::Completed).unwrap();
///
/// assert_eq!(telemetry.observations().len(), 1);
/// assert_eq!(telemetry.open_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryTelemetry {
    observations: Mutex<Vec<RecordedObservation>>,
    next_id: AtomicU64,
    flushes: AtomicUsize,
}

impl InMemoryTelemetry {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every recorded unit, in start order.
    pub fn observations(&self) -> Vec<RecordedObservation> {
        self.observations
            .lock()
            .map(|observations| observations.clone())
            .unwrap_or_default()
    }

    /// Recorded spans, in start order.
    pub fn spans(&self) -> Vec<RecordedObservation> {
        self.of_kind(ObservationKind::Span)
    }

    /// Recorded generations, in start order.
    pub fn generations(&self) -> Vec<RecordedObservation> {
        self.of_kind(ObservationKind::Generation)
    }

    /// Generations nested under the given parent.
    pub fn children_of(&self, parent: &ObservationId) -> Vec<RecordedObservation> {
        self.observations()
            .into_iter()
            .filter(|observation| observation.parent.as_ref() == Some(parent))
            .collect()
    }

    /// Units started but not yet ended.
    pub fn open_count(&self) -> usize {
        self.observations()
            .iter()
            .filter(|observation| observation.status.is_none())
            .count()
    }

    /// How many times `flush` was called.
    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    fn of_kind(&self, kind: ObservationKind) -> Vec<RecordedObservation> {
        self.observations()
            .into_iter()
            .filter(|observation| observation.kind == kind)
            .collect()
    }

    fn issue_id(&self, kind: ObservationKind) -> ObservationId {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        ObservationId::new(format!("{kind}-{n}"))
    }

    fn record(&self, observation: RecordedObservation) -> ColloquyResult<ObservationId> {
        let id = observation.id.clone();
        self.observations
            .lock()
            .map_err(|_| TelemetryError::new(TelemetryErrorKind::LockPoisoned))?
            .push(observation);
        Ok(id)
    }

    fn with_open<F>(&self, id: &ObservationId, apply: F) -> ColloquyResult<()>
    where
        F: FnOnce(&mut RecordedObservation) -> ColloquyResult<()>,
    {
        let mut observations = self
            .observations
            .lock()
            .map_err(|_| TelemetryError::new(TelemetryErrorKind::LockPoisoned))?;
        let observation = observations
            .iter_mut()
            .find(|observation| &observation.id == id && observation.status.is_none())
            .ok_or_else(|| {
                TelemetryError::new(TelemetryErrorKind::UnknownObservation(id.to_string()))
            })?;
        apply(observation)
    }
}

#[async_trait::async_trait]
impl TelemetryBackend for InMemoryTelemetry {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn start_span(&self, start: &SpanStart) -> ColloquyResult<ObservationId> {
        self.record(RecordedObservation {
            id: self.issue_id(ObservationKind::Span),
            kind: ObservationKind::Span,
            name: start.name().clone(),
            parent: start.parent().clone(),
            model: None,
            model_parameters: JsonValue::Null,
            input: start.input().clone(),
            metadata: start.metadata().clone(),
            correlation: Some(start.correlation().clone()),
            update: None,
            status: None,
        })
    }

    fn start_generation(&self, start: &GenerationStart) -> ColloquyResult<ObservationId> {
        self.record(RecordedObservation {
            id: self.issue_id(ObservationKind::Generation),
            kind: ObservationKind::Generation,
            name: start.name().clone(),
            parent: start.parent().clone(),
            model: Some(start.model().clone()),
            model_parameters: start.model_parameters().clone(),
            input: start.input().clone(),
            metadata: start.metadata().clone(),
            correlation: None,
            update: None,
            status: None,
        })
    }

    fn update(&self, id: &ObservationId, update: &ObservationUpdate) -> ColloquyResult<()> {
        self.with_open(id, |observation| {
            if observation.update.is_some() {
                return Err(
                    TelemetryError::new(TelemetryErrorKind::AlreadyUpdated(id.to_string())).into(),
                );
            }
            observation.update = Some(update.clone());
            Ok(())
        })
    }

    fn end(&self, id: &ObservationId, status: &ObservationStatus) -> ColloquyResult<()> {
        self.with_open(id, |observation| {
            observation.status = Some(status.clone());
            Ok(())
        })
    }

    async fn flush(&self) -> ColloquyResult<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
