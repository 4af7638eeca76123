//! OpenTelemetry telemetry backend.
//!
//! Sessions and turns become ordinary OpenTelemetry spans. Payloads are
//! attached as JSON-encoded attributes; token usage follows the `gen_ai.*`
//! semantic conventions.

use colloquy_core::{
    GenerationStart, ObservationId, ObservationKind, ObservationStatus, ObservationUpdate,
    SpanStart,
};
use colloquy_error::{ColloquyResult, TelemetryError, TelemetryErrorKind};
use colloquy_interface::TelemetryBackend;
use opentelemetry::trace::{
    Span as _, SpanKind, Status, TraceContextExt, Tracer as _, TracerProvider as _,
};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider, Span};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, instrument};

struct OpenSpan {
    span: Span,
    updated: bool,
}

/// Telemetry backend built on an OpenTelemetry tracer provider.
pub struct OtelTelemetry {
    provider: SdkTracerProvider,
    tracer: SdkTracer,
    open: Mutex<HashMap<ObservationId, OpenSpan>>,
}

impl std::fmt::Debug for OtelTelemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtelTelemetry").finish_non_exhaustive()
    }
}

impl OtelTelemetry {
    /// Backend that prints finished spans with the stdout exporter.
    pub fn stdout(service_name: impl Into<String>) -> Self {
        let service_name = service_name.into();
        let resource = Resource::builder()
            .with_service_name(service_name.clone())
            .with_attributes(vec![KeyValue::new(
                "service.version",
                env!("CARGO_PKG_VERSION"),
            )])
            .build();

        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .with_resource(resource)
            .build();

        Self::with_provider(provider, service_name)
    }

    /// Backend recording into an existing provider.
    pub fn with_provider(provider: SdkTracerProvider, service_name: impl Into<String>) -> Self {
        let tracer = provider.tracer(service_name.into());
        Self {
            provider,
            tracer,
            open: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> ColloquyResult<MutexGuard<'_, HashMap<ObservationId, OpenSpan>>> {
        self.open
            .lock()
            .map_err(|_| TelemetryError::new(TelemetryErrorKind::LockPoisoned).into())
    }

    fn open(
        &self,
        name: &str,
        parent: Option<&ObservationId>,
        attributes: Vec<KeyValue>,
    ) -> ColloquyResult<ObservationId> {
        let mut open = self.lock()?;

        // Never inherit the ambient context; nesting is explicit
        let parent_cx = match parent {
            Some(parent) => {
                let parent = open.get(parent).ok_or_else(|| {
                    TelemetryError::new(TelemetryErrorKind::UnknownObservation(parent.to_string()))
                })?;
                Context::new().with_remote_span_context(parent.span.span_context().clone())
            }
            None => Context::new(),
        };

        let span = self
            .tracer
            .span_builder(name.to_string())
            .with_kind(SpanKind::Internal)
            .with_attributes(attributes)
            .start_with_context(&self.tracer, &parent_cx);

        let id = ObservationId::new(span.span_context().span_id().to_string());
        open.insert(
            id.clone(),
            OpenSpan {
                span,
                updated: false,
            },
        );
        Ok(id)
    }
}

fn json_attribute(key: &'static str, value: &JsonValue) -> Option<KeyValue> {
    (!value.is_null()).then(|| KeyValue::new(key, value.to_string()))
}

#[async_trait::async_trait]
impl TelemetryBackend for OtelTelemetry {
    fn backend_name(&self) -> &'static str {
        "stdout"
    }

    fn start_span(&self, start: &SpanStart) -> ColloquyResult<ObservationId> {
        let mut attributes = vec![KeyValue::new(
            "colloquy.observation.kind",
            ObservationKind::Span.to_string(),
        )];
        if let Some(session_id) = start.correlation().session_id() {
            attributes.push(KeyValue::new("session.id", session_id.clone()));
        }
        if let Some(user_id) = start.correlation().user_id() {
            attributes.push(KeyValue::new("user.id", user_id.clone()));
        }
        attributes.extend(json_attribute("colloquy.input", start.input()));
        attributes.extend(json_attribute("colloquy.metadata", start.metadata()));

        self.open(start.name(), start.parent().as_ref(), attributes)
    }

    fn start_generation(&self, start: &GenerationStart) -> ColloquyResult<ObservationId> {
        let mut attributes = vec![
            KeyValue::new(
                "colloquy.observation.kind",
                ObservationKind::Generation.to_string(),
            ),
            KeyValue::new("gen_ai.request.model", start.model().clone()),
        ];
        if let Some(temperature) = start.model_parameters()["temperature"].as_f64() {
            attributes.push(KeyValue::new("gen_ai.request.temperature", temperature));
        }
        if let Some(max_tokens) = start.model_parameters()["max_tokens"].as_i64() {
            attributes.push(KeyValue::new("gen_ai.request.max_tokens", max_tokens));
        }
        attributes.extend(json_attribute("colloquy.input", start.input()));
        attributes.extend(json_attribute("colloquy.metadata", start.metadata()));

        self.open(start.name(), start.parent().as_ref(), attributes)
    }

    fn update(&self, id: &ObservationId, update: &ObservationUpdate) -> ColloquyResult<()> {
        let mut open = self.lock()?;
        let entry = open.get_mut(id).ok_or_else(|| {
            TelemetryError::new(TelemetryErrorKind::UnknownObservation(id.to_string()))
        })?;
        if entry.updated {
            return Err(TelemetryError::new(TelemetryErrorKind::AlreadyUpdated(id.to_string())).into());
        }
        entry.updated = true;

        if let Some(output) = json_attribute("colloquy.output", update.output()) {
            entry.span.set_attribute(output);
        }
        if let Some(usage) = update.usage() {
            entry.span.set_attributes([
                KeyValue::new("gen_ai.usage.input_tokens", *usage.input_tokens() as i64),
                KeyValue::new("gen_ai.usage.output_tokens", *usage.output_tokens() as i64),
                KeyValue::new("gen_ai.usage.total_tokens", *usage.total_tokens() as i64),
            ]);
        }
        Ok(())
    }

    fn end(&self, id: &ObservationId, status: &ObservationStatus) -> ColloquyResult<()> {
        let mut entry = self.lock()?.remove(id).ok_or_else(|| {
            TelemetryError::new(TelemetryErrorKind::UnknownObservation(id.to_string()))
        })?;

        match status {
            ObservationStatus::Completed => entry.span.set_status(Status::Ok),
            ObservationStatus::Abandoned => {
                entry
                    .span
                    .set_attribute(KeyValue::new("colloquy.abandoned", true));
            }
            ObservationStatus::Failed(reason) => {
                entry.span.set_status(Status::error(reason.clone()));
            }
        }
        entry.span.end();
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "stdout"))]
    async fn flush(&self) -> ColloquyResult<()> {
        self.provider
            .force_flush()
            .map_err(|e| TelemetryError::new(TelemetryErrorKind::Export(e.to_string())))?;
        debug!("Flushed OpenTelemetry spans");
        Ok(())
    }
}
