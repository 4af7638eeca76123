//! Scoped telemetry units.
//!
//! An [`Observation`] is acquired when a span or generation starts and
//! released when it drops, so every exit path closes the unit exactly once.
//! Telemetry is best effort: backend errors are logged and swallowed, and a
//! unit that failed to start becomes a detached guard whose operations are
//! no-ops.

use colloquy_core::{
    GenerationStart, ObservationId, ObservationKind, ObservationStatus, ObservationUpdate,
    SpanStart,
};
use colloquy_interface::TelemetryBackend;
use tracing::{debug, warn};

/// RAII guard around one telemetry unit.
///
/// Released on drop with [`ObservationStatus::Completed`] if it was updated,
/// [`ObservationStatus::Abandoned`] if not, or the failure recorded with
/// [`fail`](Self::fail).
///
/// # Examples
///
/// ```
/// use colloquy_conversation::Observation;
/// use colloquy_core::{ObservationUpdate, SpanStart};
/// use colloquy_telemetry::InMemoryTelemetry;
///
/// let telemetry = InMemoryTelemetry::new();
/// {
///     let start = SpanStart::builder().name("session").build().unwrap();
///     let mut span = Observation::span(&telemetry, &start);
///     span.update(ObservationUpdate::new(serde_json::json!({"done": true})));
/// }
/// assert_eq!(telemetry.open_count(), 0);
/// ```
pub struct Observation<'a> {
    backend: &'a dyn TelemetryBackend,
    kind: ObservationKind,
    id: Option<ObservationId>,
    updated: bool,
    failure: Option<String>,
}

impl<'a> Observation<'a> {
    /// Open a span.
    pub fn span(backend: &'a dyn TelemetryBackend, start: &SpanStart) -> Self {
        let id = backend
            .start_span(start)
            .inspect_err(|e| warn!(name = %start.name(), error = %e, "Failed to start span"))
            .ok();
        Self::acquired(backend, ObservationKind::Span, id)
    }

    /// Open a generation.
    pub fn generation(backend: &'a dyn TelemetryBackend, start: &GenerationStart) -> Self {
        let id = backend
            .start_generation(start)
            .inspect_err(|e| warn!(name = %start.name(), error = %e, "Failed to start generation"))
            .ok();
        Self::acquired(backend, ObservationKind::Generation, id)
    }

    /// A guard with no backing unit.
    pub fn detached(backend: &'a dyn TelemetryBackend, kind: ObservationKind) -> Self {
        Self::acquired(backend, kind, None)
    }

    fn acquired(
        backend: &'a dyn TelemetryBackend,
        kind: ObservationKind,
        id: Option<ObservationId>,
    ) -> Self {
        if let Some(id) = &id {
            debug!(kind = %kind, id = %id, "Observation started");
        }
        Self {
            backend,
            kind,
            id,
            updated: false,
            failure: None,
        }
    }

    /// Backend id, unless the unit failed to start.
    pub fn id(&self) -> Option<&ObservationId> {
        self.id.as_ref()
    }

    /// Whether the guard has no backing unit.
    pub fn is_detached(&self) -> bool {
        self.id.is_none()
    }

    /// Attach the unit's output. Only the first call reaches the backend.
    pub fn update(&mut self, update: ObservationUpdate) {
        let Some(id) = &self.id else {
            return;
        };
        if self.updated {
            warn!(kind = %self.kind, id = %id, "Ignoring repeated observation update");
            return;
        }
        self.updated = true;
        if let Err(e) = self.backend.update(id, &update) {
            warn!(kind = %self.kind, id = %id, error = %e, "Failed to update observation");
        }
    }

    /// Release the unit with an error status.
    pub fn fail(mut self, reason: impl Into<String>) {
        self.failure = Some(reason.into());
    }
}

impl Drop for Observation<'_> {
    fn drop(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        let status = match self.failure.take() {
            Some(reason) => ObservationStatus::Failed(reason),
            None if self.updated => ObservationStatus::Completed,
            None => ObservationStatus::Abandoned,
        };
        debug!(kind = %self.kind, id = %id, status = %status, "Observation released");
        if let Err(e) = self.backend.end(&id, &status) {
            warn!(kind = %self.kind, id = %id, error = %e, "Failed to end observation");
        }
    }
}

impl std::fmt::Debug for Observation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observation")
            .field("backend", &self.backend.backend_name())
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("updated", &self.updated)
            .finish()
    }
}
