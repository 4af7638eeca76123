//! Running a whole scenario catalog.

use crate::{
    ConversationObserver, ConversationSettings, ScenarioCatalog, SessionDescriptor,
    SessionOrchestrator, SessionReport, SilentObserver,
};
use chrono::{DateTime, Local};
use colloquy_interface::{ColloquyDriver, TelemetryBackend};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Issues run-unique session ids of the form `{user}_{label}_{%Y%m%d_%H%M%S}`.
///
/// Ids minted in the same second for the same user and label get a numeric
/// suffix (`_2`, `_3`, ...).
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
/// use colloquy_conversation::SessionIdGenerator;
///
/// let at = Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
/// let mut ids = SessionIdGenerator::new();
///
/// assert_eq!(ids.issue_at("alice", "s1", at), "alice_s1_20250102_030405");
/// assert_eq!(ids.issue_at("alice", "s1", at), "alice_s1_20250102_030405_2");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SessionIdGenerator {
    issued: HashSet<String>,
}

impl SessionIdGenerator {
    /// A generator that has issued nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue an id stamped with the current local time.
    pub fn issue(&mut self, user_id: &str, label: &str) -> String {
        self.issue_at(user_id, label, Local::now())
    }

    /// Issue an id stamped with the given time.
    pub fn issue_at(&mut self, user_id: &str, label: &str, at: DateTime<Local>) -> String {
        let base = format!("{}_{}_{}", user_id, label, at.format("%Y%m%d_%H%M%S"));
        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.issued.contains(&candidate) {
            suffix += 1;
            candidate = format!("{}_{}", base, suffix);
        }
        self.issued.insert(candidate.clone());
        candidate
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, PartialEq, Serialize, derive_getters::Getters)]
pub struct RunSummary {
    /// Every session, in run order
    sessions: Vec<SessionReport>,
    /// Rendered flush error, if the final flush failed
    flush_error: Option<String>,
}

impl RunSummary {
    /// Whether the final flush delivered everything.
    pub fn telemetry_flushed(&self) -> bool {
        self.flush_error.is_none()
    }

    /// Turns attempted across all sessions.
    pub fn total_turns(&self) -> usize {
        self.sessions.iter().map(|s| s.turns().len()).sum()
    }

    /// Turns skipped across all sessions.
    pub fn failed_turns(&self) -> usize {
        self.sessions.iter().map(SessionReport::failed_turns).sum()
    }
}

/// Runs every session of a catalog, then flushes telemetry once.
pub struct ScenarioRunner<D: ColloquyDriver> {
    driver: D,
    telemetry: Arc<dyn TelemetryBackend>,
    settings: ConversationSettings,
    observer: Box<dyn ConversationObserver>,
}

impl<D: ColloquyDriver> ScenarioRunner<D> {
    /// Create a runner over explicitly constructed capabilities.
    pub fn new(
        driver: D,
        telemetry: Arc<dyn TelemetryBackend>,
        settings: ConversationSettings,
    ) -> Self {
        Self {
            driver,
            telemetry,
            settings,
            observer: Box::new(SilentObserver),
        }
    }

    /// Report progress to the given observer.
    pub fn with_observer(mut self, observer: impl ConversationObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// The completion driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Run the catalog in order with the configured model.
    ///
    /// Sessions run one after another, separated by the session delay. The
    /// run ends with a single blocking flush; a flush failure is logged and
    /// reported in the summary.
    #[instrument(
        skip(self, catalog),
        fields(
            sessions = catalog.session_count(),
            telemetry = self.telemetry.backend_name(),
            provider = self.driver.provider_name()
        )
    )]
    pub async fn run_all(&self, catalog: &ScenarioCatalog) -> RunSummary {
        info!("Starting scenario run");
        self.observer.run_started(catalog);

        let orchestrator =
            SessionOrchestrator::new(&self.driver, self.telemetry.as_ref(), &self.settings)
                .with_observer(self.observer.as_ref());
        let mut ids = SessionIdGenerator::new();
        let mut sessions = Vec::with_capacity(catalog.session_count());

        for (user_id, scenario) in catalog.entries() {
            let descriptor = SessionDescriptor::builder()
                .user_id(user_id)
                .session_id(ids.issue(user_id, scenario.label()))
                .prompts(scenario.prompts().clone())
                .model(self.settings.model().clone())
                .build();
            let descriptor = match descriptor {
                Ok(descriptor) => descriptor,
                Err(e) => {
                    error!(user_id, label = %scenario.label(), error = %e, "Skipping session");
                    continue;
                }
            };

            sessions.push(orchestrator.run_session(&descriptor).await);

            if !self.settings.session_delay().is_zero() {
                tokio::time::sleep(*self.settings.session_delay()).await;
            }
        }

        let flush_error = match self.telemetry.flush().await {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "Telemetry flush failed");
                Some(e.to_string())
            }
        };

        let summary = RunSummary {
            sessions,
            flush_error,
        };
        info!(
            sessions = summary.sessions().len(),
            turns = summary.total_turns(),
            failed = summary.failed_turns(),
            flushed = summary.telemetry_flushed(),
            "Scenario run finished"
        );
        self.observer.run_completed(&summary);
        summary
    }
}
