//! Human-readable progress reporting.

use crate::{RunSummary, ScenarioCatalog, SessionDescriptor, SessionReport};

/// Hooks called as a run progresses. Every hook defaults to a no-op.
pub trait ConversationObserver: Send + Sync {
    /// Before the first session.
    fn run_started(&self, _catalog: &ScenarioCatalog) {}

    /// A session's span is open and its first turn is about to run.
    fn session_started(&self, _session: &SessionDescriptor) {}

    /// A turn is about to call the model.
    fn turn_started(&self, _session: &SessionDescriptor, _turn_number: usize, _prompt: &str) {}

    /// A turn produced a reply.
    fn turn_replied(&self, _session: &SessionDescriptor, _turn_number: usize, _reply: &str) {}

    /// A turn failed and was skipped.
    fn turn_failed(&self, _session: &SessionDescriptor, _turn_number: usize, _reason: &str) {}

    /// Every turn of a session was attempted.
    fn session_completed(&self, _report: &SessionReport) {}

    /// All sessions ran and telemetry was flushed.
    fn run_completed(&self, _summary: &RunSummary) {}
}

/// Observer that reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl ConversationObserver for SilentObserver {}

const RULE_WIDTH: usize = 60;

/// Prints a transcript of the run to stdout.
#[derive(Debug, Clone)]
pub struct ConsoleTranscript {
    title: String,
    dashboard_hint: Option<String>,
}

impl Default for ConsoleTranscript {
    fn default() -> Self {
        Self::new("Multi-User Conversation Tracking")
    }
}

impl ConsoleTranscript {
    /// Transcript with the given banner title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            dashboard_hint: None,
        }
    }

    /// Name the place the traces can be browsed, printed after the run.
    pub fn with_dashboard_hint(mut self, hint: impl Into<String>) -> Self {
        self.dashboard_hint = Some(hint.into());
        self
    }

    fn rule() -> String {
        "-".repeat(RULE_WIDTH)
    }
}

impl ConversationObserver for ConsoleTranscript {
    fn run_started(&self, catalog: &ScenarioCatalog) {
        println!();
        println!("{}", Self::rule());
        println!("{}", self.title);
        println!("{}", Self::rule());
        println!(
            "{} users, {} sessions, {} turns",
            catalog.users().len(),
            catalog.session_count(),
            catalog.total_turns()
        );
    }

    fn session_started(&self, session: &SessionDescriptor) {
        println!(
            "\nStarting conversation session: {} (User: {})",
            session.session_id(),
            session.user_id()
        );
        println!("{}", Self::rule());
    }

    fn turn_started(&self, session: &SessionDescriptor, turn_number: usize, prompt: &str) {
        println!("\nTurn {}/{}", turn_number, session.prompts().len());
        println!(" {}: {}", session.user_id(), prompt);
    }

    fn turn_replied(&self, _session: &SessionDescriptor, _turn_number: usize, reply: &str) {
        println!(" LLM Response: {}", reply);
    }

    fn turn_failed(&self, session: &SessionDescriptor, turn_number: usize, reason: &str) {
        println!(
            " Error in turn {} of session {}: {}",
            turn_number,
            session.session_id(),
            reason
        );
    }

    fn session_completed(&self, report: &SessionReport) {
        println!(
            "\n Session {} completed ({} turns, {} failed)",
            report.session_id(),
            report.turns().len(),
            report.failed_turns()
        );
    }

    fn run_completed(&self, summary: &RunSummary) {
        println!("\n All conversation sessions completed!");
        if let Some(error) = summary.flush_error() {
            println!(" Telemetry flush failed: {}", error);
        } else if let Some(hint) = &self.dashboard_hint {
            println!(" Check {} to view:", hint);
            println!("   - Session-level traces (grouped conversations)");
            println!("   - Turn-level generations (individual chat exchanges)");
            println!("   - Filter by user_id, session_id, or turn_number");
        }
    }
}
