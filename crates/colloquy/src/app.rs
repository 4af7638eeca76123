//! Wiring configuration into a runnable scenario run.

use crate::{ColloquyConfig, CompletionConfig, ScenariosConfig, TelemetryConfig};
use colloquy_conversation::{ConsoleTranscript, RunSummary, ScenarioCatalog, ScenarioRunner};
use colloquy_error::ColloquyResult;
use colloquy_interface::TelemetryBackend;
use colloquy_models::OpenAIClient;
use colloquy_telemetry::{
    InMemoryTelemetry, LangfuseTelemetry, OtelTelemetry, TelemetryBackendKind,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// Build the completion driver from `[completion]`.
///
/// # Errors
///
/// Returns a configuration error if the API key variable is unset.
pub fn build_driver(completion: &CompletionConfig, model: &str) -> ColloquyResult<OpenAIClient> {
    Ok(OpenAIClient::from_env(&completion.api_key_env, model)?
        .with_base_url(completion.base_url.clone())
        .with_timeout(Duration::from_secs(completion.timeout_secs)))
}

/// Build the telemetry backend from `[telemetry]`.
///
/// # Errors
///
/// Returns a configuration error if Langfuse is selected and its keys are unset.
pub fn build_telemetry(telemetry: &TelemetryConfig) -> ColloquyResult<Arc<dyn TelemetryBackend>> {
    let backend: Arc<dyn TelemetryBackend> = match telemetry.backend {
        TelemetryBackendKind::Langfuse => Arc::new(LangfuseTelemetry::from_env(
            &telemetry.public_key_env,
            &telemetry.secret_key_env,
            &telemetry.host,
        )?),
        TelemetryBackendKind::Stdout => Arc::new(OtelTelemetry::stdout(telemetry.service_name.clone())),
        TelemetryBackendKind::Memory => Arc::new(InMemoryTelemetry::new()),
    };
    info!(backend = backend.backend_name(), "Telemetry backend ready");
    Ok(backend)
}

/// Load the catalog named in `[scenarios]`, or the built-in one.
///
/// # Errors
///
/// Returns a scenario error if the catalog is unreadable or invalid.
pub fn load_catalog(scenarios: &ScenariosConfig) -> ColloquyResult<ScenarioCatalog> {
    let catalog = match &scenarios.path {
        Some(path) => ScenarioCatalog::from_file(path)?,
        None => ScenarioCatalog::builtin()?,
    };
    Ok(catalog)
}

/// Where the transcript tells the reader to look for traces.
fn dashboard_hint(telemetry: &TelemetryConfig) -> Option<String> {
    match telemetry.backend {
        TelemetryBackendKind::Langfuse => Some(format!("your Langfuse dashboard ({})", telemetry.host)),
        TelemetryBackendKind::Stdout => Some("the exported spans above".to_string()),
        TelemetryBackendKind::Memory => None,
    }
}

/// Run the configured catalog to completion.
///
/// Every fallible setup step (settings, catalog, credentials) happens before
/// the first session starts.
///
/// # Errors
///
/// Returns configuration and catalog errors only; turn and telemetry failures
/// are reported in the summary instead.
#[instrument(skip_all, fields(model = %config.conversation.model))]
pub async fn run(config: &ColloquyConfig) -> ColloquyResult<RunSummary> {
    let settings = config.conversation.to_settings()?;
    let catalog = load_catalog(&config.scenarios)?;
    let driver = build_driver(&config.completion, settings.model())?;
    let telemetry = build_telemetry(&config.telemetry)?;

    let mut transcript = ConsoleTranscript::default();
    if let Some(hint) = dashboard_hint(&config.telemetry) {
        transcript = transcript.with_dashboard_hint(hint);
    }

    let runner = ScenarioRunner::new(driver, telemetry, settings).with_observer(transcript);
    Ok(runner.run_all(&catalog).await)
}
