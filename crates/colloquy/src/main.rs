//! Colloquy binary.
//!
//! Runs the configured scenario catalog once and exits. There are no flags;
//! everything comes from `colloquy.toml`, `COLLOQUY__*` variables and
//! `RUST_LOG`.

use colloquy::{ColloquyConfig, ObservabilityConfig, init_observability_with_config, run};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Credentials may come from .env
    dotenvy::dotenv().ok();

    let config = ColloquyConfig::load()?;
    let _observability = init_observability_with_config(ObservabilityConfig::from_logging(
        config.telemetry.service_name.clone(),
        &config.logging,
    ))?;

    let summary = run(&config).await?;
    tracing::info!(
        sessions = summary.sessions().len(),
        failed_turns = summary.failed_turns(),
        telemetry_flushed = summary.telemetry_flushed(),
        "Done"
    );

    Ok(())
}
