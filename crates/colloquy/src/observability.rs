//! Logging and metrics initialization.
//!
//! Diagnostics go to stderr so the conversation transcript owns stdout.

use crate::LoggingConfig;
use opentelemetry::{KeyValue, global};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use std::env;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Service name for telemetry attribution
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Log level filter used when `RUST_LOG` is unset (e.g., "info", "debug")
    pub log_level: String,
    /// Enable JSON-formatted logs
    pub json_logs: bool,
    /// Export metrics with the stdout exporter
    pub stdout_metrics: bool,
}

impl ObservabilityConfig {
    /// Create a new configuration with the given service name.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            stdout_metrics: false,
        }
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable JSON-formatted logs.
    pub fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }

    /// Enable the stdout metrics exporter.
    pub fn with_stdout_metrics(mut self, enabled: bool) -> Self {
        self.stdout_metrics = enabled;
        self
    }

    /// Build from the `[logging]` section.
    pub fn from_logging(service_name: impl Into<String>, logging: &LoggingConfig) -> Self {
        Self::new(service_name)
            .with_log_level(logging.level.clone())
            .with_json_logs(logging.json)
            .with_stdout_metrics(logging.metrics)
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"))
    }
}

/// Keeps exporters alive; flushes them when dropped.
#[derive(Debug, Default)]
pub struct ObservabilityGuard {
    meter_provider: Option<SdkMeterProvider>,
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.meter_provider.take()
            && let Err(e) = provider.shutdown()
        {
            tracing::warn!(error = %e, "Failed to shut down meter provider");
        }
    }
}

/// Initialize logging (and optionally metrics) with custom configuration.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_observability_with_config(
    config: ObservabilityConfig,
) -> Result<ObservabilityGuard, Box<dyn std::error::Error>> {
    let env_filter = match env::var("RUST_LOG") {
        Ok(_) => EnvFilter::try_from_default_env()?,
        Err(_) => EnvFilter::try_new(&config.log_level)?,
    };

    let fmt_layer = if config.json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    let meter_provider = config.stdout_metrics.then(|| {
        let resource = Resource::builder()
            .with_service_name(config.service_name.clone())
            .with_attributes(vec![KeyValue::new(
                "service.version",
                config.service_version.clone(),
            )])
            .build();
        let provider = SdkMeterProvider::builder()
            .with_periodic_exporter(opentelemetry_stdout::MetricExporter::default())
            .with_resource(resource)
            .build();
        global::set_meter_provider(provider.clone());
        provider
    });

    Ok(ObservabilityGuard { meter_provider })
}
