//! Layered configuration.
//!
//! Sources, later overriding earlier:
//! 1. Bundled defaults (`colloquy.toml` shipped with the binary)
//! 2. `~/.config/colloquy/colloquy.toml`
//! 3. `./colloquy.toml`
//! 4. `COLLOQUY__<SECTION>__<KEY>` environment variables
//!
//! Credentials never live in these files; the `*_env` keys name the
//! environment variables that hold them.

use colloquy_conversation::ConversationSettings;
use colloquy_error::{ColloquyError, ColloquyResult, ConfigError};
use colloquy_telemetry::TelemetryBackendKind;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../../../colloquy.toml");

/// `[conversation]`: per-turn model parameters and pacing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConversationConfig {
    /// Model requested for every turn
    pub model: String,
    /// Reply length cap per turn
    pub max_tokens: u32,
    /// Temperature before any turn offset
    pub base_temperature: f64,
    /// Temperature added per turn number
    pub temperature_step: f64,
    /// Ceiling for the per-turn temperature
    pub max_temperature: f64,
    /// Fixed system instruction
    pub system_prompt: String,
    /// Pause after every turn, in milliseconds
    pub turn_delay_ms: u64,
    /// Pause after every session, in milliseconds
    pub session_delay_ms: u64,
}

impl ConversationConfig {
    /// Validated conversation settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for out-of-range values.
    pub fn to_settings(&self) -> ColloquyResult<ConversationSettings> {
        ConversationSettings::builder()
            .model(self.model.clone())
            .max_tokens(self.max_tokens)
            .base_temperature(self.base_temperature)
            .temperature_step(self.temperature_step)
            .max_temperature(self.max_temperature)
            .system_prompt(self.system_prompt.clone())
            .turn_delay(Duration::from_millis(self.turn_delay_ms))
            .session_delay(Duration::from_millis(self.session_delay_ms))
            .build()
            .map_err(|e| ConfigError::new(format!("Invalid [conversation] settings: {}", e)).into())
    }
}

/// `[completion]`: the chat-completions endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CompletionConfig {
    /// API root of an OpenAI-compatible endpoint
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// `[telemetry]`: where traces go.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// Backend selection
    pub backend: TelemetryBackendKind,
    /// Langfuse host
    pub host: String,
    /// Environment variable holding the Langfuse public key
    pub public_key_env: String,
    /// Environment variable holding the Langfuse secret key
    pub secret_key_env: String,
    /// Service name for OpenTelemetry resources
    pub service_name: String,
}

/// `[logging]`: diagnostics on stderr.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of text
    pub json: bool,
    /// Export LLM request metrics to stdout
    #[serde(default)]
    pub metrics: bool,
}

/// `[scenarios]`: which catalog to run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ScenariosConfig {
    /// Catalog file; the built-in catalog when absent
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Top-level Colloquy configuration.
///
/// # Example
///
/// ```no_run
/// use colloquy::ColloquyConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ColloquyConfig::load()?;
/// println!("model: {}", config.conversation.model);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ColloquyConfig {
    /// Conversation parameters
    pub conversation: ConversationConfig,
    /// Completion endpoint
    pub completion: CompletionConfig,
    /// Telemetry backend
    pub telemetry: TelemetryConfig,
    /// Logging
    pub logging: LoggingConfig,
    /// Scenario catalog
    #[serde(default)]
    pub scenarios: ScenariosConfig,
}

impl ColloquyConfig {
    fn defaults() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> ColloquyResult<Self> {
        builder
            .build()
            .map_err(|e| {
                ColloquyError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                ColloquyError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// The bundled defaults alone.
    pub fn bundled() -> ColloquyResult<Self> {
        Self::finish(Self::defaults())
    }

    /// Bundled defaults overridden by one file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> ColloquyResult<Self> {
        debug!("Loading configuration from file");
        Self::finish(Self::defaults().add_source(File::from(path.as_ref()).required(true)))
    }

    /// Load configuration from every source, in precedence order.
    #[instrument]
    pub fn load() -> ColloquyResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled defaults");

        let mut builder = Self::defaults();

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/colloquy/colloquy.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("colloquy").required(false))
            .add_source(
                Environment::with_prefix("COLLOQUY")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::finish(builder)
    }
}
