//! Configuration structures for models and global defaults.
//!
//! The configuration system supports:
//! - Bundled defaults (include_str! from conduit.toml)
//! - User overrides (./conduit.toml or ~/.config/conduit/conduit.toml)
//! - Explicit files in TOML, JSON or YAML
//!
//! The resilience crates never read configuration themselves; they take the
//! plain values produced by [`ConduitConfig::merged`].

use conduit_error::{ConduitError, ConduitResult, ConfigError};
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

fn default_timeout() -> f64 {
    60.0
}

fn default_max_retries() -> u32 {
    3
}

fn default_telemetry_enabled() -> bool {
    true
}

fn default_log_level() -> String {
    "INFO".to_string()
}

/// Settings shared by every model unless overridden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct GlobalConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    default_timeout: f64,

    /// Retry budget per call
    #[serde(default = "default_max_retries")]
    max_retries: u32,

    /// Whether responses are cached
    #[serde(default)]
    cache_enabled: bool,

    /// Whether tracing output is installed
    #[serde(default = "default_telemetry_enabled")]
    telemetry_enabled: bool,

    /// Log level name (e.g. "INFO", "DEBUG")
    #[serde(default = "default_log_level")]
    log_level: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_timeout: default_timeout(),
            max_retries: default_max_retries(),
            cache_enabled: false,
            telemetry_enabled: default_telemetry_enabled(),
            log_level: default_log_level(),
        }
    }
}

/// Per-model settings.
///
/// # Example
///
/// ```toml
/// [models."gpt-4o"]
/// model_type = "openai"
/// api_key_env = "OPENAI_API_KEY"
/// timeout = 30.0
/// max_retries = 5
///
/// [models."gpt-4o".additional_params]
/// organization = "acme"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ModelConfig {
    /// Provider family (e.g. "openai", "anthropic")
    model_type: String,

    /// Environment variable holding the API key
    api_key_env: String,

    /// Endpoint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    timeout: f64,

    /// Retry budget per call
    #[serde(default = "default_max_retries")]
    max_retries: u32,

    /// Provider-specific extras merged into the resolved configuration
    #[serde(default)]
    additional_params: HashMap<String, JsonValue>,
}

impl ModelConfig {
    /// Create a model configuration with default timeout and retries.
    pub fn new(model_type: impl Into<String>, api_key_env: impl Into<String>) -> Self {
        Self {
            model_type: model_type.into(),
            api_key_env: api_key_env.into(),
            base_url: None,
            timeout: default_timeout(),
            max_retries: default_max_retries(),
            additional_params: HashMap::new(),
        }
    }
}

/// Resolved settings for one model: global defaults overlaid by the model's own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct MergedModelConfig {
    /// Request timeout in seconds
    timeout: f64,
    /// Retry budget per call
    max_retries: u32,
    /// Whether responses are cached
    cache_enabled: bool,
    /// Provider-specific extras
    additional_params: HashMap<String, JsonValue>,
}

impl MergedModelConfig {
    /// Timeout as a [`Duration`]. Negative or non-finite values become zero.
    pub fn timeout_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout).unwrap_or(Duration::ZERO)
    }
}

impl Default for MergedModelConfig {
    fn default() -> Self {
        ConduitConfig::default().merged("")
    }
}

/// Top-level Conduit configuration.
///
/// # Example
///
/// ```
/// use conduit_core::ConduitConfig;
///
/// let config = ConduitConfig::from_toml_str(r#"
///     [global]
///     cache_enabled = true
///
///     [models."gpt-4o"]
///     model_type = "openai"
///     api_key_env = "OPENAI_API_KEY"
///     timeout = 30.0
/// "#).unwrap();
///
/// let merged = config.merged("gpt-4o");
/// assert_eq!(*merged.timeout(), 30.0);
/// assert!(*merged.cache_enabled());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConduitConfig {
    /// Global defaults
    #[serde(default)]
    pub global: GlobalConfig,

    /// Map of model name to model configuration
    #[serde(default)]
    pub models: HashMap<String, ModelConfig>,
}

impl ConduitConfig {
    /// Load configuration from a specific file path.
    ///
    /// The format is taken from the extension: `.toml`, `.json`, `.yml` or `.yaml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, has an unsupported extension,
    /// or cannot be parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> ConduitResult<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from file");

        if !path.exists() {
            return Err(ConfigError::new(format!(
                "Config file not found: {}",
                path.display()
            ))
            .into());
        }

        let format = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => FileFormat::Toml,
            Some("json") => FileFormat::Json,
            Some("yml" | "yaml") => FileFormat::Yaml,
            other => {
                return Err(ConfigError::new(format!(
                    "Unsupported config file format: .{}",
                    other.unwrap_or_default()
                ))
                .into());
            }
        };

        Self::build(Config::builder().add_source(File::from(path).format(format)))
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(contents: &str) -> ConduitResult<Self> {
        Self::build(Config::builder().add_source(File::from_str(contents, FileFormat::Toml)))
    }

    /// Load configuration with precedence: user override > bundled default.
    ///
    /// Configuration sources in order of precedence (later sources override earlier):
    /// 1. Bundled defaults (conduit.toml shipped with library)
    /// 2. User config in home directory (~/.config/conduit/conduit.toml)
    /// 3. User config in current directory (./conduit.toml, .json or .yaml)
    ///
    /// User config files are optional and will be silently skipped if not found.
    #[instrument]
    pub fn load() -> ConduitResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../../../conduit.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/conduit/conduit.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("conduit").required(false));

        Self::build(builder)
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> ConduitResult<Self> {
        builder
            .build()
            .map_err(|e| {
                ConduitError::from(
                    ConfigError::new(format!("Failed to load config: {}", e)).with_cause(e),
                )
            })?
            .try_deserialize()
            .map_err(|e| {
                ConduitError::from(
                    ConfigError::new(format!("Failed to parse configuration: {}", e))
                        .with_cause(e),
                )
            })
    }

    /// Look up the configuration of one model.
    pub fn model(&self, model_name: &str) -> Option<&ModelConfig> {
        self.models.get(model_name)
    }

    /// Resolve the settings for a model.
    ///
    /// Starts from the global defaults; if the model has its own entry, its
    /// timeout, retry budget and additional parameters take precedence.
    #[instrument(skip(self))]
    pub fn merged(&self, model_name: &str) -> MergedModelConfig {
        let mut merged = MergedModelConfig {
            timeout: self.global.default_timeout,
            max_retries: self.global.max_retries,
            cache_enabled: self.global.cache_enabled,
            additional_params: HashMap::new(),
        };

        if let Some(model) = self.model(model_name) {
            debug!(model_type = %model.model_type, "Applying model-specific overrides");
            merged.timeout = model.timeout;
            merged.max_retries = model.max_retries;
            merged.additional_params = model.additional_params.clone();
        }

        merged
    }
}
