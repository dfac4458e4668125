//! Shared state and helpers for model providers.

use conduit_core::{ConduitConfig, MergedModelConfig};
use conduit_error::{
    ConduitError, ConduitResult, ConfigError, HttpError, HttpErrorKind, UnexpectedError,
};
use conduit_http::{ClientConfig, HttpClientManager, translate_transport_error};
use conduit_rate_limit::{RetryHandler, RetryPolicy};
use std::error::Error;
use tracing::debug;

/// Per-model client state every provider needs.
///
/// Built from the merged configuration for one model: the HTTP clients use
/// the model's timeout, the retry handler its retry budget. Release the
/// pooled clients with [`close`](Self::close) and [`aclose`](Self::aclose).
///
/// # Example
///
/// ```
/// use conduit_core::ConduitConfig;
/// use conduit_interface::ModelClient;
///
/// let config = ConduitConfig::from_toml_str(r#"
///     [models."gpt-4o"]
///     model_type = "openai"
///     api_key_env = "OPENAI_API_KEY"
///     max_retries = 5
/// "#).unwrap();
///
/// let client = ModelClient::from_config("gpt-4o", &config);
/// assert_eq!(*client.retry().policy().max_retries(), 5);
/// ```
#[derive(Debug)]
pub struct ModelClient {
    model_name: String,
    api_key_env: Option<String>,
    config: MergedModelConfig,
    http: HttpClientManager,
    retry: RetryHandler,
}

impl ModelClient {
    /// Client for `model_name` using the layered configuration on disk.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a config file cannot be parsed.
    pub fn new(model_name: impl Into<String>) -> ConduitResult<Self> {
        let config = ConduitConfig::load()?;
        Ok(Self::from_config(model_name, &config))
    }

    /// Client for `model_name` using an already loaded configuration.
    pub fn from_config(model_name: impl Into<String>, config: &ConduitConfig) -> Self {
        let model_name = model_name.into();
        let merged = config.merged(&model_name);
        let api_key_env = config.model(&model_name).map(|m| m.api_key_env().clone());

        debug!(
            model = %model_name,
            timeout = merged.timeout(),
            max_retries = merged.max_retries(),
            "Creating new ModelClient"
        );

        Self {
            http: HttpClientManager::new(ClientConfig::from(&merged)),
            retry: RetryHandler::new(RetryPolicy::with_max_retries(*merged.max_retries())),
            model_name,
            api_key_env,
            config: merged,
        }
    }

    /// Model identifier.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Resolved settings for this model.
    pub fn config(&self) -> &MergedModelConfig {
        &self.config
    }

    /// Pooled HTTP clients.
    ///
    /// From async code, use the async client. The blocking client is for
    /// synchronous sections such as `spawn_blocking`, and an `Arc` taken from
    /// it must be dropped there too.
    pub fn http(&self) -> &HttpClientManager {
        &self.http
    }

    /// Retry handler configured with this model's retry budget.
    pub fn retry(&self) -> &RetryHandler {
        &self.retry
    }

    /// Read the API key from the environment variable configured for this model.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the model has no `api_key_env` or the
    /// variable is unset.
    pub fn api_key(&self) -> ConduitResult<String> {
        let var = self.api_key_env.as_deref().ok_or_else(|| {
            ConfigError::new(format!("No api_key_env configured for model {}", self.model_name))
        })?;

        std::env::var(var).map_err(|_| {
            ConfigError::new(format!("Environment variable {} is not set", var)).into()
        })
    }

    /// Release the blocking HTTP client.
    ///
    /// Safe to call from async code: the manager drops the client on the
    /// blocking pool when a Tokio runtime is running.
    pub fn close(&self) {
        self.http.close();
    }

    /// Release the async HTTP client.
    pub async fn aclose(&self) {
        self.http.aclose().await;
    }

    /// Translate any provider failure into the error taxonomy.
    ///
    /// - [`ConduitError`]s pass through unchanged.
    /// - [`reqwest::Error`]s are translated like every other transport error.
    /// - Elapsed Tokio timeouts and I/O timeouts become "Request timed out".
    /// - Anything else becomes an unexpected error carrying the original.
    pub fn translate_error(
        error: impl Into<Box<dyn Error + Send + Sync + 'static>>,
    ) -> ConduitError {
        let error = error.into();

        let error = match error.downcast::<ConduitError>() {
            Ok(conduit) => return *conduit,
            Err(other) => other,
        };

        let error = match error.downcast::<reqwest::Error>() {
            Ok(transport) => return translate_transport_error(*transport),
            Err(other) => other,
        };

        if error.is::<tokio::time::error::Elapsed>()
            || error
                .downcast_ref::<std::io::Error>()
                .is_some_and(|e| e.kind() == std::io::ErrorKind::TimedOut)
        {
            debug!(error = %error, "Provider call timed out");
            return HttpError::new(HttpErrorKind::Timeout).into();
        }

        UnexpectedError::from_boxed(error).into()
    }
}
