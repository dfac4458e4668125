//! HTTP client settings.

use conduit_core::MergedModelConfig;
use conduit_error::{ConduitResult, HttpError, HttpErrorKind};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::time::Duration;

/// Settings applied to every client a manager builds.
///
/// # Examples
///
/// ```
/// use conduit_http::ClientConfig;
/// use std::collections::HashMap;
/// use std::time::Duration;
///
/// let config = ClientConfig::builder()
///     .timeout(Duration::from_secs(10))
///     .headers(HashMap::from([("x-api-key".to_string(), "secret".to_string())]))
///     .build()
///     .unwrap();
///
/// assert_eq!(*config.max_retries(), 3);
/// assert!(*config.follow_redirects());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    derive_getters::Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(setter(into))]
pub struct ClientConfig {
    /// Per-request timeout
    #[builder(default = "Duration::from_secs(60)")]
    timeout: Duration,

    /// Retry budget for calls made through this client
    #[builder(default = "3")]
    max_retries: u32,

    /// Default headers sent with every request
    #[builder(default)]
    headers: HashMap<String, String>,

    /// Whether redirects are followed
    #[builder(default = "true")]
    follow_redirects: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_retries: 3,
            headers: HashMap::new(),
            follow_redirects: true,
        }
    }
}

impl ClientConfig {
    /// Creates a new config builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Default headers as a typed header map.
    ///
    /// # Errors
    ///
    /// Returns an HTTP client error naming the first invalid header.
    pub fn header_map(&self) -> ConduitResult<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.headers.len());

        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                HttpError::new(HttpErrorKind::Client(format!(
                    "Invalid header name '{}': {}",
                    name, e
                )))
                .with_cause(e)
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                HttpError::new(HttpErrorKind::Client(format!(
                    "Invalid value for header '{}': {}",
                    name, e
                )))
                .with_cause(e)
            })?;
            map.insert(header_name, header_value);
        }

        Ok(map)
    }
}

impl From<&MergedModelConfig> for ClientConfig {
    fn from(merged: &MergedModelConfig) -> Self {
        Self {
            timeout: merged.timeout_duration(),
            max_retries: *merged.max_retries(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_core::ConduitConfig;
    use conduit_error::ErrorClass;

    fn with_header(name: &str, value: &str) -> ClientConfig {
        ClientConfig::builder()
            .headers(HashMap::from([(name.to_string(), value.to_string())]))
            .build()
            .unwrap()
    }

    #[test]
    fn test_default_matches_builder() {
        assert_eq!(ClientConfig::default(), ClientConfig::builder().build().unwrap());
    }

    #[test]
    fn test_setters_override_single_fields() {
        let config = ClientConfig::default()
            .with_follow_redirects(false)
            .with_timeout(Duration::from_secs(5));

        assert!(!*config.follow_redirects());
        assert_eq!(*config.timeout(), Duration::from_secs(5));
        assert_eq!(*config.max_retries(), 3);
    }

    #[test]
    fn test_from_merged_model_config() {
        let config = ConduitConfig::from_toml_str(
            r#"
            [models.fast]
            model_type = "openai"
            api_key_env = "OPENAI_API_KEY"
            timeout = 2.5
            max_retries = 7
            "#,
        )
        .unwrap();

        let client = ClientConfig::from(&config.merged("fast"));
        assert_eq!(*client.timeout(), Duration::from_millis(2500));
        assert_eq!(*client.max_retries(), 7);
        assert!(client.headers().is_empty());
    }

    #[test]
    fn test_header_map_accepts_valid_headers() {
        let map = with_header("Authorization", "Bearer token").header_map().unwrap();
        assert_eq!(map.get("authorization").unwrap(), "Bearer token");
    }

    #[test]
    fn test_invalid_header_name_is_client_error() {
        let err = with_header("bad header", "x").header_map().unwrap_err();
        assert_eq!(err.class(), ErrorClass::HttpClient);
        assert!(err.to_string().contains("Invalid header name 'bad header'"));
    }

    #[test]
    fn test_invalid_header_value_is_client_error() {
        let err = with_header("x-token", "line\nbreak").header_map().unwrap_err();
        assert_eq!(err.class(), ErrorClass::HttpClient);
    }
}
