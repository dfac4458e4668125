//! Tests for the shared model client and provider traits.

use async_trait::async_trait;
use conduit_core::{
    CompletionRequest, CompletionResult, ConduitConfig, EmbeddingRequest, EmbeddingResult,
};
use conduit_error::{ConduitError, ConduitResult, ErrorClass, HttpError, HttpErrorKind};
use conduit_http::HttpClientManager;
use conduit_interface::{Completion, Embeddings, ModelClient, ModelDriver};
use std::collections::HashMap;
use std::time::Duration;

const CONFIG: &str = r#"
[models.echo]
model_type = "echo"
api_key_env = "PATH"
timeout = 5.0
max_retries = 2

[models.locked]
model_type = "echo"
api_key_env = "CONDUIT_TEST_KEY_THAT_IS_NEVER_SET"
"#;

/// Provider that answers locally, for exercising the traits.
struct EchoDriver {
    client: ModelClient,
}

impl EchoDriver {
    fn new(model: &str) -> Self {
        let config = ConduitConfig::from_toml_str(CONFIG).unwrap();
        Self {
            client: ModelClient::from_config(model, &config),
        }
    }
}

impl ModelDriver for EchoDriver {
    fn model_name(&self) -> &str {
        self.client.model_name()
    }

    fn validate_environment(&self) -> ConduitResult<()> {
        self.client.api_key().map(|_| ())
    }

    fn http(&self) -> &HttpClientManager {
        self.client.http()
    }
}

#[async_trait]
impl Completion for EchoDriver {
    async fn completion(&self, request: &CompletionRequest) -> ConduitResult<CompletionResult> {
        Ok(CompletionResult {
            text: request.prompt.join(" "),
            model: request.model.clone(),
            usage: HashMap::from([("prompt_tokens".to_string(), request.prompt.len() as u64)]),
            metadata: HashMap::new(),
        })
    }
}

#[async_trait]
impl Embeddings for EchoDriver {
    async fn embedding(&self, request: &EmbeddingRequest) -> ConduitResult<EmbeddingResult> {
        Ok(EmbeddingResult {
            embeddings: request.input.iter().map(|text| vec![text.len() as f32]).collect(),
            model: request.model.clone(),
            usage: HashMap::new(),
        })
    }
}

#[tokio::test]
async fn test_completion_through_trait_object() {
    let driver: Box<dyn Completion> = Box::new(EchoDriver::new("echo"));
    let request = CompletionRequest::builder()
        .prompt(vec!["hello".to_string(), "world".to_string()])
        .model("echo")
        .build()
        .unwrap();

    let result = driver.completion(&request).await.unwrap();

    assert_eq!(result.text, "hello world");
    assert_eq!(result.usage["prompt_tokens"], 2);
    assert_eq!(driver.model_name(), "echo");
}

#[tokio::test]
async fn test_embedding_one_vector_per_input() {
    let driver = EchoDriver::new("echo");
    let request = EmbeddingRequest {
        input: vec!["a".into(), "abc".into()],
        model: "echo".into(),
        extra: Default::default(),
    };

    let result = driver.embedding(&request).await.unwrap();
    assert_eq!(result.embeddings, vec![vec![1.0], vec![3.0]]);
}

#[test]
fn test_client_uses_merged_model_settings() {
    let driver = EchoDriver::new("echo");

    assert_eq!(*driver.http().config().timeout(), Duration::from_secs(5));
    assert_eq!(*driver.client.retry().policy().max_retries(), 2);
    assert!(!driver.http().has_client(), "clients are built lazily");
}

#[test]
fn test_unknown_model_falls_back_to_global_defaults() {
    let config = ConduitConfig::from_toml_str(CONFIG).unwrap();
    let client = ModelClient::from_config("unlisted", &config);

    assert_eq!(*client.http().config().timeout(), Duration::from_secs(60));
    let err = client.api_key().unwrap_err();
    assert_eq!(err.class(), ErrorClass::Config);
}

#[test]
fn test_validate_environment() {
    assert!(EchoDriver::new("echo").validate_environment().is_ok());

    let err = EchoDriver::new("locked").validate_environment().unwrap_err();
    assert_eq!(err.class(), ErrorClass::Config);
    assert!(err.to_string().contains("CONDUIT_TEST_KEY_THAT_IS_NEVER_SET"));
}

#[tokio::test]
async fn test_close_releases_pooled_clients() {
    let driver = EchoDriver::new("echo");
    driver.http().async_client().await.unwrap();
    assert!(driver.http().has_async_client().await);

    driver.client.aclose().await;
    assert!(!driver.http().has_async_client().await);
}

#[tokio::test]
async fn test_close_blocking_client_from_async_code() {
    let driver = std::sync::Arc::new(EchoDriver::new("echo"));
    let warm = std::sync::Arc::clone(&driver);
    tokio::task::spawn_blocking(move || warm.http().client().map(|_| ()))
        .await
        .unwrap()
        .unwrap();
    assert!(driver.http().has_client());

    driver.client.close();
    assert!(!driver.http().has_client());
    drop(driver);
}

#[tokio::test]
async fn test_translate_transport_error() {
    let transport = reqwest::Client::new().get("not a url").send().await.unwrap_err();

    let err = ModelClient::translate_error(transport);

    assert_eq!(err.class(), ErrorClass::HttpClient);
    assert!(err.to_string().contains("HTTP Error"));
}

#[tokio::test]
async fn test_translate_elapsed_timeout() {
    let elapsed = tokio::time::timeout(Duration::ZERO, std::future::pending::<()>())
        .await
        .unwrap_err();

    let err = ModelClient::translate_error(elapsed);

    assert_eq!(err.class(), ErrorClass::Timeout);
    assert!(err.to_string().contains("Request timed out"));
}

#[test]
fn test_translate_io_timeout() {
    let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "read timed out");
    assert_eq!(ModelClient::translate_error(io).class(), ErrorClass::Timeout);
}

#[test]
fn test_translate_passes_conduit_errors_through() {
    let original: ConduitError = HttpError::new(HttpErrorKind::Network).into();
    let line = match original.kind() {
        conduit_error::ConduitErrorKind::Http(e) => e.line,
        _ => unreachable!(),
    };

    let err = ModelClient::translate_error(original);

    assert_eq!(err.class(), ErrorClass::Network);
    match err.kind() {
        conduit_error::ConduitErrorKind::Http(e) => assert_eq!(e.line, line),
        other => panic!("expected HTTP error, got {other}"),
    }
}

#[test]
fn test_translate_other_errors_are_unexpected() {
    let err = ModelClient::translate_error("model returned garbage");

    assert_eq!(err.class(), ErrorClass::Unexpected);
    assert!(err.to_string().contains("Unexpected error: model returned garbage"));
}
