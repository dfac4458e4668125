//! Lazily built, pooled HTTP clients.

use crate::{ClientConfig, translate_transport_error};
use conduit_error::ConduitResult;
use reqwest::redirect::Policy;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::Handle;
use tracing::{debug, info, instrument};

/// Maximum redirect hops when redirects are enabled.
const MAX_REDIRECTS: usize = 10;

/// Owns one blocking and one async client, each created on first use.
///
/// Repeated access reuses the same client (and its connection pool) until
/// [`close`](Self::close) or [`aclose`](Self::aclose) releases it; the next
/// access after that builds a fresh one. Each slot has its own lock, so
/// concurrent first use constructs a single client.
///
/// The blocking client runs its own internal runtime. Use it from synchronous
/// code only. Releasing it (through [`close`](Self::close) or by dropping the
/// manager) inside a Tokio runtime hands the final drop to the blocking pool;
/// callers still holding an `Arc` from [`client`](Self::client) must drop it
/// outside async code themselves.
#[derive(Debug)]
pub struct HttpClientManager {
    config: ClientConfig,
    sync_client: Mutex<Option<Arc<reqwest::blocking::Client>>>,
    async_client: tokio::sync::Mutex<Option<reqwest::Client>>,
}

impl HttpClientManager {
    /// Create a manager. No client is built until first use.
    pub fn new(config: ClientConfig) -> Self {
        debug!(
            timeout = ?config.timeout(),
            follow_redirects = config.follow_redirects(),
            "Creating new HttpClientManager"
        );
        Self {
            config,
            sync_client: Mutex::new(None),
            async_client: tokio::sync::Mutex::new(None),
        }
    }

    /// Settings applied to built clients.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The pooled blocking client, built on first call.
    ///
    /// # Errors
    ///
    /// Returns an HTTP client error if the client cannot be built.
    pub fn client(&self) -> ConduitResult<Arc<reqwest::blocking::Client>> {
        let mut slot = self
            .sync_client
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(client) = slot.as_ref() {
            return Ok(Arc::clone(client));
        }

        let client = Arc::new(self.build_blocking()?);
        *slot = Some(Arc::clone(&client));
        debug!("Built blocking HTTP client");
        Ok(client)
    }

    /// Run `section` with the pooled blocking client.
    ///
    /// Transport errors raised inside the section are translated. The client
    /// stays pooled afterwards.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use conduit_http::HttpClientManager;
    ///
    /// let http = HttpClientManager::new(Default::default());
    /// let body = http.with_client(|client| client.get("https://example.com").send()?.text())?;
    /// # Ok::<(), conduit_error::ConduitError>(())
    /// ```
    pub fn with_client<T, F>(&self, section: F) -> ConduitResult<T>
    where
        F: FnOnce(&reqwest::blocking::Client) -> Result<T, reqwest::Error>,
    {
        let client = self.client()?;
        section(&client).map_err(translate_transport_error)
    }

    /// The pooled async client, built on first call.
    ///
    /// `reqwest::Client` is a handle to a shared pool, so the returned clone
    /// reuses the manager's connections.
    ///
    /// # Errors
    ///
    /// Returns an HTTP client error if the client cannot be built.
    pub async fn async_client(&self) -> ConduitResult<reqwest::Client> {
        let mut slot = self.async_client.lock().await;

        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        let client = self.build_async()?;
        *slot = Some(client.clone());
        debug!("Built async HTTP client");
        Ok(client)
    }

    /// Run `section` with the pooled async client, translating transport errors.
    #[instrument(skip(self, section))]
    pub async fn with_async_client<T, F, Fut>(&self, section: F) -> ConduitResult<T>
    where
        F: FnOnce(reqwest::Client) -> Fut,
        Fut: Future<Output = Result<T, reqwest::Error>>,
    {
        let client = self.async_client().await?;
        section(client).await.map_err(translate_transport_error)
    }

    /// Whether a blocking client is currently pooled.
    pub fn has_client(&self) -> bool {
        self.sync_client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Whether an async client is currently pooled.
    pub async fn has_async_client(&self) -> bool {
        self.async_client.lock().await.is_some()
    }

    /// Release the blocking client. Idempotent.
    pub fn close(&self) {
        let released = self
            .sync_client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(client) = released {
            release_blocking(client);
            info!("Closed blocking HTTP client");
        }
    }

    /// Release the async client. Idempotent.
    pub async fn aclose(&self) {
        if self.async_client.lock().await.take().is_some() {
            info!("Closed async HTTP client");
        }
    }

    fn redirect_policy(&self) -> Policy {
        if *self.config.follow_redirects() {
            Policy::limited(MAX_REDIRECTS)
        } else {
            Policy::none()
        }
    }

    fn build_blocking(&self) -> ConduitResult<reqwest::blocking::Client> {
        let headers = self.config.header_map()?;
        reqwest::blocking::Client::builder()
            .timeout(*self.config.timeout())
            .default_headers(headers)
            .redirect(self.redirect_policy())
            .build()
            .map_err(translate_transport_error)
    }

    fn build_async(&self) -> ConduitResult<reqwest::Client> {
        let headers = self.config.header_map()?;
        reqwest::Client::builder()
            .timeout(*self.config.timeout())
            .default_headers(headers)
            .redirect(self.redirect_policy())
            .build()
            .map_err(translate_transport_error)
    }
}

impl Drop for HttpClientManager {
    fn drop(&mut self) {
        if let Some(client) = self
            .sync_client
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            release_blocking(client);
        }
    }
}

/// Drop a blocking client where its internal runtime may shut down.
///
/// Inside a Tokio runtime the drop runs on the blocking pool.
fn release_blocking(client: Arc<reqwest::blocking::Client>) {
    match Handle::try_current() {
        Ok(handle) => {
            handle.spawn_blocking(move || drop(client));
        }
        Err(_) => drop(client),
    }
}
