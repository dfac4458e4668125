//! Scoped connection lifetimes.

use crate::{Connector, ModelConnection, SimulatedConnector};
use conduit_error::{ConduitError, ConduitResult};
use futures::FutureExt;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::future::Future;
use std::ops::Deref;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, instrument, warn};

/// Opens a model connection for the duration of a block of work.
///
/// # Example
///
/// ```
/// use conduit_connection::{ConnectionScope, SimulatedConnector};
/// use std::collections::HashMap;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() -> conduit_error::ConduitResult<()> {
/// let scope = ConnectionScope::new("claude-3", HashMap::new())
///     .with_connector(Arc::new(SimulatedConnector::new(Duration::from_millis(5))));
///
/// let conn = scope.enter().await?;
/// assert!(conn.is_connected().await);
/// conn.close().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ConnectionScope {
    model_id: String,
    config: HashMap<String, JsonValue>,
    connector: Arc<dyn Connector>,
}

impl ConnectionScope {
    /// Scope for `model_id` using the [`SimulatedConnector`].
    pub fn new(model_id: impl Into<String>, config: HashMap<String, JsonValue>) -> Self {
        Self {
            model_id: model_id.into(),
            config,
            connector: Arc::new(SimulatedConnector::default()),
        }
    }

    /// Use `connector` for the handshakes.
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    /// Model this scope connects to.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Connect and return a guard that disconnects when closed or dropped.
    ///
    /// # Errors
    ///
    /// Returns a model connection error if the handshake fails. Nothing is
    /// left to disconnect in that case.
    pub async fn enter(self) -> ConduitResult<ScopedConnection> {
        let connection = Arc::new(ModelConnection::with_connector(
            self.model_id,
            self.config,
            self.connector,
        ));
        connection.connect().await?;

        Ok(ScopedConnection {
            connection,
            open: true,
        })
    }

    /// Connect, run `body`, then disconnect.
    ///
    /// The disconnect happens exactly once however `body` ends: a value, an
    /// error, a panic (re-raised after the disconnect) or cancellation of the
    /// returned future (disconnect scheduled on the runtime). The body's
    /// outcome is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns the connect failure without running `body`, or the body's own
    /// error.
    #[instrument(skip(self, body), fields(model_id = %self.model_id))]
    pub async fn run<F, Fut, T, E>(self, body: F) -> Result<T, E>
    where
        F: FnOnce(Arc<ModelConnection>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<ConduitError>,
    {
        let scoped = self.enter().await?;

        let outcome = AssertUnwindSafe(body(scoped.connection()))
            .catch_unwind()
            .await;
        scoped.close().await;

        match outcome {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Shorthand for `ConnectionScope::new(model_id, config).run(body)`.
pub async fn model_connection<F, Fut, T, E>(
    model_id: impl Into<String>,
    config: HashMap<String, JsonValue>,
    body: F,
) -> Result<T, E>
where
    F: FnOnce(Arc<ModelConnection>) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: From<ConduitError>,
{
    ConnectionScope::new(model_id, config).run(body).await
}

/// Connected handle that is disconnected when the scope ends.
///
/// Prefer [`close`](Self::close). Dropping an open guard schedules the
/// disconnect on the current Tokio runtime; outside a runtime the connection
/// is left open and a warning is logged.
#[derive(Debug)]
pub struct ScopedConnection {
    connection: Arc<ModelConnection>,
    open: bool,
}

impl ScopedConnection {
    /// Shared handle to the underlying connection.
    pub fn connection(&self) -> Arc<ModelConnection> {
        Arc::clone(&self.connection)
    }

    /// Disconnect now.
    pub async fn close(mut self) {
        self.open = false;
        self.connection.disconnect().await;
    }
}

impl Deref for ScopedConnection {
    type Target = ModelConnection;

    fn deref(&self) -> &Self::Target {
        &self.connection
    }
}

impl Drop for ScopedConnection {
    fn drop(&mut self) {
        if !self.open {
            return;
        }

        let connection = Arc::clone(&self.connection);
        match Handle::try_current() {
            Ok(handle) => {
                debug!(model_id = connection.model_id(), "Scheduling disconnect for dropped scope");
                handle.spawn(async move { connection.disconnect().await });
            }
            Err(_) => {
                warn!(
                    model_id = connection.model_id(),
                    "Scope dropped outside a Tokio runtime, connection left open"
                );
            }
        }
    }
}
