//! Per-model connection handle.

use crate::{ConnectionState, Connector, SimulatedConnector};
use conduit_error::{ConduitResult, ConnectionError};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument};

/// Connection to one model, with its lifecycle state.
///
/// `connect` and `disconnect` are idempotent and serialized under the
/// handle's own lock, so concurrent callers trigger at most one handshake.
#[derive(Debug)]
pub struct ModelConnection {
    model_id: String,
    config: HashMap<String, JsonValue>,
    state: Mutex<ConnectionState>,
    connector: Arc<dyn Connector>,
}

impl ModelConnection {
    /// Disconnected handle using the [`SimulatedConnector`].
    pub fn new(model_id: impl Into<String>, config: HashMap<String, JsonValue>) -> Self {
        Self::with_connector(model_id, config, Arc::new(SimulatedConnector::default()))
    }

    /// Disconnected handle using `connector` for handshakes.
    pub fn with_connector(
        model_id: impl Into<String>,
        config: HashMap<String, JsonValue>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            config,
            state: Mutex::new(ConnectionState::Disconnected),
            connector,
        }
    }

    /// Model this handle connects to.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Connection parameters passed to the connector.
    pub fn config(&self) -> &HashMap<String, JsonValue> {
        &self.config
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> ConnectionState {
        *self.state.lock().await
    }

    /// Whether the handle is connected.
    pub async fn is_connected(&self) -> bool {
        self.state().await == ConnectionState::Connected
    }

    /// Open the connection. Does nothing when already connected.
    ///
    /// # Errors
    ///
    /// Returns a model connection error, with the handshake failure as its
    /// cause. The handle is left disconnected.
    #[instrument(skip(self), fields(model_id = %self.model_id))]
    pub async fn connect(&self) -> ConduitResult<()> {
        let mut state = self.state.lock().await;
        if *state == ConnectionState::Connected {
            debug!("Already connected");
            return Ok(());
        }

        let transition = Transition::begin(
            &mut state,
            ConnectionState::Connecting,
            ConnectionState::Disconnected,
        );

        match self.connector.connect(&self.model_id, &self.config).await {
            Ok(()) => {
                transition.finish(ConnectionState::Connected);
                info!(model_id = %self.model_id, "Successfully connected to model");
                Ok(())
            }
            Err(e) => {
                error!(model_id = %self.model_id, error = %e, "Failed to connect to model");
                Err(ConnectionError::new(&self.model_id).with_cause(e).into())
            }
        }
    }

    /// Close the connection. Does nothing when already disconnected.
    ///
    /// Teardown failures are logged and swallowed; the handle always ends up
    /// disconnected.
    #[instrument(skip(self), fields(model_id = %self.model_id))]
    pub async fn disconnect(&self) {
        let mut state = self.state.lock().await;
        if *state == ConnectionState::Disconnected {
            debug!("Already disconnected");
            return;
        }

        let transition = Transition::begin(
            &mut state,
            ConnectionState::Disconnecting,
            ConnectionState::Disconnected,
        );

        match self.connector.disconnect(&self.model_id).await {
            Ok(()) => info!(model_id = %self.model_id, "Successfully disconnected from model"),
            Err(e) => {
                error!(model_id = %self.model_id, error = %e, "Error disconnecting from model")
            }
        }

        transition.finish(ConnectionState::Disconnected);
    }
}

/// In-flight state change that falls back if it is never finished.
///
/// Dropping it unfinished (handshake error or cancelled future) writes the
/// fallback state.
struct Transition<'a> {
    state: &'a mut ConnectionState,
    fallback: ConnectionState,
    settled: bool,
}

impl<'a> Transition<'a> {
    fn begin(
        state: &'a mut ConnectionState,
        during: ConnectionState,
        fallback: ConnectionState,
    ) -> Self {
        *state = during;
        Self {
            state,
            fallback,
            settled: false,
        }
    }

    fn finish(mut self, end: ConnectionState) {
        *self.state = end;
        self.settled = true;
    }
}

impl Drop for Transition<'_> {
    fn drop(&mut self) {
        if !self.settled {
            *self.state = self.fallback;
        }
    }
}
