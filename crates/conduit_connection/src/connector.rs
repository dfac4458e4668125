//! Model-specific connection handshakes.

use async_trait::async_trait;
use conduit_error::ConduitResult;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Performs the handshake for one kind of model backend.
///
/// Implementations are supplied by the provider layer. They hold no
/// connection state of their own; [`ModelConnection`](crate::ModelConnection)
/// tracks the lifecycle and serializes calls.
#[async_trait]
pub trait Connector: Send + Sync + std::fmt::Debug {
    /// Open the connection for `model_id`.
    async fn connect(
        &self,
        model_id: &str,
        config: &HashMap<String, JsonValue>,
    ) -> ConduitResult<()>;

    /// Tear down the connection for `model_id`.
    async fn disconnect(&self, model_id: &str) -> ConduitResult<()>;
}

/// Stand-in handshake that only waits.
///
/// Used until a provider supplies a real [`Connector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedConnector {
    handshake: Duration,
}

impl SimulatedConnector {
    /// Handshake duration of the default connector.
    pub const DEFAULT_HANDSHAKE: Duration = Duration::from_millis(100);

    /// Connector whose connect and disconnect each take `handshake`.
    pub fn new(handshake: Duration) -> Self {
        Self { handshake }
    }

    /// Time each handshake takes.
    pub fn handshake(&self) -> Duration {
        self.handshake
    }
}

impl Default for SimulatedConnector {
    fn default() -> Self {
        Self::new(Self::DEFAULT_HANDSHAKE)
    }
}

#[async_trait]
impl Connector for SimulatedConnector {
    async fn connect(
        &self,
        model_id: &str,
        _config: &HashMap<String, JsonValue>,
    ) -> ConduitResult<()> {
        debug!(model_id, handshake = ?self.handshake, "Simulating connect");
        tokio::time::sleep(self.handshake).await;
        Ok(())
    }

    async fn disconnect(&self, model_id: &str) -> ConduitResult<()> {
        debug!(model_id, handshake = ?self.handshake, "Simulating disconnect");
        tokio::time::sleep(self.handshake).await;
        Ok(())
    }
}
