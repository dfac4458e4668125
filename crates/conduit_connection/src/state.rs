//! Connection lifecycle states.

use serde::{Deserialize, Serialize};

/// Where a [`ModelConnection`](crate::ModelConnection) is in its lifecycle.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionState {
    /// No live connection
    #[default]
    Disconnected,
    /// Handshake in progress
    Connecting,
    /// Ready for use
    Connected,
    /// Teardown in progress
    Disconnecting,
}
