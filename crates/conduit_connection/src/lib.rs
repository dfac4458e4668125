//! Connect/disconnect lifecycle for model connections.
//!
//! A [`ConnectionScope`] guarantees that a connection opened for a block of
//! work is closed when the block ends, whether it returns, fails, panics or
//! is cancelled.
//!
//! # Example
//!
//! ```
//! use conduit_connection::{ConnectionState, model_connection};
//! use conduit_error::ConduitError;
//! use std::collections::HashMap;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), ConduitError> {
//! let state = model_connection("gpt-4o", HashMap::new(), |conn| async move {
//!     Ok::<_, ConduitError>(conn.state().await)
//! })
//! .await?;
//!
//! assert_eq!(state, ConnectionState::Connected);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod connector;
mod scope;
mod state;

pub use connection::ModelConnection;
pub use connector::{Connector, SimulatedConnector};
pub use scope::{ConnectionScope, ScopedConnection, model_connection};
pub use state::ConnectionState;
