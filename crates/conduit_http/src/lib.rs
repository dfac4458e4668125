//! Pooled HTTP clients for model providers.
//!
//! [`HttpClientManager`] owns at most one blocking and one async
//! [`reqwest`] client per configuration, builds them on first use, and is the
//! single place where transport failures become [`conduit_error::HttpError`]s.
//!
//! # Example
//!
//! ```no_run
//! use conduit_http::{ClientConfig, HttpClientManager};
//! use std::time::Duration;
//!
//! # async fn example() -> conduit_error::ConduitResult<()> {
//! let config = ClientConfig::builder()
//!     .timeout(Duration::from_secs(30))
//!     .build()
//!     .unwrap();
//! let http = HttpClientManager::new(config);
//!
//! let status = http
//!     .with_async_client(|client| async move {
//!         let response = client.get("https://example.com").send().await?;
//!         Ok(response.status())
//!     })
//!     .await?;
//! println!("{status}");
//!
//! http.aclose().await;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod manager;
mod translate;

pub use config::{ClientConfig, ClientConfigBuilder};
pub use manager::HttpClientManager;
pub use translate::translate_transport_error;
