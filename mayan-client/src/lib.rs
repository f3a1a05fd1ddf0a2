//! Hypermedia client for the mayan-edms REST API
//!
//! Resources are addressed by paths relative to the API root and are only
//! fetched when read. Lists are walked page by page through the server's
//! `next` links.
//!
//! # Example
//!
//! ```rust,no_run
//! use mayan_client::{ClientSession, ConnectionConfig, MayanError};
//!
//! # async fn example() -> Result<(), MayanError> {
//! let config = ConnectionConfig::new("http://localhost:8000", "admin", "secret");
//!
//! let text = ClientSession::run(&config, |client| async move {
//!     let version = client.document(42).latest_version().await?;
//!     version.ocr_content().await
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod paged;
pub mod resource;
pub mod session;
pub mod transport;

// Re-export main types
pub use config::ConnectionConfig;
pub use error::{MayanError, Result};
pub use graph::*;
pub use paged::{PagedCollection, Representation};
pub use resource::{Resource, WriteResponse};
pub use session::{ClientSession, Connector};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, MockTransport, Transport};
