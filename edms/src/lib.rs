//! EDMS - document metadata reconciliation for mayan-edms
//!
//! A classifier decides what a document's metadata should be; this crate
//! makes the backend agree:
//! - ordinary keys update an attached metadata entry or create one
//! - `_suggested_filename`, `_suggested_doctype`, `_suggested_tags` and
//!   `_suggested_cabinets` map onto dedicated writes
//!
//! # Example
//!
//! ```rust,no_run
//! use edms::{Document, MayanDecorator};
//! use mayan_client::ConnectionConfig;
//! use serde_json::json;
//!
//! # async fn example() -> edms::Result<()> {
//! let decorator = MayanDecorator::new(ConnectionConfig::new(
//!     "http://localhost:8000",
//!     "admin",
//!     "secret",
//! ));
//!
//! let document = Document::new(42, "Shanks Enterprises\nInvoice #1001")
//!     .with_metadata([("vendor_name", json!("Shanks"))]);
//! let report = decorator.decorate(&document).await?;
//! println!("updated {:?}", report.updated);
//! # Ok(())
//! # }
//! ```

pub mod decorator;
pub mod directive;
pub mod document;
pub mod error;

pub use decorator::{MayanDecorator, SyncReport};
pub use directive::{Directive, DirectiveKind, MetadataKey, SyncPlan};
pub use document::{Document, MetadataMap};
pub use error::{DecorateError, Result};
