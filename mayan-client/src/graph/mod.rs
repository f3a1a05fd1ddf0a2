//! Typed resources of the mayan-edms API and the links between them.
//!
//! ```text
//! Client ──► Cabinet ──► documents / documents/add
//!    │
//!    ├─────► Document ──► metadata ──► MetadataEntry
//!    │          ├──────► tags / tags/attach
//!    │          ├──────► document_type (embedded) ──► metadata_types
//!    │          ├──────► file_list_url ──► DocumentFile ──► pages ──► content
//!    │          └──────► latest_version (embedded) ──► pages ──► ocr
//!    └─────► DocumentType
//! ```

use async_trait::async_trait;
use futures::TryStreamExt;
use serde_json::Value;

use crate::error::{MayanError, Result};
use crate::paged::{PagedCollection, Representation};
use crate::resource::Resource;

pub use client::{Cabinet, Client};
pub use document::{Document, MetadataEntry, Tag};
pub use document_type::{DocumentType, MetadataTypeDescriptor};
pub use file::{DocumentFile, DocumentFilePage};
pub use version::{DocumentPage, DocumentVersion};

macro_rules! representation {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            resource: $crate::resource::Resource,
        }

        impl $crate::paged::Representation for $name {
            fn from_resource(resource: $crate::resource::Resource) -> Self {
                Self { resource }
            }

            fn resource(&self) -> &$crate::resource::Resource {
                &self.resource
            }
        }
    };
}

mod client;
mod document;
mod document_type;
mod file;
mod version;

/// Numeric id stored under `key` of `value`.
pub(crate) fn id_field(resource: &Resource, value: &Value, key: &str) -> Result<u64> {
    value
        .get(key)
        .and_then(Value::as_u64)
        .ok_or_else(|| MayanError::protocol(resource.path(), format!("missing numeric `{}`", key)))
}

/// String stored under `key` of `value`.
pub(crate) fn str_field(resource: &Resource, value: &Value, key: &str) -> Result<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| MayanError::protocol(resource.path(), format!("missing string `{}`", key)))
}

/// A page that yields some text.
#[async_trait]
pub(crate) trait PageText: Representation + Sync {
    async fn page_text(&self) -> Result<String>;
}

/// Text of every page, in server order, joined with newlines.
pub(crate) async fn join_page_text<T: PageText>(pages: &PagedCollection<T>) -> Result<String> {
    let mut stream = pages.enumerate(&[]);
    let mut texts = Vec::new();
    while let Some(page) = stream.try_next().await? {
        texts.push(page.page_text().await?);
    }
    Ok(texts.join("\n"))
}

/// `content` field of a text-bearing resource; `null` reads as empty.
pub(crate) async fn content_of(resource: &Resource) -> Result<String> {
    let value = resource.get().await?;
    match value.get("content") {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(Value::Null) | None => Ok(String::new()),
        Some(other) => Err(MayanError::protocol(
            resource.path(),
            format!("content is not text: {}", other),
        )),
    }
}
