//! The document value produced by classification.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered metadata mapping; iteration follows insertion order.
pub type MetadataMap = serde_json::Map<String, Value>;

/// A simplistic representation of a document.
///
/// Immutable by convention: [`with_metadata`](Document::with_metadata)
/// returns a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Backend document id
    pub id: u64,
    /// Backend document type id, if known
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<u64>,
    /// Document text
    #[serde(default)]
    pub text: String,
    /// Desired metadata, including reserved `_suggested_*` directives
    #[serde(default, skip_serializing_if = "MetadataMap::is_empty")]
    pub metadata: MetadataMap,
}

impl Document {
    pub fn new(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            document_type: None,
            text: text.into(),
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_type(mut self, document_type: u64) -> Self {
        self.document_type = Some(document_type);
        self
    }

    /// Copy of this document with `metadata` merged in.
    ///
    /// Existing keys keep their position and take the new value; new keys
    /// are appended in the order given.
    pub fn with_metadata<I, K>(&self, metadata: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut merged = self.metadata.clone();
        for (key, value) in metadata {
            merged.insert(key.into(), value);
        }
        Self {
            metadata: merged,
            ..self.clone()
        }
    }
}
