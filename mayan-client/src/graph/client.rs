use serde_json::json;
use std::sync::Arc;

use super::document::Document;
use super::document_type::DocumentType;
use crate::error::Result;
use crate::paged::{PagedCollection, Representation};
use crate::resource::{Resource, WriteResponse};
use crate::transport::Transport;

representation! {
    /// Entry point of the API, addressed at the API root.
    Client
}

impl Client {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::from_resource(Resource::root(transport))
    }

    pub fn cabinet(&self, id: u64) -> Cabinet {
        Cabinet::from_resource(self.resource.join(&format!("cabinets/{}/", id)))
    }

    pub fn document(&self, id: u64) -> Document {
        Document::from_resource(self.resource.join(&format!("documents/{}/", id)))
    }

    pub fn document_type(&self, id: u64) -> DocumentType {
        DocumentType::from_resource(self.resource.join(&format!("document_types/{}/", id)))
    }
}

representation! {
    /// A named grouping of documents.
    Cabinet
}

impl Cabinet {
    pub fn documents(&self) -> PagedCollection<Document> {
        PagedCollection::new(self.resource.join("documents/"))
    }

    /// Write-only endpoint that attaches a document to this cabinet.
    pub fn documents_add_endpoint(&self) -> Resource {
        self.resource.join("documents/add/")
    }

    pub async fn add_document(&self, document_id: u64) -> Result<WriteResponse> {
        self.documents_add_endpoint()
            .post(json!({ "document": document_id }))
            .await
    }
}
