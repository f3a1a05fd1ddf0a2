use futures::TryStreamExt;
use serde_json::{json, Value};
use std::collections::HashMap;

use super::document_type::DocumentType;
use super::file::DocumentFile;
use super::version::DocumentVersion;
use super::{id_field, str_field};
use crate::error::{MayanError, Result};
use crate::paged::{PagedCollection, Representation};
use crate::resource::{Resource, WriteResponse};

representation! {
    /// A document stored in mayan-edms.
    Document
}

impl Document {
    pub async fn id(&self) -> Result<u64> {
        let value = self.resource.get().await?;
        id_field(&self.resource, value, "id")
    }

    pub async fn label(&self) -> Result<String> {
        let value = self.resource.get().await?;
        str_field(&self.resource, value, "label")
    }

    /// Metadata entries attached to this document.
    pub fn metadata_entries(&self) -> PagedCollection<MetadataEntry> {
        PagedCollection::new(self.resource.join("metadata/"))
    }

    pub fn metadata_entry(&self, id: u64) -> MetadataEntry {
        MetadataEntry::from_resource(self.resource.join(&format!("metadata/{}/", id)))
    }

    pub fn tags(&self) -> PagedCollection<Tag> {
        PagedCollection::new(self.resource.join("tags/"))
    }

    /// Write-only endpoint that attaches a tag.
    pub fn tags_attach_endpoint(&self) -> Resource {
        self.resource.join("tags/attach/")
    }

    /// Write-only endpoint that changes the document type.
    pub fn type_change_endpoint(&self) -> Resource {
        self.resource.join("type/change/")
    }

    /// Files, via the embedded `file_list_url` link.
    pub async fn files(&self) -> Result<PagedCollection<DocumentFile>> {
        let link = self.resource.field("file_list_url").await?;
        let link = link.as_str().ok_or_else(|| {
            MayanError::protocol(self.resource.path(), "file_list_url is not a link")
        })?;
        Ok(PagedCollection::new(self.resource.follow_related(link)?))
    }

    pub async fn first_file(&self) -> Result<Option<DocumentFile>> {
        self.files().await?.enumerate(&[]).try_next().await
    }

    /// Latest version, seeded from the embedded `latest_version` object.
    pub async fn latest_version(&self) -> Result<DocumentVersion> {
        let embedded = self.resource.field("latest_version").await?;
        let resource = self.resource.follow_subresource(embedded, "url")?;
        Ok(DocumentVersion::from_resource(resource))
    }

    /// Document type, seeded from the embedded `document_type` object.
    pub async fn document_type(&self) -> Result<DocumentType> {
        let embedded = self.resource.field("document_type").await?;
        let resource = self.resource.follow_subresource(embedded, "url")?;
        Ok(DocumentType::from_resource(resource))
    }

    /// Every attached metadata entry keyed by its metadata type name.
    ///
    /// Recomputed on every call.
    pub async fn metadata_type_name_to_entry_map(&self) -> Result<HashMap<String, MetadataEntry>> {
        let entries = self.metadata_entries().all().await?;
        let mut map = HashMap::with_capacity(entries.len());
        for entry in entries {
            map.insert(entry.type_name().await?, entry);
        }
        Ok(map)
    }

    pub async fn update_label(&self, label: &str) -> Result<WriteResponse> {
        self.resource.patch(json!({ "label": label })).await
    }

    pub async fn change_type(&self, document_type_id: u64) -> Result<WriteResponse> {
        self.type_change_endpoint()
            .post(json!({ "document_type_id": document_type_id }))
            .await
    }

    pub async fn attach_tag(&self, tag_id: u64) -> Result<WriteResponse> {
        self.tags_attach_endpoint()
            .post(json!({ "tag": tag_id }))
            .await
    }

    /// Create a metadata entry of type `metadata_type_id`.
    pub async fn add_metadata(&self, metadata_type_id: u64, value: &Value) -> Result<WriteResponse> {
        self.metadata_entries()
            .resource()
            .post(json!({ "metadata_type_id": metadata_type_id, "value": value }))
            .await
    }
}

representation! {
    /// One metadata type bound to one document, with a value.
    MetadataEntry
}

impl MetadataEntry {
    pub async fn id(&self) -> Result<u64> {
        let value = self.resource.get().await?;
        id_field(&self.resource, value, "id")
    }

    /// Display name of the entry's metadata type.
    pub async fn type_name(&self) -> Result<String> {
        let metadata_type = self.resource.field("metadata_type").await?;
        str_field(&self.resource, metadata_type, "name")
    }

    pub async fn value(&self) -> Result<Value> {
        Ok(self.resource.get().await?.get("value").cloned().unwrap_or(Value::Null))
    }

    pub async fn set_value(&self, value: &Value) -> Result<WriteResponse> {
        self.resource.patch(json!({ "value": value })).await
    }
}

representation! {
    Tag
}

impl Tag {
    pub async fn id(&self) -> Result<u64> {
        let value = self.resource.get().await?;
        id_field(&self.resource, value, "id")
    }

    pub async fn label(&self) -> Result<String> {
        let value = self.resource.get().await?;
        str_field(&self.resource, value, "label")
    }
}
