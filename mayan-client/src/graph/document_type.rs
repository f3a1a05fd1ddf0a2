use std::collections::HashMap;

use super::{id_field, str_field};
use crate::error::Result;
use crate::paged::PagedCollection;

representation! {
    /// A document type and the metadata schema attached to it.
    DocumentType
}

impl DocumentType {
    pub async fn id(&self) -> Result<u64> {
        let value = self.resource.get().await?;
        id_field(&self.resource, value, "id")
    }

    pub async fn label(&self) -> Result<String> {
        let value = self.resource.get().await?;
        str_field(&self.resource, value, "label")
    }

    /// Metadata types available to documents of this type.
    pub fn metadata_types(&self) -> PagedCollection<MetadataTypeDescriptor> {
        PagedCollection::new(self.resource.join("metadata_types/"))
    }

    /// Metadata type name → metadata type id. Recomputed on every call.
    pub async fn metadata_type_name_to_id_map(&self) -> Result<HashMap<String, u64>> {
        let descriptors = self.metadata_types().all().await?;
        let mut map = HashMap::with_capacity(descriptors.len());
        for descriptor in descriptors {
            map.insert(descriptor.name().await?, descriptor.metadata_type_id().await?);
        }
        Ok(map)
    }
}

representation! {
    /// Binding of one metadata type to a document type.
    MetadataTypeDescriptor
}

impl MetadataTypeDescriptor {
    pub async fn name(&self) -> Result<String> {
        let metadata_type = self.resource.field("metadata_type").await?;
        str_field(&self.resource, metadata_type, "name")
    }

    /// Id of the metadata type itself (not of this binding).
    pub async fn metadata_type_id(&self) -> Result<u64> {
        let metadata_type = self.resource.field("metadata_type").await?;
        id_field(&self.resource, metadata_type, "id")
    }

    pub async fn required(&self) -> Result<bool> {
        let value = self.resource.get().await?;
        Ok(value.get("required").and_then(|v| v.as_bool()).unwrap_or(false))
    }
}
