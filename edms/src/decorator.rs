//! MayanDecorator - reconciles desired metadata into mayan-edms.
//!
//! One call opens one session, reads the document's current metadata once,
//! then issues writes strictly in sequence and stops at the first failure.
//! Nothing is rolled back.

use mayan_client::{
    Client, ClientSession, ConnectionConfig, Connector, Document as RemoteDocument, MetadataEntry,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::directive::{Directive, DirectiveKind, SyncPlan};
use crate::document::{Document, MetadataMap};
use crate::error::{DecorateError, Result};

/// What a successful call applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub document_id: u64,
    /// Keys written by updating an existing entry
    pub updated: Vec<String>,
    /// Keys written by creating a new entry
    pub created: Vec<String>,
    /// Directives applied
    pub directives: Vec<DirectiveKind>,
}

/// Knows how to "decorate" a document in mayan-edms.
pub struct MayanDecorator<C = ConnectionConfig> {
    connector: C,
}

impl<C: Connector> MayanDecorator<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Apply `document.metadata` to the backend document `document.id`.
    pub async fn decorate(&self, document: &Document) -> Result<SyncReport> {
        self.synchronize(document.id, document.document_type, &document.metadata)
            .await
    }

    /// Reconcile `desired` into the backend document `document_id`.
    ///
    /// Ordinary keys are written in the iteration order of `desired`, then
    /// the reserved directives run: label, type change, tags, cabinets.
    pub async fn synchronize(
        &self,
        document_id: u64,
        document_type: Option<u64>,
        desired: &MetadataMap,
    ) -> Result<SyncReport> {
        let plan = SyncPlan::from_metadata(desired)?;
        debug!(
            document_id,
            ?document_type,
            ordinary = plan.ordinary.len(),
            directives = plan.directives.len(),
            "synchronizing document"
        );

        ClientSession::run(&self.connector, |client| async move {
            apply(&client, document_id, document_type, &plan).await
        })
        .await
    }
}

/// Current remote metadata state, read once per call.
struct MetadataState {
    entries: HashMap<String, MetadataEntry>,
    type_ids: HashMap<String, u64>,
}

impl MetadataState {
    async fn load(document: &RemoteDocument, expected_type: Option<u64>) -> Result<Self> {
        let entries = document.metadata_type_name_to_entry_map().await?;
        let doctype = document.document_type().await?;
        if let Some(expected) = expected_type {
            let remote = doctype.id().await?;
            if remote != expected {
                warn!(expected, remote, "document type differs from the submitted one");
            }
        }
        let type_ids = doctype.metadata_type_name_to_id_map().await?;
        Ok(Self { entries, type_ids })
    }
}

async fn apply(
    client: &Client,
    document_id: u64,
    document_type: Option<u64>,
    plan: &SyncPlan,
) -> Result<SyncReport> {
    let document = client.document(document_id);
    let mut report = SyncReport {
        document_id,
        ..Default::default()
    };

    if !plan.ordinary.is_empty() {
        let state = MetadataState::load(&document, document_type).await?;
        for (name, value) in &plan.ordinary {
            write_metadata(&document, document_id, &state, name, value, &mut report).await?;
        }
    }

    for directive in &plan.directives {
        write_directive(client, &document, document_id, directive).await?;
        report.directives.push(directive.kind());
    }

    info!(
        document_id,
        updated = report.updated.len(),
        created = report.created.len(),
        directives = report.directives.len(),
        "document synchronized"
    );
    Ok(report)
}

async fn write_metadata(
    document: &RemoteDocument,
    document_id: u64,
    state: &MetadataState,
    name: &str,
    value: &Value,
    report: &mut SyncReport,
) -> Result<()> {
    info!(document_id, key = name, %value, "writing document metadata");

    if let Some(entry) = state.entries.get(name) {
        entry.set_value(value).await?.into_result()?;
        report.updated.push(name.to_string());
    } else if let Some(&metadata_type_id) = state.type_ids.get(name) {
        document
            .add_metadata(metadata_type_id, value)
            .await?
            .into_result()?;
        report.created.push(name.to_string());
    } else {
        return Err(DecorateError::UnknownMetadataKey(name.to_string()));
    }
    Ok(())
}

async fn write_directive(
    client: &Client,
    document: &RemoteDocument,
    document_id: u64,
    directive: &Directive,
) -> Result<()> {
    match directive {
        Directive::Filename(label) => {
            info!(document_id, %label, "writing document label");
            document.update_label(label).await?.into_result()?;
        }
        Directive::DocType(document_type_id) => {
            info!(document_id, document_type_id, "writing document type");
            document.change_type(*document_type_id).await?.into_result()?;
        }
        Directive::Tags(tag_ids) => {
            for &tag_id in tag_ids {
                info!(document_id, tag_id, "attaching tag");
                document.attach_tag(tag_id).await?.into_result()?;
            }
        }
        Directive::Cabinets(cabinet_ids) => {
            for &cabinet_id in cabinet_ids {
                info!(document_id, cabinet_id, "adding document to cabinet");
                client
                    .cabinet(cabinet_id)
                    .add_document(document_id)
                    .await?
                    .into_result()?;
            }
        }
    }
    Ok(())
}
