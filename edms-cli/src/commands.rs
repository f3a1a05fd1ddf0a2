//! Subcommand implementations
//!
//! Each returns its result instead of printing it, so the backend can be
//! swapped for a scripted one.

use anyhow::{Context, Result};
use edms::{Document, MayanDecorator, MetadataMap, SyncReport};
use mayan_client::{ClientSession, Connector};
use serde_json::Value;
use tracing::info;

use crate::analyzer::AnalyzerClient;
use crate::config::TextSource;

pub async fn decorate<C: Connector>(
    connector: C,
    document_id: u64,
    document_type: Option<u64>,
    metadata: &MetadataMap,
) -> Result<SyncReport> {
    MayanDecorator::new(connector)
        .synchronize(document_id, document_type, metadata)
        .await
        .with_context(|| format!("failed to decorate document #{}", document_id))
}

/// Fetch each document's OCR text and resubmit it to the analyzer.
///
/// All documents are read over one session.
pub async fn reanalyze<C: Connector>(
    connector: &C,
    analyzer: &AnalyzerClient,
    ids: &[u64],
) -> Result<Vec<Value>> {
    ClientSession::run(connector, |client| async move {
        let mut replies = Vec::with_capacity(ids.len());
        for &id in ids {
            info!(document_id = id, "retrieving document");
            let document = client.document(id);
            let document_type = document.document_type().await?.id().await?;
            let text = document.latest_version().await?.ocr_content().await?;

            info!(document_id = id, document_type, "reanalyzing document");
            let reply = analyzer
                .analyze(&Document::new(id, text).with_type(document_type))
                .await?;
            replies.push(reply);
        }
        Ok::<_, anyhow::Error>(replies)
    })
    .await
}

pub async fn text<C: Connector>(connector: &C, id: u64, source: TextSource) -> Result<String> {
    ClientSession::run(connector, |client| async move {
        let document = client.document(id);
        let text = match source {
            TextSource::Ocr => document.latest_version().await?.ocr_content().await?,
            TextSource::File => match document.first_file().await? {
                Some(file) => file.content().await?,
                None => String::new(),
            },
        };
        Ok::<_, anyhow::Error>(text)
    })
    .await
}
