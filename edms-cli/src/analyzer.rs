//! HTTP client for the document analyzer

use anyhow::{bail, Context, Result};
use edms::Document;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Submits documents to the analyzer and returns its verdicts.
pub struct AnalyzerClient {
    url: Url,
    client: Client,
}

impl AnalyzerClient {
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url).with_context(|| format!("invalid analyzer URL {}", url))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { url, client })
    }

    /// POST `document` as JSON and return the parsed reply.
    pub async fn analyze(&self, document: &Document) -> Result<Value> {
        let response = self
            .client
            .post(self.url.clone())
            .json(document)
            .send()
            .await
            .with_context(|| format!("analyzer at {} unreachable", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("analyzer returned {}: {}", status.as_u16(), body);
        }
        response.json().await.context("analyzer reply is not JSON")
    }
}
