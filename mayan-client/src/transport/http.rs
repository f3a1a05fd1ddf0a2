//! reqwest-backed transport.

use async_trait::async_trait;
use base64::Engine;
use reqwest::{header, Client};
use std::sync::RwLock;
use tracing::{debug, trace};
use url::Url;

use super::{ApiRequest, ApiResponse, Method, Transport};
use crate::config::ConnectionConfig;
use crate::error::{MayanError, Result};

/// Transport speaking JSON over HTTP with Basic credentials.
///
/// The credential header is computed once here and attached to every
/// request as a default header.
pub struct HttpTransport {
    root: Url,
    client: RwLock<Option<Client>>,
}

impl HttpTransport {
    /// Build a transport for `config`.
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        let root = config.api_root()?;

        let userpass = format!("{}:{}", config.user, config.password);
        let credentials = base64::engine::general_purpose::STANDARD.encode(userpass);
        let mut authorization = header::HeaderValue::from_str(&format!("Basic {}", credentials))
            .map_err(|e| MayanError::Config(format!("invalid credentials: {}", e)))?;
        authorization.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, authorization);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| MayanError::Config(format!("failed to build HTTP client: {}", e)))?;

        debug!(root = %root, user = %config.user, "HTTP transport ready");

        Ok(Self {
            root,
            client: RwLock::new(Some(client)),
        })
    }

    fn client(&self) -> Result<Client> {
        let guard = self
            .client
            .read()
            .map_err(|_| MayanError::Transport("transport lock poisoned".to_string()))?;
        guard
            .clone()
            .ok_or_else(|| MayanError::Transport("session already closed".to_string()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn root(&self) -> &Url {
        &self.root
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let client = self.client()?;
        let url = self
            .root
            .join(&request.path)
            .map_err(|e| MayanError::Transport(format!("bad path {}: {}", request.path, e)))?;

        trace!(method = %request.method, %url, "sending request");

        let builder = match request.method {
            Method::Get => client.get(url),
            Method::Post => client.post(url),
            Method::Patch => client.patch(url),
        };
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(ApiResponse { status, body })
    }

    fn release(&self, response: &ApiResponse) {
        // The body was drained in `send`, so the connection is already back in the pool.
        trace!(status = response.status, "write response released");
    }

    fn shutdown(&self) {
        let client = match self.client.write() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if client.is_some() {
            debug!(root = %self.root, "HTTP transport shut down");
        }
    }
}
