//! Transport abstraction.
//!
//! Resources never talk to the network directly. Every request goes through
//! a [`Transport`] owned by the session:
//! - [`HttpTransport`]: reqwest against a live mayan-edms instance
//! - [`MockTransport`]: scripted responses for tests and dry runs

pub mod http;
pub mod mock;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use url::Url;

use crate::error::Result;

pub use http::HttpTransport;
pub use mock::MockTransport;

/// HTTP verbs the client issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request addressed relative to the transport root.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API root, query string included
    pub path: String,
    /// JSON body for writes
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn write(method: Method, path: impl Into<String>, body: Value) -> Self {
        Self {
            method,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// Raw response: status plus the fully read body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Carries requests from resources to the backend.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Absolute URL all resource paths are relative to.
    fn root(&self) -> &Url;

    /// Issue one request and read its body.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;

    /// Give back whatever a write response still holds.
    ///
    /// Called exactly once per [`WriteResponse`](crate::WriteResponse).
    fn release(&self, _response: &ApiResponse) {}

    /// Tear down connections. Sends after shutdown fail.
    fn shutdown(&self);
}
