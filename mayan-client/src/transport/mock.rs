//! Mock transport for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use url::Url;

use super::{ApiRequest, ApiResponse, Method, Transport};
use crate::error::{MayanError, Result};

/// Default root used by [`MockTransport::new`].
pub const MOCK_ROOT: &str = "http://mayan.test/api/";

/// Mock transport for testing.
///
/// Responses are scripted per `(method, path)`. When several responses are
/// queued for a route they are served in order and the last one repeats.
/// Unscripted routes answer 404. Every request is recorded.
pub struct MockTransport {
    root: Url,
    routes: Mutex<HashMap<(Method, String), VecDeque<ApiResponse>>>,
    requests: Mutex<Vec<ApiRequest>>,
    unreachable: AtomicUsize,
    released: AtomicUsize,
    shutdowns: AtomicUsize,
}

impl MockTransport {
    /// Create a mock rooted at [`MOCK_ROOT`].
    pub fn new() -> Self {
        Self::with_root(Url::parse(MOCK_ROOT).expect("static mock root parses"))
    }

    pub fn with_root(root: Url) -> Self {
        Self {
            root,
            routes: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            unreachable: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
            shutdowns: AtomicUsize::new(0),
        }
    }

    /// Queue a response for `method path`.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: impl Into<String>) {
        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(ApiResponse::new(status, body));
    }

    /// Queue a 200 JSON response for `GET path`.
    pub fn on_get(&self, path: &str, body: Value) {
        self.respond(Method::Get, path, 200, body.to_string());
    }

    /// Queue a successful write response.
    pub fn on_write(&self, method: Method, path: &str) {
        self.respond(method, path, 200, "{}");
    }

    /// Make the next `count` requests fail at the connection level.
    pub fn fail_next(&self, count: usize) {
        self.unreachable.store(count, Ordering::SeqCst);
    }

    /// All requests seen so far.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Requests other than GET, in issue order.
    pub fn writes(&self) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method != Method::Get)
            .collect()
    }

    /// Number of GETs issued against `path`.
    pub fn get_count(&self, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == Method::Get && r.path == path)
            .count()
    }

    /// Number of write responses released.
    pub fn released_count(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Number of times the session tore this transport down.
    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn root(&self) -> &Url {
        &self.root
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let pending = self.unreachable.load(Ordering::SeqCst);
        if pending > 0 {
            self.unreachable.store(pending - 1, Ordering::SeqCst);
            return Err(MayanError::Transport("connection refused".to_string()));
        }

        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        let response = match routes.get_mut(&(request.method, request.path.clone())) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        Ok(response.unwrap_or_else(|| {
            ApiResponse::new(404, format!("{{\"detail\":\"Not found: {}\"}}", request.path))
        }))
    }

    fn release(&self, _response: &ApiResponse) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }

    fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}
