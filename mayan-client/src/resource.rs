//! Lazy, immutable references to remote resources.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};
use url::form_urlencoded;
use url::Url;

use crate::error::{MayanError, Result};
use crate::transport::{ApiRequest, ApiResponse, Method, Transport};

/// A typed handle to one remote resource.
///
/// The handle knows where the resource lives (a path relative to the
/// transport root) and, at most once, what it looks like. Attributes are
/// either fetched on first [`get`](Resource::get) or seeded from a parent
/// that embedded them. Navigating always yields a new handle.
#[derive(Clone)]
pub struct Resource {
    transport: Arc<dyn Transport>,
    path: String,
    attributes: OnceCell<Value>,
}

impl Resource {
    /// Handle at the transport root.
    pub fn root(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            path: String::new(),
            attributes: OnceCell::new(),
        }
    }

    fn at(&self, path: String) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            path,
            attributes: OnceCell::new(),
        }
    }

    /// Path relative to the API root, query included.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Attributes if they are already known, without touching the network.
    pub fn cached(&self) -> Option<&Value> {
        self.attributes.get()
    }

    /// Fetch (once) and return the attribute snapshot.
    pub async fn get(&self) -> Result<&Value> {
        self.attributes
            .get_or_try_init(|| async {
                debug!(path = %self.path, "fetching resource");
                let response = self.transport.send(ApiRequest::get(self.path.clone())).await?;
                if !response.is_success() {
                    return Err(MayanError::RemoteWrite {
                        status: response.status,
                        body: response.body,
                    });
                }
                serde_json::from_str(&response.body)
                    .map_err(|e| MayanError::protocol(&self.path, format!("invalid JSON: {}", e)))
            })
            .await
    }

    /// Read one attribute, fetching if needed.
    pub async fn field(&self, key: &str) -> Result<&Value> {
        let value = self.get().await?;
        value
            .get(key)
            .ok_or_else(|| MayanError::protocol(&self.path, format!("missing field `{}`", key)))
    }

    /// `PATCH` this resource with `fields`.
    pub async fn patch(&self, fields: Value) -> Result<WriteResponse> {
        self.write(Method::Patch, fields).await
    }

    /// `POST` `fields` to this resource.
    pub async fn post(&self, fields: Value) -> Result<WriteResponse> {
        self.write(Method::Post, fields).await
    }

    async fn write(&self, method: Method, fields: Value) -> Result<WriteResponse> {
        let request = ApiRequest::write(method, self.path.clone(), fields);
        let response = self.transport.send(request).await?;
        Ok(WriteResponse {
            method,
            path: self.path.clone(),
            response,
            transport: Some(Arc::clone(&self.transport)),
        })
    }

    /// Handle at `relative`, resolved against this resource's path.
    pub fn join(&self, relative: &str) -> Self {
        let base = match self.path.find('?') {
            Some(idx) => &self.path[..idx],
            None => self.path.as_str(),
        };
        let dir = match base.rfind('/') {
            Some(idx) => &base[..=idx],
            None => "",
        };
        self.at(format!("{}{}", dir, relative))
    }

    /// Same resource with query parameters appended and no cached attributes.
    pub fn with_parameters(&self, parameters: &[(&str, &str)]) -> Self {
        if parameters.is_empty() {
            return self.at(self.path.clone());
        }
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in parameters {
            serializer.append_pair(key, value);
        }
        let separator = if self.path.contains('?') { '&' } else { '?' };
        self.at(format!("{}{}{}", self.path, separator, serializer.finish()))
    }

    /// Handle for a server-supplied link, with no attributes.
    ///
    /// Absolute links are rewritten relative to the API root.
    pub fn follow_related(&self, link: &str) -> Result<Self> {
        Ok(self.at(self.relativize(link)?))
    }

    /// Handle for a child the parent already embedded.
    ///
    /// The path comes from `embedded[link_key]`; the attributes are seeded
    /// from `embedded` so reading them costs no request.
    pub fn follow_subresource(&self, embedded: &Value, link_key: &str) -> Result<Self> {
        let link = embedded
            .get(link_key)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                MayanError::protocol(&self.path, format!("embedded resource lacks `{}`", link_key))
            })?;
        let child = self.follow_related(link)?;
        // Fresh cell, cannot already be set.
        let _ = child.attributes.set(embedded.clone());
        Ok(child)
    }

    fn relativize(&self, link: &str) -> Result<String> {
        let root = self.transport.root();
        let absolute = match Url::parse(link) {
            Ok(url) => url,
            // Relative links resolve against the resource that supplied them.
            Err(url::ParseError::RelativeUrlWithoutBase) => root
                .join(&self.path)
                .and_then(|base| base.join(link))
                .map_err(|e| MayanError::protocol(&self.path, format!("bad link {}: {}", link, e)))?,
            Err(e) => {
                return Err(MayanError::protocol(
                    &self.path,
                    format!("bad link {}: {}", link, e),
                ))
            }
        };

        if absolute.origin() != root.origin() {
            // Proxies commonly rewrite the host; only the path is trusted.
            warn!(link, root = %root, "link origin differs from API root");
        }

        let relative = absolute
            .path()
            .strip_prefix(root.path())
            .ok_or_else(|| {
                MayanError::protocol(&self.path, format!("link outside API root: {}", link))
            })?;

        Ok(match absolute.query() {
            Some(query) => format!("{}?{}", relative, query),
            None => relative.to_string(),
        })
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("path", &self.path)
            .field("cached", &self.attributes.initialized())
            .finish()
    }
}

/// Outcome of a write.
///
/// Must be released once; [`release`](WriteResponse::release) and
/// [`into_result`](WriteResponse::into_result) do so explicitly, dropping
/// does so implicitly. Never more than once.
pub struct WriteResponse {
    method: Method,
    path: String,
    response: ApiResponse,
    transport: Option<Arc<dyn Transport>>,
}

impl WriteResponse {
    pub fn is_success(&self) -> bool {
        self.response.is_success()
    }

    pub fn status(&self) -> u16 {
        self.response.status
    }

    pub fn body(&self) -> &str {
        &self.response.body
    }

    /// Release the response.
    pub fn release(mut self) {
        self.release_once();
    }

    /// Release the response and turn a failure status into an error.
    pub fn into_result(mut self) -> Result<()> {
        self.release_once();
        if self.response.is_success() {
            return Ok(());
        }
        warn!(
            method = %self.method,
            path = %self.path,
            status = self.response.status,
            "remote write rejected"
        );
        Err(MayanError::RemoteWrite {
            status: self.response.status,
            body: std::mem::take(&mut self.response.body),
        })
    }

    fn release_once(&mut self) {
        if let Some(transport) = self.transport.take() {
            transport.release(&self.response);
        }
    }
}

impl Drop for WriteResponse {
    fn drop(&mut self) {
        self.release_once();
    }
}

impl fmt::Debug for WriteResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteResponse")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("status", &self.response.status)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use serde_json::json;

    fn setup() -> (Arc<MockTransport>, Resource) {
        let mock = Arc::new(MockTransport::new());
        let root = Resource::root(mock.clone());
        (mock, root)
    }

    #[tokio::test]
    async fn test_get_fetches_once() {
        let (mock, root) = setup();
        mock.on_get("documents/7/", json!({"id": 7, "label": "invoice.pdf"}));

        let doc = root.join("documents/7/");
        assert!(doc.cached().is_none());
        assert_eq!(doc.get().await.unwrap()["id"], 7);
        assert_eq!(doc.field("label").await.unwrap(), "invoice.pdf");
        assert_eq!(mock.get_count("documents/7/"), 1);
    }

    #[tokio::test]
    async fn test_get_error_status() {
        let (mock, root) = setup();
        mock.respond(Method::Get, "documents/7/", 403, "forbidden");

        let err = root.join("documents/7/").get().await.unwrap_err();
        assert!(matches!(err, MayanError::RemoteWrite { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_get_invalid_json_is_transport_failure() {
        let (mock, root) = setup();
        mock.respond(Method::Get, "documents/7/", 200, "<html>");

        let err = root.join("documents/7/").get().await.unwrap_err();
        assert!(matches!(err, MayanError::Transport(_)));
    }

    #[test]
    fn test_join_is_relative_to_directory() {
        let (_mock, root) = setup();
        let doc = root.join("documents/7/");
        assert_eq!(doc.join("metadata/").path(), "documents/7/metadata/");
        assert_eq!(
            doc.join("metadata/").join("3/").path(),
            "documents/7/metadata/3/"
        );
        let paged = doc.join("tags/").with_parameters(&[("page", "2")]);
        assert_eq!(paged.join("attach/").path(), "documents/7/tags/attach/");
    }

    #[test]
    fn test_with_parameters_encodes_query() {
        let (_mock, root) = setup();
        let list = root.join("documents/").with_parameters(&[("label", "a b"), ("page", "1")]);
        assert_eq!(list.path(), "documents/?label=a+b&page=1");
        let more = list.with_parameters(&[("ordering", "id")]);
        assert_eq!(more.path(), "documents/?label=a+b&page=1&ordering=id");
    }

    #[test]
    fn test_follow_related_rewrites_absolute_links() {
        let (_mock, root) = setup();
        let next = root
            .follow_related("http://mayan.test/api/documents/7/metadata/?page=2")
            .unwrap();
        assert_eq!(next.path(), "documents/7/metadata/?page=2");

        let absolute_path = root.follow_related("/api/cabinets/3/").unwrap();
        assert_eq!(absolute_path.path(), "cabinets/3/");
    }

    #[test]
    fn test_follow_related_resolves_relative_links_against_source() {
        let (_mock, root) = setup();
        let tags = root.join("documents/1/tags/");

        assert_eq!(tags.follow_related("?page=2").unwrap().path(), "documents/1/tags/?page=2");
        assert_eq!(tags.follow_related("attach/").unwrap().path(), "documents/1/tags/attach/");
        assert_eq!(tags.follow_related("../metadata/").unwrap().path(), "documents/1/metadata/");
    }

    #[test]
    fn test_follow_related_rejects_links_outside_root() {
        let (_mock, root) = setup();
        let err = root.follow_related("http://mayan.test/admin/").unwrap_err();
        assert!(matches!(err, MayanError::Transport(_)));
    }

    #[tokio::test]
    async fn test_follow_subresource_seeds_attributes() {
        let (mock, root) = setup();
        let embedded = json!({"id": 2, "label": "Invoice", "url": "http://mayan.test/api/document_types/2/"});

        let doctype = root.follow_subresource(&embedded, "url").unwrap();
        assert_eq!(doctype.path(), "document_types/2/");
        assert_eq!(doctype.get().await.unwrap()["label"], "Invoice");
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_follow_subresource_requires_link() {
        let (_mock, root) = setup();
        let err = root.follow_subresource(&json!({"id": 2}), "url").unwrap_err();
        assert!(matches!(err, MayanError::Transport(_)));
    }

    #[tokio::test]
    async fn test_write_response_released_exactly_once() {
        let (mock, root) = setup();
        mock.on_write(Method::Patch, "documents/7/");
        mock.respond(Method::Post, "documents/7/tags/attach/", 400, "bad tag");

        let doc = root.join("documents/7/");
        doc.patch(json!({"label": "x"})).await.unwrap().into_result().unwrap();
        assert_eq!(mock.released_count(), 1);

        let err = doc
            .join("tags/attach/")
            .post(json!({"tag": 1}))
            .await
            .unwrap()
            .into_result()
            .unwrap_err();
        assert!(matches!(err, MayanError::RemoteWrite { status: 400, ref body } if body == "bad tag"));
        assert_eq!(mock.released_count(), 2);

        let response = doc.patch(json!({"label": "y"})).await.unwrap();
        drop(response);
        assert_eq!(mock.released_count(), 3);
    }
}
