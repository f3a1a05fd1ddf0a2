//! Paginated list traversal.

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde::Deserialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::marker::PhantomData;
use tracing::debug;

use crate::error::{MayanError, Result};
use crate::resource::Resource;

/// A typed view over a [`Resource`].
pub trait Representation: Sized + Send + 'static {
    /// Wrap a handle.
    fn from_resource(resource: Resource) -> Self;

    /// The underlying handle.
    fn resource(&self) -> &Resource;

    /// Build an element from one item of a list page.
    ///
    /// Items carry their own `url`, so the child is addressed by it and
    /// seeded with the item itself.
    fn from_item(page: &Resource, item: &Value) -> Result<Self> {
        page.follow_subresource(item, "url").map(Self::from_resource)
    }
}

/// One page of a list endpoint.
#[derive(Debug, Deserialize)]
struct Page {
    count: u64,
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    next: Option<String>,
}

impl Page {
    async fn fetch(pager: &Resource) -> Result<Self> {
        let value = pager.get().await?;
        Page::deserialize(value)
            .map_err(|e| MayanError::protocol(pager.path(), format!("not a list page: {}", e)))
    }
}

/// A list endpoint whose elements are materialized page by page.
///
/// Each call to [`enumerate`](PagedCollection::enumerate) starts again from
/// the first page; nothing is cached between enumerations.
pub struct PagedCollection<T> {
    list: Resource,
    _element: PhantomData<fn() -> T>,
}

impl<T> Clone for PagedCollection<T> {
    fn clone(&self) -> Self {
        Self {
            list: self.list.clone(),
            _element: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for PagedCollection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedCollection")
            .field("list", &self.list)
            .finish()
    }
}

struct Cursor<T> {
    pager: Option<Resource>,
    pending: VecDeque<T>,
}

impl<T: Representation> PagedCollection<T> {
    pub fn new(list: Resource) -> Self {
        Self {
            list,
            _element: PhantomData,
        }
    }

    /// The list endpoint itself (also the create endpoint for most lists).
    pub fn resource(&self) -> &Resource {
        &self.list
    }

    /// Lazily walk every page, following `next` links.
    ///
    /// A first page with `count == 0` ends the walk whatever it holds. A page
    /// claiming `count > 0` with no results is a protocol violation.
    pub fn enumerate(&self, parameters: &[(&str, &str)]) -> BoxStream<'static, Result<T>> {
        let cursor = Cursor {
            pager: Some(self.list.with_parameters(parameters)),
            pending: VecDeque::new(),
        };

        stream::try_unfold(cursor, |mut cursor| async move {
            loop {
                if let Some(element) = cursor.pending.pop_front() {
                    return Ok(Some((element, cursor)));
                }
                let Some(pager) = cursor.pager.take() else {
                    return Ok(None);
                };

                let page = Page::fetch(&pager).await?;
                debug!(
                    path = %pager.path(),
                    count = page.count,
                    results = page.results.len(),
                    "fetched page"
                );
                if page.count == 0 {
                    return Ok(None);
                }
                if page.results.is_empty() {
                    return Err(MayanError::protocol(
                        pager.path(),
                        format!("count is {} but results are empty", page.count),
                    ));
                }

                for item in &page.results {
                    cursor.pending.push_back(T::from_item(&pager, item)?);
                }
                cursor.pager = match page.next.as_deref() {
                    Some(link) => Some(pager.follow_related(link)?),
                    None => None,
                };
            }
        })
        .boxed()
    }

    /// Whether the first page reports no elements.
    pub async fn is_empty(&self) -> Result<bool> {
        let first = self.list.with_parameters(&[]);
        Ok(Page::fetch(&first).await?.count == 0)
    }

    /// Drain every page.
    pub async fn all(&self) -> Result<Vec<T>> {
        self.enumerate(&[]).try_collect().await
    }
}
