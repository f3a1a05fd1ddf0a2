use async_trait::async_trait;

use super::{content_of, join_page_text, PageText};
use crate::error::{MayanError, Result};
use crate::paged::PagedCollection;

representation! {
    /// One uploaded file of a document.
    DocumentFile
}

impl DocumentFile {
    /// Pages, via the embedded `page_list_url` link.
    pub async fn pages(&self) -> Result<PagedCollection<DocumentFilePage>> {
        let link = self.resource.field("page_list_url").await?;
        let link = link.as_str().ok_or_else(|| {
            MayanError::protocol(self.resource.path(), "page_list_url is not a link")
        })?;
        Ok(PagedCollection::new(self.resource.follow_related(link)?))
    }

    /// Text of all pages in page order, newline separated.
    pub async fn content(&self) -> Result<String> {
        join_page_text(&self.pages().await?).await
    }
}

representation! {
    DocumentFilePage
}

impl DocumentFilePage {
    /// Text extracted from this page.
    pub async fn text_content(&self) -> Result<String> {
        content_of(&self.resource.join("content/")).await
    }
}

#[async_trait]
impl PageText for DocumentFilePage {
    async fn page_text(&self) -> Result<String> {
        self.text_content().await
    }
}
