use async_trait::async_trait;

use super::{content_of, join_page_text, PageText};
use crate::error::{MayanError, Result};
use crate::paged::PagedCollection;

representation! {
    /// A version of a document, with OCR'd pages.
    DocumentVersion
}

impl DocumentVersion {
    /// Pages, via the embedded `pages_url` link.
    pub async fn pages(&self) -> Result<PagedCollection<DocumentPage>> {
        let link = self.resource.field("pages_url").await?;
        let link = link.as_str().ok_or_else(|| {
            MayanError::protocol(self.resource.path(), "pages_url is not a link")
        })?;
        Ok(PagedCollection::new(self.resource.follow_related(link)?))
    }

    /// OCR text of all pages in page order, newline separated.
    pub async fn ocr_content(&self) -> Result<String> {
        join_page_text(&self.pages().await?).await
    }
}

representation! {
    DocumentPage
}

impl DocumentPage {
    pub async fn ocr_content(&self) -> Result<String> {
        content_of(&self.resource.join("ocr/")).await
    }
}

#[async_trait]
impl PageText for DocumentPage {
    async fn page_text(&self) -> Result<String> {
        self.ocr_content().await
    }
}
