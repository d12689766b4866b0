use ghactivity_source_models::{Page, PageRequest, SourceError};

#[async_trait::async_trait]
pub trait ActivitySource: Send + Sync {
    /// Fetch exactly one page. Implementations must not retry or sleep.
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, SourceError>;

    fn source_name(&self) -> &str;
}

#[async_trait::async_trait]
impl<T: ActivitySource + ?Sized> ActivitySource for std::sync::Arc<T> {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, SourceError> {
        (**self).fetch_page(request).await
    }

    fn source_name(&self) -> &str {
        (**self).source_name()
    }
}
