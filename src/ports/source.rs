use crate::domain::ResolutionResult;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch and normalise metadata for an already-canonical URL.
    async fn fetch_metadata(&self, canonical_url: &str) -> ResolutionResult;

    /// Short label used in logs.
    fn name(&self) -> &'static str;
}
