use crate::shared::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Which registry page to fetch next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    Offset { offset: usize, limit: usize },
    /// Absolute link supplied by the previous page
    Next(String),
}

/// RegistrySource port for listing the plugin universe
///
/// Returns one page of the listing as raw JSON; shape handling and
/// deduplication happen in the application layer.
#[async_trait]
pub trait RegistrySource: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Value>;
}
