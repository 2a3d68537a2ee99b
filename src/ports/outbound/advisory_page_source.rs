use crate::risk_assessment::services::CanonicalUrl;
use crate::shared::Result;
use async_trait::async_trait;

/// AdvisoryPageSource port for fetching security advisory HTML
///
/// Only canonicalized URLs can be requested, so implementations never see
/// raw upstream strings.
#[async_trait]
pub trait AdvisoryPageSource: Send + Sync {
    async fn fetch_page(&self, url: &CanonicalUrl) -> Result<String>;
}
