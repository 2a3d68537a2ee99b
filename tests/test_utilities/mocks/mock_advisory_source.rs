use async_trait::async_trait;
use plugin_canary::prelude::*;
use plugin_canary::risk_assessment::services::CanonicalUrl;
use plugin_canary::shared::error::CanaryError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock AdvisoryPageSource serving HTML by canonical URL; unknown pages answer 503
#[derive(Clone, Default)]
pub struct MockAdvisoryPageSource {
    pub pages: HashMap<String, String>,
    pub calls: Arc<AtomicUsize>,
}

impl MockAdvisoryPageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdvisoryPageSource for MockAdvisoryPageSource {
    async fn fetch_page(&self, url: &CanonicalUrl) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages.get(url.as_str()).cloned().ok_or_else(|| {
            CanaryError::Transport {
                url: url.to_string(),
                status: Some(503),
                details: "Service Unavailable".to_string(),
            }
            .into()
        })
    }
}
