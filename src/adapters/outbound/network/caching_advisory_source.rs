use crate::ports::outbound::AdvisoryPageSource;
use crate::risk_assessment::services::CanonicalUrl;
use crate::shared::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// CachingAdvisoryPageSource wraps an AdvisoryPageSource and adds in-memory caching.
///
/// Many plugins link the same multi-plugin advisory page, so one enrichment
/// run would otherwise download it once per plugin. Only successful fetches
/// are cached; failures are retried on the next request.
pub struct CachingAdvisoryPageSource<S: AdvisoryPageSource> {
    inner: S,
    cache: Arc<DashMap<CanonicalUrl, String>>,
}

impl<S: AdvisoryPageSource> CachingAdvisoryPageSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Returns the current cache size (for testing/monitoring)
    #[cfg(test)]
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait]
impl<S: AdvisoryPageSource> AdvisoryPageSource for CachingAdvisoryPageSource<S> {
    async fn fetch_page(&self, url: &CanonicalUrl) -> Result<String> {
        let key = url.without_fragment();

        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached.clone());
        }

        let page = self.inner.fetch_page(url).await?;
        self.cache.insert(key, page.clone());

        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk_assessment::services::canonicalize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock source that tracks call counts and fails on demand
    struct MockAdvisoryPageSource {
        call_count: AtomicUsize,
        fail: bool,
    }

    impl MockAdvisoryPageSource {
        fn new(fail: bool) -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                fail,
            }
        }

        fn get_call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AdvisoryPageSource for MockAdvisoryPageSource {
        async fn fetch_page(&self, url: &CanonicalUrl) -> Result<String> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("connection reset");
            }
            Ok(format!("<title>{}</title>", url.as_str()))
        }
    }

    fn url(raw: &str) -> CanonicalUrl {
        canonicalize(raw).unwrap()
    }

    #[tokio::test]
    async fn test_caching_source_returns_cached_page() {
        let source = CachingAdvisoryPageSource::new(MockAdvisoryPageSource::new(false));
        let advisory = url("https://www.jenkins.io/security/advisory/2016-07-27/");

        let first = source.fetch_page(&advisory).await.unwrap();
        let second = source.fetch_page(&advisory).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.inner.get_call_count(), 1);
        assert_eq!(source.cache_size(), 1);
    }

    #[tokio::test]
    async fn test_fragments_share_one_cache_entry() {
        let source = CachingAdvisoryPageSource::new(MockAdvisoryPageSource::new(false));

        source
            .fetch_page(&url(
                "https://www.jenkins.io/security/advisory/2016-07-27/#SECURITY-309",
            ))
            .await
            .unwrap();
        source
            .fetch_page(&url(
                "https://www.jenkins.io/security/advisory/2016-07-27/#SECURITY-310",
            ))
            .await
            .unwrap();

        assert_eq!(source.inner.get_call_count(), 1);
        assert_eq!(source.cache_size(), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let source = CachingAdvisoryPageSource::new(MockAdvisoryPageSource::new(true));
        let advisory = url("https://www.jenkins.io/security/advisory/2020-01-01/");

        assert!(source.fetch_page(&advisory).await.is_err());
        assert!(source.fetch_page(&advisory).await.is_err());

        assert_eq!(source.inner.get_call_count(), 2);
        assert_eq!(source.cache_size(), 0);
    }
}
