use crate::application::pacing::RequestPacer;
use crate::ports::outbound::{PageRequest, RegistrySource};
use crate::risk_assessment::domain::{CollectionMode, IntegrityWarning, PluginId, RegistryEntry};
use crate::risk_assessment::services::registry_spine::{
    entry_from_item, DEFAULT_PAGE_SIZE, MAX_REGISTRY_PAGES,
};
use crate::risk_assessment::services::{RegistryPage, RegistrySpine};
use crate::shared::Result;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Offline pilot set: (id, title)
const CURATED_PLUGINS: &[(&str, &str)] = &[
    ("cucumber-reports", "Cucumber reports"),
    ("sample-plugin", "Sample Plugin"),
    ("workflow-cps", "Pipeline: Groovy"),
];

/// Paging knobs for a real registry fetch
#[derive(Debug, Clone, Copy)]
pub struct RegistryFetchOptions {
    pub page_size: usize,
    pub max_plugins: Option<usize>,
}

impl Default for RegistryFetchOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_plugins: None,
        }
    }
}

/// Everything one registry fetch produced
#[derive(Debug, Default)]
pub struct RegistryFetch {
    pub entries: Vec<RegistryEntry>,
    pub integrity_warnings: Vec<IntegrityWarning>,
    /// Upstream pages exactly as received (empty in curated mode)
    pub raw_pages: Vec<Value>,
    pub invalid_items: usize,
}

/// RegistryCollector builds the deduplicated plugin universe.
///
/// Deduplication happens before anything is emitted, whatever upstream
/// pagination does.
pub struct RegistryCollector<S> {
    source: S,
}

impl<S: RegistrySource> RegistryCollector<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub async fn fetch(
        &self,
        mode: CollectionMode,
        options: RegistryFetchOptions,
        pacer: &RequestPacer,
    ) -> Result<RegistryFetch> {
        self.fetch_with(mode, options, pacer, |_| Ok(())).await
    }

    /// Like [`fetch`](Self::fetch), handing every newly admitted entry to
    /// `on_entry` as soon as its page is processed.
    pub async fn fetch_with<F>(
        &self,
        mode: CollectionMode,
        options: RegistryFetchOptions,
        pacer: &RequestPacer,
        mut on_entry: F,
    ) -> Result<RegistryFetch>
    where
        F: FnMut(&RegistryEntry) -> Result<()>,
    {
        let collected_at = Utc::now();
        match mode {
            CollectionMode::Curated => Self::curated(collected_at, &mut on_entry),
            CollectionMode::Real => {
                self.paginate(options, pacer, collected_at, &mut on_entry)
                    .await
            }
        }
    }

    fn curated<F>(collected_at: DateTime<Utc>, on_entry: &mut F) -> Result<RegistryFetch>
    where
        F: FnMut(&RegistryEntry) -> Result<()>,
    {
        let mut fetch = RegistryFetch::default();
        for (id, title) in CURATED_PLUGINS {
            let entry = RegistryEntry::new(PluginId::new(*id)?, collected_at).with_title(*title);
            on_entry(&entry)?;
            fetch.entries.push(entry);
        }
        Ok(fetch)
    }

    async fn paginate<F>(
        &self,
        options: RegistryFetchOptions,
        pacer: &RequestPacer,
        collected_at: DateTime<Utc>,
        on_entry: &mut F,
    ) -> Result<RegistryFetch>
    where
        F: FnMut(&RegistryEntry) -> Result<()>,
    {
        let mut spine = RegistrySpine::new();
        let mut raw_pages = Vec::new();
        let mut invalid_items = 0;
        let mut offset = 0;
        let mut request = PageRequest::Offset {
            offset,
            limit: options.page_size,
        };

        'pages: for page_number in 1..=MAX_REGISTRY_PAGES {
            pacer.wait().await;
            let payload = self.source.fetch_page(&request).await?;
            let page = RegistryPage::from_payload(&payload, &describe(&request))?;
            raw_pages.push(payload);
            debug!(page = page_number, items = page.items.len(), "registry page received");

            for item in &page.items {
                let entry = match entry_from_item(item, collected_at) {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(error = %e, "skipping registry item without a valid plugin id");
                        invalid_items += 1;
                        continue;
                    }
                };
                let id = entry.plugin_id.clone();
                if spine.admit(entry) {
                    if let Some(admitted) = spine.entries().last() {
                        on_entry(admitted)?;
                    }
                } else {
                    debug!(plugin_id = %id, "duplicate registry entry dropped");
                }
                if options.max_plugins.is_some_and(|max| spine.len() >= max) {
                    info!(collected = spine.len(), "registry cap reached");
                    break 'pages;
                }
            }

            if let Some(next) = &page.next {
                request = PageRequest::Next(next.clone());
                continue;
            }
            if page.is_last(offset, options.page_size) {
                break;
            }
            offset += page.items.len();
            request = PageRequest::Offset {
                offset,
                limit: options.page_size,
            };

            if page_number == MAX_REGISTRY_PAGES {
                warn!(
                    pages = MAX_REGISTRY_PAGES,
                    "registry pagination stopped at the page ceiling"
                );
            }
        }

        let (entries, integrity_warnings) = spine.into_parts();
        for warning in &integrity_warnings {
            warn!("{}", warning);
        }
        Ok(RegistryFetch {
            entries,
            integrity_warnings,
            raw_pages,
            invalid_items,
        })
    }
}

fn describe(request: &PageRequest) -> String {
    match request {
        PageRequest::Offset { offset, limit } => {
            format!("registry page (offset {}, limit {})", offset, limit)
        }
        PageRequest::Next(link) => link.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Serves canned pages in order and records every request
    struct ScriptedRegistrySource {
        pages: Vec<Value>,
        requests: Mutex<Vec<PageRequest>>,
    }

    impl ScriptedRegistrySource {
        fn new(pages: Vec<Value>) -> Self {
            Self {
                pages,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<PageRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RegistrySource for ScriptedRegistrySource {
        async fn fetch_page(&self, request: &PageRequest) -> Result<Value> {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            // Past the script: keep answering with an empty page
            Ok(self
                .pages
                .get(requests.len() - 1)
                .cloned()
                .unwrap_or_else(|| json!([])))
        }
    }

    fn plugins(names: &[&str]) -> Vec<Value> {
        names.iter().map(|n| json!({"name": n})).collect()
    }

    fn options(page_size: usize) -> RegistryFetchOptions {
        RegistryFetchOptions {
            page_size,
            max_plugins: None,
        }
    }

    fn ids(fetch: &RegistryFetch) -> Vec<&str> {
        fetch.entries.iter().map(|e| e.plugin_id.as_str()).collect()
    }

    // ========== Curated mode tests ==========

    #[tokio::test]
    async fn test_curated_registry_is_offline() {
        let collector = RegistryCollector::new(ScriptedRegistrySource::new(vec![]));
        let fetch = collector
            .fetch(
                CollectionMode::Curated,
                RegistryFetchOptions::default(),
                &RequestPacer::unpaced(),
            )
            .await
            .unwrap();
        assert_eq!(
            ids(&fetch),
            vec!["cucumber-reports", "sample-plugin", "workflow-cps"]
        );
        assert!(collector.source.requests().is_empty());
    }

    // ========== Pagination tests ==========

    #[tokio::test]
    async fn test_stops_when_total_reached() {
        let source = ScriptedRegistrySource::new(vec![
            json!({"plugins": plugins(&["a", "b"]), "total": 3}),
            json!({"plugins": plugins(&["c"]), "total": 3}),
        ]);
        let collector = RegistryCollector::new(source);
        let fetch = collector
            .fetch(CollectionMode::Real, options(2), &RequestPacer::unpaced())
            .await
            .unwrap();

        assert_eq!(ids(&fetch), vec!["a", "b", "c"]);
        assert_eq!(fetch.raw_pages.len(), 2);
        assert_eq!(
            collector.source.requests()[1],
            PageRequest::Offset {
                offset: 2,
                limit: 2
            }
        );
    }

    #[tokio::test]
    async fn test_stops_on_short_bare_list_page() {
        let source = ScriptedRegistrySource::new(vec![
            Value::Array(plugins(&["a", "b"])),
            Value::Array(plugins(&["c"])),
        ]);
        let collector = RegistryCollector::new(source);
        let fetch = collector
            .fetch(CollectionMode::Real, options(2), &RequestPacer::unpaced())
            .await
            .unwrap();
        assert_eq!(ids(&fetch), vec!["a", "b", "c"]);
        assert_eq!(collector.source.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_stops_on_empty_page_even_with_bogus_total() {
        let source = ScriptedRegistrySource::new(vec![
            json!({"plugins": plugins(&["a"]), "total": 1000}),
            json!({"plugins": [], "total": 1000}),
        ]);
        let collector = RegistryCollector::new(source);
        let fetch = collector
            .fetch(CollectionMode::Real, options(1), &RequestPacer::unpaced())
            .await
            .unwrap();
        assert_eq!(ids(&fetch), vec!["a"]);
        assert_eq!(collector.source.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_follows_next_link_verbatim() {
        let next = "https://plugins.jenkins.io/api/plugins?cursor=abc";
        let source = ScriptedRegistrySource::new(vec![
            json!({"plugins": plugins(&["a"]), "next": next}),
            json!({"plugins": plugins(&["b"])}),
        ]);
        let collector = RegistryCollector::new(source);
        let fetch = collector
            .fetch(CollectionMode::Real, options(10), &RequestPacer::unpaced())
            .await
            .unwrap();
        assert_eq!(ids(&fetch), vec!["a", "b"]);
        assert_eq!(
            collector.source.requests()[1],
            PageRequest::Next(next.to_string())
        );
    }

    #[tokio::test]
    async fn test_page_ceiling_stops_runaway_pagination() {
        // Every page is full and claims more remain
        struct EndlessSource;

        #[async_trait]
        impl RegistrySource for EndlessSource {
            async fn fetch_page(&self, _request: &PageRequest) -> Result<Value> {
                Ok(json!({"plugins": [{"name": "same"}]}))
            }
        }

        let collector = RegistryCollector::new(EndlessSource);
        let fetch = collector
            .fetch(CollectionMode::Real, options(1), &RequestPacer::unpaced())
            .await
            .unwrap();
        assert_eq!(fetch.raw_pages.len(), MAX_REGISTRY_PAGES);
        assert_eq!(fetch.entries.len(), 1);
        assert_eq!(fetch.integrity_warnings[0].occurrences, MAX_REGISTRY_PAGES);
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_requests_are_paced() {
        let source = ScriptedRegistrySource::new(vec![
            json!({"plugins": plugins(&["a"]), "total": 3}),
            json!({"plugins": plugins(&["b"]), "total": 3}),
            json!({"plugins": plugins(&["c"]), "total": 3}),
        ]);
        let collector = RegistryCollector::new(source);
        let pacer = RequestPacer::new(std::time::Duration::from_secs(5));
        let start = tokio::time::Instant::now();

        let fetch = collector
            .fetch(CollectionMode::Real, options(1), &pacer)
            .await
            .unwrap();

        assert_eq!(ids(&fetch), vec!["a", "b", "c"]);
        assert!(start.elapsed() >= std::time::Duration::from_secs(10));
    }

    // ========== Dedup and validation tests ==========

    #[tokio::test]
    async fn test_duplicates_across_pages_are_dropped_with_warning() {
        let source = ScriptedRegistrySource::new(vec![
            json!({"plugins": plugins(&["git", "mailer"]), "total": 4}),
            json!({"plugins": plugins(&["git", "junit"]), "total": 4}),
        ]);
        let collector = RegistryCollector::new(source);
        let mut emitted = Vec::new();
        let fetch = collector
            .fetch_with(CollectionMode::Real, options(2), &RequestPacer::unpaced(), |entry| {
                emitted.push(entry.plugin_id.to_string());
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(ids(&fetch), vec!["git", "mailer", "junit"]);
        assert_eq!(emitted, vec!["git", "mailer", "junit"]);
        assert_eq!(fetch.integrity_warnings.len(), 1);
        assert_eq!(fetch.integrity_warnings[0].plugin_id.as_str(), "git");
        assert_eq!(fetch.integrity_warnings[0].occurrences, 2);
    }

    #[tokio::test]
    async fn test_invalid_ids_are_skipped() {
        let source = ScriptedRegistrySource::new(vec![json!([
            {"name": "git"},
            {"name": "../etc"},
            {"title": "no id"},
            "not an object"
        ])]);
        let collector = RegistryCollector::new(source);
        let fetch = collector
            .fetch(CollectionMode::Real, options(10), &RequestPacer::unpaced())
            .await
            .unwrap();
        assert_eq!(ids(&fetch), vec!["git"]);
        assert_eq!(fetch.invalid_items, 3);
    }

    #[tokio::test]
    async fn test_cap_counts_unique_entries() {
        let source = ScriptedRegistrySource::new(vec![json!({
            "plugins": plugins(&["a", "a", "b", "c", "d"]),
            "total": 5
        })]);
        let collector = RegistryCollector::new(source);
        let fetch = collector
            .fetch(
                CollectionMode::Real,
                RegistryFetchOptions {
                    page_size: 5,
                    max_plugins: Some(3),
                },
                &RequestPacer::unpaced(),
            )
            .await
            .unwrap();
        assert_eq!(ids(&fetch), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_unexpected_payload_is_an_error() {
        let source = ScriptedRegistrySource::new(vec![json!("maintenance")]);
        let collector = RegistryCollector::new(source);
        assert!(collector
            .fetch(CollectionMode::Real, options(10), &RequestPacer::unpaced())
            .await
            .is_err());
    }
}
