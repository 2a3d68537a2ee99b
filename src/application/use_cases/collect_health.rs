use crate::application::artifacts::write_json;
use crate::application::collectors::HealthCollector;
use crate::application::dto::{HealthCollectionSummary, HealthRequest};
use crate::application::pacing::RequestPacer;
use crate::application::resume::ResumePolicy;
use crate::ports::outbound::{
    ArtifactKey, ArtifactStore, Dataset, HealthSource, ProgressReporter, Stage,
};
use crate::risk_assessment::services::parse_health_dataset;
use crate::shared::Result;
use tracing::{info, warn};

/// CollectHealthUseCase - Splits the bulk health export per plugin
///
/// The export is stored as received. Per-plugin artifacts that already
/// exist are left alone unless overwrite is requested, which also forces
/// a fresh download.
pub struct CollectHealthUseCase<HS, ST, PR> {
    collector: HealthCollector<HS>,
    store: ST,
    progress_reporter: PR,
}

impl<HS, ST, PR> CollectHealthUseCase<HS, ST, PR>
where
    HS: HealthSource,
    ST: ArtifactStore,
    PR: ProgressReporter,
{
    pub fn new(health_source: HS, store: ST, progress_reporter: PR) -> Self {
        Self {
            collector: HealthCollector::new(health_source),
            store,
            progress_reporter,
        }
    }

    pub async fn execute(&self, request: HealthRequest) -> Result<HealthCollectionSummary> {
        self.progress_reporter
            .report("🩺 Collecting plugin health scores");

        let (dataset, fetched) = if request.overwrite {
            let payload = self.collector.fetch_payload().await?;
            write_json(
                &self.store,
                &ArtifactKey::dataset(Dataset::HealthBulk),
                &payload,
            )?;
            (parse_health_dataset(&payload), true)
        } else {
            self.collector
                .load_or_fetch(&self.store, &RequestPacer::unpaced())
                .await?
        };

        let mut summary = HealthCollectionSummary {
            processed: dataset.len(),
            unusable: dataset.skipped,
            fetched,
            ..Default::default()
        };

        let total = dataset.len();
        for (index, (plugin_id, record)) in dataset.records.iter().enumerate() {
            self.progress_reporter
                .report_progress(index + 1, total, Some(plugin_id.as_str()));
            let key = ArtifactKey::plugin(plugin_id, Stage::Health);
            if !ResumePolicy::should_run(&self.store, &key, request.overwrite) {
                summary.skipped += 1;
                continue;
            }
            match write_json(&self.store, &key, record) {
                Ok(()) => summary.written += 1,
                Err(e) => {
                    warn!(plugin_id = %plugin_id, error = %e, "health artifact not written");
                    summary.failures.push((plugin_id.clone(), e.to_string()));
                }
            }
        }

        info!(
            processed = summary.processed,
            written = summary.written,
            skipped = summary.skipped,
            unusable = summary.unusable,
            "health scores collected"
        );
        self.progress_reporter.report_completion(&format!(
            "✅ Health scores: {} written, {} already present, {} unusable",
            summary.written, summary.skipped, summary.unusable
        ));
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::memory::InMemoryArtifactStore;
    use crate::application::artifacts::load_health;
    use crate::risk_assessment::domain::PluginId;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct SilentReporter;

    impl ProgressReporter for SilentReporter {
        fn report(&self, _message: &str) {}
        fn report_progress(&self, _current: usize, _total: usize, _message: Option<&str>) {}
        fn report_error(&self, _message: &str) {}
        fn report_completion(&self, _message: &str) {}
    }

    #[derive(Clone)]
    struct StaticHealth {
        payload: Value,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl HealthSource for StaticHealth {
        async fn fetch_scores(&self) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.payload.clone())
        }
    }

    fn source(payload: Value) -> StaticHealth {
        StaticHealth {
            payload,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[tokio::test]
    async fn test_collect_writes_per_plugin_artifacts() {
        let store = InMemoryArtifactStore::new();
        let source = source(json!([
            {"plugin_id": "git", "value": 90},
            {"plugin_id": "mailer", "value": 40, "date": "2026-01-01"},
            {"plugin_id": "broken"}
        ]));
        let use_case = CollectHealthUseCase::new(source, store.clone(), SilentReporter);

        let summary = use_case.execute(HealthRequest::default()).await.unwrap();

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.written, 2);
        assert_eq!(summary.unusable, 1);
        assert!(summary.fetched);
        let mailer = load_health(&store, &PluginId::new("mailer").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(mailer.value, 40.0);
    }

    #[tokio::test]
    async fn test_second_run_skips_existing_without_fetching() {
        let store = InMemoryArtifactStore::new();
        let source = source(json!({"git": {"score": 75}}));
        let calls = Arc::clone(&source.calls);
        let use_case = CollectHealthUseCase::new(source, store.clone(), SilentReporter);

        use_case.execute(HealthRequest::default()).await.unwrap();
        let second = use_case.execute(HealthRequest::default()).await.unwrap();

        assert_eq!(second.written, 0);
        assert_eq!(second.skipped, 1);
        assert!(!second.fetched);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_overwrite_refetches_and_rewrites() {
        let store = InMemoryArtifactStore::new();
        let source = source(json!({"git": {"score": 75}}));
        let calls = Arc::clone(&source.calls);
        let use_case = CollectHealthUseCase::new(source, store.clone(), SilentReporter);

        use_case.execute(HealthRequest::default()).await.unwrap();
        let second = use_case
            .execute(HealthRequest { overwrite: true })
            .await
            .unwrap();

        assert_eq!(second.written, 1);
        assert!(second.fetched);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
