use crate::application::artifacts::{load_snapshot, to_jsonl};
use crate::application::collectors::AdvisoryCollector;
use crate::application::dto::{AdvisoryRequest, AdvisoryResponse};
use crate::application::pacing::RequestPacer;
use crate::ports::outbound::{
    AdvisoryPageSource, ArtifactKey, ArtifactStore, ProgressReporter, Stage,
};
use crate::risk_assessment::domain::{AdvisoryMode, CollectionMode};
use crate::shared::Result;
use tracing::{info, warn};

/// Snapshot preference when collecting real advisories for one plugin
const SNAPSHOT_PREFERENCE: [CollectionMode; 2] = [CollectionMode::Real, CollectionMode::Curated];

/// CollectAdvisoriesUseCase - Collects advisory records for one plugin
///
/// Real mode reads the stored snapshot to discover advisory pages. A result
/// with transient source failures is returned but not stored, so the next
/// run tries again.
pub struct CollectAdvisoriesUseCase<AS, ST, PR> {
    collector: AdvisoryCollector<AS>,
    store: ST,
    progress_reporter: PR,
    pacer: RequestPacer,
}

impl<AS, ST, PR> CollectAdvisoriesUseCase<AS, ST, PR>
where
    AS: AdvisoryPageSource,
    ST: ArtifactStore,
    PR: ProgressReporter,
{
    pub fn new(
        advisory_source: AS,
        store: ST,
        progress_reporter: PR,
        pacer: RequestPacer,
    ) -> Result<Self> {
        Ok(Self {
            collector: AdvisoryCollector::new(advisory_source)?,
            store,
            progress_reporter,
            pacer,
        })
    }

    pub async fn execute(&self, request: AdvisoryRequest) -> Result<AdvisoryResponse> {
        let plugin_id = &request.plugin_id;
        self.progress_reporter.report(&format!(
            "🛡️  Collecting advisories for {} ({} mode)",
            plugin_id, request.mode
        ));

        let snapshot = match request.mode {
            AdvisoryMode::Real => load_snapshot(&self.store, plugin_id, &SNAPSHOT_PREFERENCE)?,
            AdvisoryMode::Sample => None,
        };
        let collection = self
            .collector
            .fetch(plugin_id, request.mode, snapshot.as_ref(), &self.pacer)
            .await?;

        for failure in &collection.failures {
            self.progress_reporter
                .report_error(&format!("⚠️  {}", failure));
        }

        let persisted = !collection.has_transient_failures();
        if persisted {
            let key = ArtifactKey::plugin(plugin_id, Stage::Advisories(request.mode));
            self.store.put(&key, &to_jsonl(&collection.records)?)?;
        } else {
            warn!(
                plugin_id = %plugin_id,
                failures = collection.failures.len(),
                "advisories not stored because of transient failures"
            );
        }

        let response = AdvisoryResponse {
            plugin_id: plugin_id.clone(),
            mode: request.mode,
            records: collection.records,
            failures: collection.failures,
            persisted,
        };
        info!(
            plugin_id = %plugin_id,
            records = response.records.len(),
            vulnerabilities = response.vulnerability_count(),
            persisted,
            "advisories collected"
        );
        self.progress_reporter.report_completion(&format!(
            "✅ {} advisory record(s), {} vulnerability(ies)",
            response.records.len(),
            response.vulnerability_count()
        ));
        Ok(response)
    }
}
