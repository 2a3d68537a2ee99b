use crate::application::artifacts::write_json;
use crate::application::collectors::SnapshotCollector;
use crate::application::dto::{SnapshotRequest, SnapshotResponse};
use crate::application::pacing::RequestPacer;
use crate::ports::outbound::{ArtifactKey, ArtifactStore, ProgressReporter, SnapshotSource, Stage};
use crate::shared::Result;
use tracing::info;

/// CollectPluginUseCase - Collects and stores one plugin snapshot
///
/// Unlike batch enrichment, single-plugin collection always replaces the
/// stored snapshot for the requested mode.
pub struct CollectPluginUseCase<SS, ST, PR> {
    collector: SnapshotCollector<SS>,
    store: ST,
    progress_reporter: PR,
}

impl<SS, ST, PR> CollectPluginUseCase<SS, ST, PR>
where
    SS: SnapshotSource,
    ST: ArtifactStore,
    PR: ProgressReporter,
{
    pub fn new(snapshot_source: SS, store: ST, progress_reporter: PR) -> Self {
        Self {
            collector: SnapshotCollector::new(snapshot_source),
            store,
            progress_reporter,
        }
    }

    pub async fn execute(&self, request: SnapshotRequest) -> Result<SnapshotResponse> {
        self.progress_reporter.report(&format!(
            "🔍 Collecting snapshot for {} ({} mode)",
            request.plugin_id, request.mode
        ));

        let snapshot = self
            .collector
            // A single request has nothing to be spaced from
            .fetch(&request.plugin_id, request.mode, &RequestPacer::unpaced())
            .await?;

        let key = ArtifactKey::plugin(&request.plugin_id, Stage::Snapshot(request.mode));
        let replaced_existing = self.store.exists(&key);
        write_json(&self.store, &key, &snapshot)?;

        info!(
            plugin_id = %request.plugin_id,
            mode = %request.mode,
            warnings = snapshot.security_warnings.len(),
            replaced = replaced_existing,
            "snapshot stored"
        );
        self.progress_reporter.report_completion(&format!(
            "✅ Snapshot stored: {} dependencies, {} security warning(s)",
            snapshot.dependencies.len(),
            snapshot.security_warnings.len()
        ));

        Ok(SnapshotResponse {
            snapshot,
            replaced_existing,
        })
    }
}
