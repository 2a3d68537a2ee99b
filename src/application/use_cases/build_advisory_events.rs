use crate::application::artifacts::{read_jsonl, to_jsonl};
use crate::application::dto::EventBuildSummary;
use crate::ports::outbound::{ArtifactKey, ArtifactStore, Dataset, ProgressReporter, Stage};
use crate::risk_assessment::domain::{AdvisoryMode, AdvisoryRecord, PluginId};
use crate::risk_assessment::services::EventNormalizer;
use crate::shared::Result;
use std::collections::BTreeSet;
use tracing::info;

/// BuildAdvisoryEventsUseCase - Rebuilds the advisory event stream
///
/// Reads every stored advisory artifact (both modes) and replaces the
/// event dataset wholesale. Rebuilding from unchanged inputs yields a
/// byte-identical stream.
pub struct BuildAdvisoryEventsUseCase<ST, PR> {
    store: ST,
    progress_reporter: PR,
}

impl<ST, PR> BuildAdvisoryEventsUseCase<ST, PR>
where
    ST: ArtifactStore,
    PR: ProgressReporter,
{
    pub fn new(store: ST, progress_reporter: PR) -> Self {
        Self {
            store,
            progress_reporter,
        }
    }

    pub fn execute(&self) -> Result<EventBuildSummary> {
        self.progress_reporter
            .report("🧮 Building advisory events from stored advisory records");

        let mut plugin_ids: BTreeSet<PluginId> = BTreeSet::new();
        for mode in AdvisoryMode::ALL {
            plugin_ids.extend(self.store.plugin_ids(Stage::Advisories(mode))?);
        }

        let mut summary = EventBuildSummary::default();
        let mut records: Vec<AdvisoryRecord> = Vec::new();
        for plugin_id in &plugin_ids {
            for mode in AdvisoryMode::ALL {
                let key = ArtifactKey::plugin(plugin_id, Stage::Advisories(mode));
                if !self.store.exists(&key) {
                    continue;
                }
                let lines = read_jsonl::<AdvisoryRecord, _>(&self.store, &key)?;
                summary.artifacts_read += 1;
                summary.malformed_lines += lines.malformed;
                records.extend(lines.items);
            }
        }
        summary.records_read = records.len();

        let events = EventNormalizer::normalize(&records);
        summary.events_written = events.len();
        self.store.put(
            &ArtifactKey::dataset(Dataset::AdvisoryEvents),
            &to_jsonl(&events)?,
        )?;

        info!(
            artifacts = summary.artifacts_read,
            records = summary.records_read,
            malformed = summary.malformed_lines,
            events = summary.events_written,
            "advisory events built"
        );
        self.progress_reporter.report_completion(&format!(
            "✅ {} advisory event(s) from {} record(s)",
            summary.events_written, summary.records_read
        ));
        Ok(summary)
    }
}
