use crate::application::artifacts::{
    load_bulk_health, load_registry, load_snapshot, to_jsonl, write_json,
};
use crate::application::collectors::{AdvisoryCollector, HealthCollector, SnapshotCollector};
use crate::application::dto::{
    AdvisorySourceFailure, EnrichmentRequest, EnrichmentStage, EnrichmentSummary, StageFailure,
};
use crate::application::pacing::RequestPacer;
use crate::application::resume::ResumePolicy;
use crate::ports::outbound::{
    AdvisoryPageSource, ArtifactKey, ArtifactStore, HealthSource, ProgressReporter,
    SnapshotSource, Stage,
};
use crate::risk_assessment::domain::{
    AdvisoryMode, CollectionMode, HealthDataset, PluginId, PluginSnapshot,
};
use crate::shared::error::{CanaryError, ErrorKind};
use crate::shared::Result;
use tracing::{debug, info, warn};

/// Health dataset state for one run; loaded at most once
enum HealthState {
    NotLoaded,
    Loaded(HealthDataset),
    Unavailable(String),
}

/// Outcome of one `(plugin, stage)` unit
enum StageOutcome {
    Completed,
    Skipped,
}

/// Per-plugin context carried between stages
#[derive(Default)]
struct PluginRun {
    /// Snapshot produced by this run's snapshot stage
    snapshot: Option<PluginSnapshot>,
    snapshot_failed: bool,
}

/// EnrichRegistryUseCase - Runs the per-plugin stages over the registry spine
///
/// Every `(plugin, stage)` unit is skipped when its artifact already exists
/// (unless overwrite is set), so repeated runs converge on a complete data
/// set. A failing unit is recorded and the batch moves on.
///
/// # Type Parameters
/// * `SS` - SnapshotSource implementation
/// * `AS` - AdvisoryPageSource implementation
/// * `HS` - HealthSource implementation
/// * `ST` - ArtifactStore implementation
/// * `PR` - ProgressReporter implementation
pub struct EnrichRegistryUseCase<SS, AS, HS, ST, PR> {
    snapshots: SnapshotCollector<SS>,
    advisories: AdvisoryCollector<AS>,
    health: HealthCollector<HS>,
    store: ST,
    progress_reporter: PR,
}

impl<SS, AS, HS, ST, PR> EnrichRegistryUseCase<SS, AS, HS, ST, PR>
where
    SS: SnapshotSource,
    AS: AdvisoryPageSource,
    HS: HealthSource,
    ST: ArtifactStore,
    PR: ProgressReporter,
{
    pub fn new(
        snapshot_source: SS,
        advisory_source: AS,
        health_source: HS,
        store: ST,
        progress_reporter: PR,
    ) -> Result<Self> {
        Ok(Self {
            snapshots: SnapshotCollector::new(snapshot_source),
            advisories: AdvisoryCollector::new(advisory_source)?,
            health: HealthCollector::new(health_source),
            store,
            progress_reporter,
        })
    }

    /// Executes the enrichment run
    ///
    /// # Errors
    /// Only run-level problems are errors: a missing registry artifact or an
    /// unreadable store. Per-plugin failures land in the summary.
    pub async fn execute(&self, request: EnrichmentRequest) -> Result<EnrichmentSummary> {
        let entries = load_registry(&self.store)?;
        let mut summary = EnrichmentSummary::new(request.mode, &request.stages);
        summary.plugins_total = entries.len();

        let pacer = RequestPacer::new(request.request_delay);
        let mut health = if request.stages.contains(&EnrichmentStage::Health) {
            match load_bulk_health(&self.store)? {
                Some(dataset) => HealthState::Loaded(dataset),
                None => HealthState::NotLoaded,
            }
        } else {
            HealthState::NotLoaded
        };

        self.progress_reporter.report(&format!(
            "🚀 Enriching {} plugin(s) ({} mode, stages: {})",
            entries.len(),
            request.mode,
            request
                .stages
                .iter()
                .map(EnrichmentStage::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        ));
        info!(run_id = %summary.run_id, plugins = entries.len(), mode = %request.mode, "enrichment started");

        for (index, entry) in entries.iter().enumerate() {
            let plugin_id = &entry.plugin_id;
            self.progress_reporter
                .report_progress(index + 1, entries.len(), Some(plugin_id.as_str()));

            let pending = self.pending_stages(plugin_id, &request, &health, &mut summary);
            if pending.is_empty() {
                debug!(plugin_id = %plugin_id, "nothing to do");
                continue;
            }
            if request
                .max_plugins
                .is_some_and(|max| summary.plugins_processed >= max)
            {
                summary.plugins_deferred += 1;
                continue;
            }
            summary.plugins_processed += 1;

            let mut run = PluginRun::default();
            for stage in pending {
                let outcome = match stage {
                    EnrichmentStage::Snapshot => {
                        self.run_snapshot(plugin_id, request.mode, &pacer, &mut run)
                            .await
                    }
                    EnrichmentStage::Advisories => {
                        self.run_advisories(plugin_id, request.mode, &run, &pacer, &mut summary)
                            .await
                    }
                    EnrichmentStage::Health => {
                        self.run_health(plugin_id, &mut health, &pacer).await
                    }
                };
                match outcome {
                    Ok(StageOutcome::Completed) => summary.counts_mut(stage).completed += 1,
                    Ok(StageOutcome::Skipped) => summary.counts_mut(stage).skipped += 1,
                    Err(e) => {
                        let kind = ErrorKind::of(&e);
                        warn!(plugin_id = %plugin_id, stage = %stage, kind = %kind, error = %e, "stage failed");
                        summary.counts_mut(stage).failed += 1;
                        summary.failures.push(StageFailure {
                            plugin_id: plugin_id.clone(),
                            stage,
                            kind,
                            message: first_line(&e.to_string()),
                        });
                    }
                }
            }
        }

        info!(
            run_id = %summary.run_id,
            processed = summary.plugins_processed,
            deferred = summary.plugins_deferred,
            failures = summary.failures.len(),
            "enrichment finished"
        );
        let message = format!(
            "Enrichment finished: {} plugin(s) processed, {} deferred, {} failure(s)",
            summary.plugins_processed,
            summary.plugins_deferred,
            summary.failures.len()
        );
        if summary.has_failures() {
            self.progress_reporter.report_error(&format!("⚠️  {}", message));
        } else {
            self.progress_reporter.report_completion(&format!("✅ {}", message));
        }
        Ok(summary)
    }

    /// Stages that still have work for `plugin_id`; the rest are counted as skipped.
    fn pending_stages(
        &self,
        plugin_id: &PluginId,
        request: &EnrichmentRequest,
        health: &HealthState,
        summary: &mut EnrichmentSummary,
    ) -> Vec<EnrichmentStage> {
        let mut pending = Vec::new();
        for stage in &request.stages {
            let key = ArtifactKey::plugin(plugin_id, artifact_stage(*stage, request.mode));
            let mut should_run = ResumePolicy::should_run(&self.store, &key, request.overwrite);
            if *stage == EnrichmentStage::Health {
                if let HealthState::Loaded(dataset) = health {
                    should_run &= dataset.get(plugin_id).is_some();
                }
            }
            if should_run {
                pending.push(*stage);
            } else {
                summary.counts_mut(*stage).skipped += 1;
            }
        }
        pending
    }

    async fn run_snapshot(
        &self,
        plugin_id: &PluginId,
        mode: CollectionMode,
        pacer: &RequestPacer,
        run: &mut PluginRun,
    ) -> Result<StageOutcome> {
        match self.snapshots.fetch(plugin_id, mode, pacer).await {
            Ok(snapshot) => {
                let key = ArtifactKey::plugin(plugin_id, Stage::Snapshot(mode));
                write_json(&self.store, &key, &snapshot)?;
                run.snapshot = Some(snapshot);
                Ok(StageOutcome::Completed)
            }
            Err(e) => {
                run.snapshot_failed = true;
                Err(e)
            }
        }
    }

    async fn run_advisories(
        &self,
        plugin_id: &PluginId,
        mode: CollectionMode,
        run: &PluginRun,
        pacer: &RequestPacer,
        summary: &mut EnrichmentSummary,
    ) -> Result<StageOutcome> {
        let advisory_mode = AdvisoryMode::from(mode);
        let stored;
        let snapshot = match advisory_mode {
            AdvisoryMode::Sample => None,
            AdvisoryMode::Real if run.snapshot_failed => {
                return Err(missing_snapshot(
                    plugin_id,
                    "The snapshot stage failed for this plugin in this run",
                ))
            }
            AdvisoryMode::Real => match &run.snapshot {
                Some(snapshot) => Some(snapshot),
                None => {
                    stored = load_snapshot(&self.store, plugin_id, &[mode])?;
                    Some(stored.as_ref().ok_or_else(|| {
                        missing_snapshot(
                            plugin_id,
                            "Run `canary enrich --real` with the snapshot stage first",
                        )
                    })?)
                }
            },
        };

        let collection = self
            .advisories
            .fetch(plugin_id, advisory_mode, snapshot, pacer)
            .await?;
        let transient = collection
            .failures
            .iter()
            .filter(|f| f.is_transient())
            .count();
        summary
            .advisory_source_failures
            .extend(collection.failures.iter().cloned().map(|failure| {
                AdvisorySourceFailure {
                    plugin_id: plugin_id.clone(),
                    failure,
                }
            }));

        if transient > 0 {
            let first = collection
                .failures
                .iter()
                .find(|f| f.is_transient())
                .map(|f| f.source.clone())
                .unwrap_or_default();
            return Err(CanaryError::Transport {
                url: first,
                status: None,
                details: format!(
                    "{} advisory source(s) failed; results were not stored and will be retried",
                    transient
                ),
            }
            .into());
        }

        let key = ArtifactKey::plugin(plugin_id, Stage::Advisories(advisory_mode));
        self.store.put(&key, &to_jsonl(&collection.records)?)?;
        Ok(StageOutcome::Completed)
    }

    async fn run_health(
        &self,
        plugin_id: &PluginId,
        health: &mut HealthState,
        pacer: &RequestPacer,
    ) -> Result<StageOutcome> {
        if let HealthState::NotLoaded = health {
            *health = match self.health.load_or_fetch(&self.store, pacer).await {
                Ok((dataset, _)) => HealthState::Loaded(dataset),
                Err(e) => HealthState::Unavailable(first_line(&e.to_string())),
            };
        }

        match health {
            HealthState::Loaded(dataset) => match dataset.get(plugin_id) {
                Some(record) => {
                    write_json(&self.store, &ArtifactKey::plugin(plugin_id, Stage::Health), record)?;
                    Ok(StageOutcome::Completed)
                }
                None => {
                    debug!(plugin_id = %plugin_id, "no health record upstream");
                    Ok(StageOutcome::Skipped)
                }
            },
            HealthState::Unavailable(reason) => Err(CanaryError::Transport {
                url: "https://plugin-health.jenkins.io/api/scores".to_string(),
                status: None,
                details: reason.clone(),
            }
            .into()),
            HealthState::NotLoaded => Ok(StageOutcome::Skipped),
        }
    }
}

fn artifact_stage(stage: EnrichmentStage, mode: CollectionMode) -> Stage {
    match stage {
        EnrichmentStage::Snapshot => Stage::Snapshot(mode),
        EnrichmentStage::Advisories => Stage::Advisories(AdvisoryMode::from(mode)),
        EnrichmentStage::Health => Stage::Health,
    }
}

fn missing_snapshot(plugin_id: &PluginId, hint: &str) -> anyhow::Error {
    CanaryError::MissingArtifact {
        plugin_id: plugin_id.to_string(),
        artifact: "snapshot".to_string(),
        hint: hint.to_string(),
    }
    .into()
}

fn first_line(message: &str) -> String {
    message.lines().next().unwrap_or_default().to_string()
}
