use crate::application::pacing::DEFAULT_REQUEST_DELAY_MS;
use crate::risk_assessment::domain::{CollectionMode, PluginId, SourceFailure};
use crate::shared::error::ErrorKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// Per-plugin work unit of a batch enrichment run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentStage {
    Snapshot,
    Advisories,
    Health,
}

impl EnrichmentStage {
    pub const ALL: [EnrichmentStage; 3] = [
        EnrichmentStage::Snapshot,
        EnrichmentStage::Advisories,
        EnrichmentStage::Health,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentStage::Snapshot => "snapshot",
            EnrichmentStage::Advisories => "advisories",
            EnrichmentStage::Health => "health",
        }
    }
}

impl fmt::Display for EnrichmentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EnrichmentStage {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "snapshot" | "snapshots" => Ok(EnrichmentStage::Snapshot),
            "advisories" | "advisory" => Ok(EnrichmentStage::Advisories),
            "health" | "healthscore" => Ok(EnrichmentStage::Health),
            _ => Err(format!(
                "Invalid stage: {}. Please specify 'snapshot', 'advisories' or 'health'",
                s
            )),
        }
    }
}

/// EnrichmentRequest - Request DTO for the batch enrichment use case
#[derive(Debug, Clone)]
pub struct EnrichmentRequest {
    /// Snapshot mode; advisories follow it (curated → sample, real → real)
    pub mode: CollectionMode,
    pub stages: BTreeSet<EnrichmentStage>,
    /// Re-run stages whose artifact already exists
    pub overwrite: bool,
    /// Minimum gap between upstream requests
    pub request_delay: Duration,
    /// Bound on plugins that still had work to do
    pub max_plugins: Option<usize>,
}

impl EnrichmentRequest {
    pub fn new(mode: CollectionMode) -> Self {
        Self {
            mode,
            stages: EnrichmentStage::ALL.into_iter().collect(),
            overwrite: false,
            request_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
            max_plugins: None,
        }
    }
}

/// Per-stage counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageCounts {
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// One `(plugin_id, stage)` unit that failed; the batch carried on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageFailure {
    pub plugin_id: PluginId,
    pub stage: EnrichmentStage,
    pub kind: ErrorKind,
    pub message: String,
}

/// An advisory source that failed while collecting one plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvisorySourceFailure {
    pub plugin_id: PluginId,
    #[serde(flatten)]
    pub failure: SourceFailure,
}

/// EnrichmentSummary - Outcome of one batch enrichment run
#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub mode: CollectionMode,
    pub stages: BTreeMap<EnrichmentStage, StageCounts>,
    pub failures: Vec<StageFailure>,
    pub advisory_source_failures: Vec<AdvisorySourceFailure>,
    /// Plugins in the registry spine
    pub plugins_total: usize,
    /// Plugins that had at least one stage to run
    pub plugins_processed: usize,
    /// Plugins with pending work left for a later run by `max_plugins`
    pub plugins_deferred: usize,
}

impl EnrichmentSummary {
    pub fn new(mode: CollectionMode, stages: &BTreeSet<EnrichmentStage>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            mode,
            stages: stages
                .iter()
                .map(|stage| (*stage, StageCounts::default()))
                .collect(),
            failures: Vec::new(),
            advisory_source_failures: Vec::new(),
            plugins_total: 0,
            plugins_processed: 0,
            plugins_deferred: 0,
        }
    }

    pub fn counts(&self, stage: EnrichmentStage) -> StageCounts {
        self.stages.get(&stage).copied().unwrap_or_default()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub(crate) fn counts_mut(&mut self, stage: EnrichmentStage) -> &mut StageCounts {
        self.stages.entry(stage).or_default()
    }
}
