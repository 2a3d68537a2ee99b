use crate::risk_assessment::domain::{
    AdvisoryMode, AdvisoryRecord, CollectionMode, IntegrityWarning, PluginId, PluginSnapshot,
    SourceFailure,
};
use serde::Serialize;

/// RegistryResponse - Outcome of one registry collection run
#[derive(Debug, Clone, Serialize)]
pub struct RegistryResponse {
    pub mode: CollectionMode,
    pub entries_written: usize,
    pub pages_fetched: usize,
    /// Ids the upstream listing repeated; only the first occurrence was kept
    pub integrity_warnings: Vec<IntegrityWarning>,
    /// Items dropped for a missing or invalid plugin id
    pub invalid_items: usize,
    pub raw_pages_saved: bool,
}

/// SnapshotResponse - The snapshot that was stored
#[derive(Debug, Clone)]
pub struct SnapshotResponse {
    pub snapshot: PluginSnapshot,
    /// True when an older snapshot for the same mode was overwritten
    pub replaced_existing: bool,
}

/// AdvisoryResponse - Outcome of collecting one plugin's advisories
#[derive(Debug, Clone)]
pub struct AdvisoryResponse {
    pub plugin_id: PluginId,
    pub mode: AdvisoryMode,
    pub records: Vec<AdvisoryRecord>,
    pub failures: Vec<SourceFailure>,
    /// False when transient failures kept the result out of the store
    pub persisted: bool,
}

impl AdvisoryResponse {
    pub fn vulnerability_count(&self) -> usize {
        self.records.iter().map(|r| r.vulnerabilities.len()).sum()
    }
}

/// Outcome of splitting the bulk health dataset into per-plugin artifacts
#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthCollectionSummary {
    /// Records with a usable plugin id and value
    pub processed: usize,
    pub written: usize,
    /// Per-plugin artifacts left alone because they already existed
    pub skipped: usize,
    /// Bulk records without a usable id or value
    pub unusable: usize,
    /// Plugins whose artifact could not be written
    pub failures: Vec<(PluginId, String)>,
    /// True when the bulk export was downloaded rather than read from the store
    pub fetched: bool,
}

/// Outcome of rebuilding the advisory event stream
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventBuildSummary {
    pub artifacts_read: usize,
    pub records_read: usize,
    pub malformed_lines: usize,
    pub events_written: usize,
}
