use super::PluginId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// External maintenance/health indicator for one plugin (0..=100, higher is healthier)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub plugin_id: PluginId,
    pub value: f64,
    /// As-of marker exactly as published upstream
    #[serde(default)]
    pub as_of: Option<String>,
}

/// Health records keyed by plugin, as split out of the bulk dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthDataset {
    pub records: BTreeMap<PluginId, HealthRecord>,
    /// Entries without a usable id or numeric value
    pub skipped: usize,
}

impl HealthDataset {
    pub fn get(&self, plugin_id: &PluginId) -> Option<&HealthRecord> {
        self.records.get(plugin_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
