use super::{AdvisoryMode, PluginId, Severity};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Stable identity of an advisory event.
///
/// The derived ordering sorts by plugin, then advisory, then CVE with the
/// CVE-less event first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventKey {
    pub plugin_id: PluginId,
    pub advisory_id: String,
    pub cve_id: Option<String>,
}

/// One deduplicated (plugin, advisory, CVE) fact derived from advisory records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryEvent {
    #[serde(flatten)]
    pub key: EventKey,
    pub published_date: Option<NaiveDate>,
    pub cvss_score: Option<f64>,
    pub severity: Option<Severity>,
    pub title: Option<String>,
    pub source_url: String,
    pub security_warning_ids: BTreeSet<String>,
    pub active_security_warning: bool,
    pub modes: BTreeSet<AdvisoryMode>,
    /// Number of raw (record, vulnerability) occurrences folded into this event
    pub merged_from_count: usize,
}

impl AdvisoryEvent {
    pub fn plugin_id(&self) -> &PluginId {
        &self.key.plugin_id
    }
}
