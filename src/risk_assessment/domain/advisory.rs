use super::{AdvisoryMode, PluginId, Vulnerability};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A structured advisory affecting one plugin, as collected in one run.
///
/// Records accumulate across runs; deduplication happens downstream in
/// the event normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryRecord {
    pub plugin_id: PluginId,
    pub advisory_id: String,
    pub source_url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub published_date: Option<NaiveDate>,
    #[serde(default)]
    pub security_warning_ids: Vec<String>,
    #[serde(default)]
    pub active_security_warning: bool,
    #[serde(default)]
    pub vulnerabilities: Vec<Vulnerability>,
    pub mode: AdvisoryMode,
    pub collected_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_versions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFailureKind {
    /// The warning URL could not be turned into a valid advisory URL
    Canonicalization,
    /// The advisory page is gone (HTTP 404)
    NotFound,
    /// Network error or other non-success response
    Transport,
}

/// One advisory source that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    /// Raw or canonical URL of the source
    pub source: String,
    pub kind: SourceFailureKind,
    pub detail: String,
}

impl SourceFailure {
    /// Transient failures are worth retrying on the next run
    pub fn is_transient(&self) -> bool {
        matches!(self.kind, SourceFailureKind::Transport)
    }
}

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            SourceFailureKind::Canonicalization => "canonicalization",
            SourceFailureKind::NotFound => "not found",
            SourceFailureKind::Transport => "transport",
        };
        write!(f, "{} ({}): {}", self.source, kind, self.detail)
    }
}

/// Result of collecting advisories for one plugin: whatever could be
/// extracted, plus the sources that failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvisoryCollection {
    pub records: Vec<AdvisoryRecord>,
    pub failures: Vec<SourceFailure>,
}

impl AdvisoryCollection {
    pub fn has_transient_failures(&self) -> bool {
        self.failures.iter().any(SourceFailure::is_transient)
    }

    pub fn vulnerability_count(&self) -> usize {
        self.records.iter().map(|r| r.vulnerabilities.len()).sum()
    }
}
