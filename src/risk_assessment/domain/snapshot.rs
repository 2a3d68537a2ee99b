use super::{CollectionMode, PluginId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time metadata for one plugin.
///
/// Replaced wholesale on every collection; never merged with an older snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginSnapshot {
    pub plugin_id: PluginId,
    pub mode: CollectionMode,
    pub collected_at: DateTime<Utc>,
    #[serde(default)]
    pub required_core: Option<String>,
    #[serde(default)]
    pub current_version: Option<String>,
    #[serde(default)]
    pub release_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scm_url: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(default)]
    pub security_warnings: Vec<SecurityWarning>,
    /// Upstream document as received, kept for fields not modelled yet
    #[serde(default)]
    pub raw_payload: serde_json::Value,
    /// Fields that were missing or had an unexpected type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parse_issues: Vec<String>,
}

impl PluginSnapshot {
    pub fn active_warning_count(&self) -> usize {
        self.security_warnings.iter().filter(|w| w.active).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

impl Dependency {
    pub fn required(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
            optional: false,
        }
    }
}

/// A snapshot-embedded pointer to an advisory that may affect the plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityWarning {
    /// Jenkins tracker id, e.g. `SECURITY-309`
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub versions: Vec<VersionRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRange {
    #[serde(default)]
    pub first_version: Option<String>,
    #[serde(default)]
    pub last_version: Option<String>,
}
