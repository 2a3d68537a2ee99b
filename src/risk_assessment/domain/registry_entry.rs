use super::PluginId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Public plugin site and API host
pub const PLUGIN_SITE_BASE: &str = "https://plugins.jenkins.io";

/// One line of the registry spine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub plugin_id: PluginId,
    pub site_url: String,
    pub api_url: String,
    pub collected_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

impl RegistryEntry {
    /// Creates an entry with the canonical site and API URLs for `plugin_id`
    pub fn new(plugin_id: PluginId, collected_at: DateTime<Utc>) -> Self {
        let site_url = format!("{}/{}/", PLUGIN_SITE_BASE, plugin_id);
        let api_url = format!("{}/api/plugin/{}", PLUGIN_SITE_BASE, plugin_id);
        Self {
            plugin_id,
            site_url,
            api_url,
            collected_at,
            title: None,
            excerpt: None,
            labels: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Diagnostic emitted when the registry listing repeats an identifier.
///
/// Never fatal: the first occurrence is kept and later ones are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityWarning {
    pub plugin_id: PluginId,
    /// Total times the identifier was seen, including the kept one
    pub occurrences: usize,
}

impl fmt::Display for IntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "duplicate plugin id '{}' seen {} times in registry listing; kept first occurrence",
            self.plugin_id, self.occurrences
        )
    }
}
