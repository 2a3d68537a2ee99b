use super::{PluginId, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lower bound of the risk score
pub const MIN_SCORE: f64 = 0.0;
/// Upper bound of the risk score
pub const MAX_SCORE: f64 = 100.0;

/// Explainable risk score for one plugin.
///
/// Every non-zero contribution has a reason line, and every feature value
/// the scorer used appears in `features`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub plugin_id: PluginId,
    pub score: f64,
    /// Highest CVSS bucket among the plugin's advisory events
    pub max_severity: Option<Severity>,
    pub reasons: Vec<String>,
    pub features: BTreeMap<String, serde_json::Value>,
}

impl ScoreResult {
    pub fn feature(&self, name: &str) -> Option<&serde_json::Value> {
        self.features.get(name)
    }
}
