use crate::application::pacing::RequestPacer;
use crate::ports::outbound::SnapshotSource;
use crate::risk_assessment::domain::{
    CollectionMode, Dependency, PluginId, PluginSnapshot, SecurityWarning, VersionRange,
};
use crate::risk_assessment::services::parse_plugin_payload;
use crate::shared::error::CanaryError;
use crate::shared::Result;
use chrono::Utc;
use serde_json::json;
use tracing::debug;

/// SnapshotCollector fetches or derives per-plugin metadata.
pub struct SnapshotCollector<S> {
    source: S,
}

impl<S: SnapshotSource> SnapshotCollector<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// # Errors
    /// - [`CanaryError::NotFound`] for an unknown plugin (curated: outside
    ///   the pilot set)
    /// - [`CanaryError::Transport`] when the upstream request fails
    pub async fn fetch(
        &self,
        plugin_id: &PluginId,
        mode: CollectionMode,
        pacer: &RequestPacer,
    ) -> Result<PluginSnapshot> {
        match mode {
            CollectionMode::Curated => curated_snapshot(plugin_id),
            CollectionMode::Real => {
                pacer.wait().await;
                let payload = self.source.fetch_plugin(plugin_id).await?;
                let snapshot = parse_plugin_payload(plugin_id, mode, payload, Utc::now());
                for issue in &snapshot.parse_issues {
                    debug!(plugin_id = %plugin_id, issue = %issue, "snapshot field degraded");
                }
                Ok(snapshot)
            }
        }
    }
}

/// Deterministic built-in snapshots for the pilot plugins
fn curated_snapshot(plugin_id: &PluginId) -> Result<PluginSnapshot> {
    let mut snapshot = PluginSnapshot {
        plugin_id: plugin_id.clone(),
        mode: CollectionMode::Curated,
        collected_at: Utc::now(),
        required_core: None,
        current_version: None,
        release_timestamp: None,
        scm_url: None,
        dependencies: Vec::new(),
        security_warnings: Vec::new(),
        raw_payload: json!({}),
        parse_issues: Vec::new(),
    };

    match plugin_id.as_str() {
        "sample-plugin" => {
            snapshot.required_core = Some("2.400".to_string());
            snapshot.current_version = Some("1.0.0".to_string());
            snapshot.dependencies = vec![
                Dependency::required("A", "1.0"),
                Dependency::required("B", "2.0"),
            ];
        }
        "cucumber-reports" => {
            snapshot.scm_url =
                Some("https://github.com/jenkinsci/cucumber-reports-plugin".to_string());
            snapshot.security_warnings = vec![SecurityWarning {
                id: Some("SECURITY-309".to_string()),
                url: Some("https://jenkins.io/security/advisory/2016-07-27/".to_string()),
                active: false,
                message: Some("Stored XSS vulnerability".to_string()),
                versions: vec![VersionRange {
                    first_version: None,
                    last_version: Some("2.5.1".to_string()),
                }],
            }];
        }
        "workflow-cps" => {
            snapshot.scm_url = Some("https://github.com/jenkinsci/workflow-cps-plugin".to_string());
            snapshot.security_warnings = vec![SecurityWarning {
                id: Some("SECURITY-3499".to_string()),
                url: Some("https://www.jenkins.io/security/advisory/2025-01-001/".to_string()),
                active: true,
                message: Some("Sandbox bypass vulnerability".to_string()),
                versions: vec![VersionRange {
                    first_version: None,
                    last_version: Some("2.9".to_string()),
                }],
            }];
        }
        _ => {
            return Err(CanaryError::NotFound {
                plugin_id: plugin_id.to_string(),
            }
            .into())
        }
    }

    snapshot.raw_payload = json!({ "curated": true, "name": plugin_id.as_str() });
    Ok(snapshot)
}
