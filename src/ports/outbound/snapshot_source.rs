use crate::risk_assessment::domain::PluginId;
use crate::shared::Result;
use async_trait::async_trait;
use serde_json::Value;

/// SnapshotSource port for per-plugin metadata documents
///
/// # Errors
/// Implementations map an unknown plugin to
/// [`CanaryError::NotFound`](crate::shared::error::CanaryError::NotFound) and
/// every other failure to
/// [`CanaryError::Transport`](crate::shared::error::CanaryError::Transport).
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_plugin(&self, plugin_id: &PluginId) -> Result<Value>;
}
