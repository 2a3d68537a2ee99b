use async_trait::async_trait;
use plugin_canary::prelude::*;
use plugin_canary::shared::error::CanaryError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock SnapshotSource serving payloads by plugin id; unknown ids are not found
#[derive(Clone, Default)]
pub struct MockSnapshotSource {
    pub payloads: HashMap<String, Value>,
    pub calls: Arc<AtomicUsize>,
}

impl MockSnapshotSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(mut self, plugin_id: &str, payload: Value) -> Self {
        self.payloads.insert(plugin_id.to_string(), payload);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotSource for MockSnapshotSource {
    async fn fetch_plugin(&self, plugin_id: &PluginId) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.get(plugin_id.as_str()).cloned().ok_or_else(|| {
            CanaryError::NotFound {
                plugin_id: plugin_id.to_string(),
            }
            .into()
        })
    }
}
