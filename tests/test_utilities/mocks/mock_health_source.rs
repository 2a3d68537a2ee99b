use async_trait::async_trait;
use plugin_canary::prelude::*;
use plugin_canary::shared::error::CanaryError;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock HealthSource returning one export; `None` simulates an outage
#[derive(Clone, Default)]
pub struct MockHealthSource {
    pub payload: Option<Value>,
    pub calls: Arc<AtomicUsize>,
}

impl MockHealthSource {
    pub fn new(payload: Value) -> Self {
        Self {
            payload: Some(payload),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HealthSource for MockHealthSource {
    async fn fetch_scores(&self) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payload.clone().ok_or_else(|| {
            CanaryError::Transport {
                url: "https://plugin-health.jenkins.io/api/scores".to_string(),
                status: Some(500),
                details: "Internal Server Error".to_string(),
            }
            .into()
        })
    }
}
