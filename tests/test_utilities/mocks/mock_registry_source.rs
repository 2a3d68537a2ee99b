use async_trait::async_trait;
use plugin_canary::ports::outbound::PageRequest;
use plugin_canary::prelude::*;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock RegistrySource that answers scripted pages in order and counts calls
#[derive(Clone, Default)]
pub struct MockRegistrySource {
    pub pages: Vec<Value>,
    pub calls: Arc<AtomicUsize>,
}

impl MockRegistrySource {
    pub fn new(pages: Vec<Value>) -> Self {
        Self {
            pages,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegistrySource for MockRegistrySource {
    async fn fetch_page(&self, _request: &PageRequest) -> Result<Value> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .pages
            .get(index)
            .cloned()
            .unwrap_or_else(|| json!({"plugins": []})))
    }
}
