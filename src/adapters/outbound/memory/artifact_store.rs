use crate::ports::outbound::{ArtifactKey, ArtifactStore, ArtifactStream, Stage};
use crate::risk_assessment::domain::PluginId;
use crate::shared::Result;
use dashmap::DashMap;
use std::sync::Arc;

/// InMemoryArtifactStore adapter backed by a concurrent map
///
/// Clones share the same underlying map, so a test can hand one clone to a
/// use case and inspect the other afterwards.
#[derive(Debug, Clone, Default)]
pub struct InMemoryArtifactStore {
    artifacts: Arc<DashMap<ArtifactKey, String>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored artifacts (for testing)
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl ArtifactStore for InMemoryArtifactStore {
    fn exists(&self, key: &ArtifactKey) -> bool {
        self.artifacts.contains_key(key)
    }

    fn get(&self, key: &ArtifactKey) -> Result<Option<String>> {
        Ok(self.artifacts.get(key).map(|value| value.clone()))
    }

    fn put(&self, key: &ArtifactKey, contents: &str) -> Result<()> {
        self.artifacts.insert(key.clone(), contents.to_string());
        Ok(())
    }

    fn plugin_ids(&self, stage: Stage) -> Result<Vec<PluginId>> {
        let mut ids: Vec<PluginId> = self
            .artifacts
            .iter()
            .filter_map(|entry| match entry.key() {
                ArtifactKey::Plugin {
                    plugin_id,
                    stage: s,
                } if *s == stage => Some(plugin_id.clone()),
                _ => None,
            })
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn open_stream(&self, key: &ArtifactKey) -> Result<Box<dyn ArtifactStream>> {
        Ok(Box::new(MemoryArtifactStream {
            artifacts: Arc::clone(&self.artifacts),
            key: key.clone(),
            buffer: String::new(),
        }))
    }
}

struct MemoryArtifactStream {
    artifacts: Arc<DashMap<ArtifactKey, String>>,
    key: ArtifactKey,
    buffer: String,
}

impl ArtifactStream for MemoryArtifactStream {
    fn append_line(&mut self, line: &str) -> Result<()> {
        self.buffer.push_str(line);
        self.buffer.push('\n');
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<()> {
        self.artifacts.insert(self.key, self.buffer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::Dataset;
    use crate::risk_assessment::domain::{AdvisoryMode, CollectionMode};

    fn id(s: &str) -> PluginId {
        PluginId::new(s).unwrap()
    }

    #[test]
    fn test_put_get_exists() {
        let store = InMemoryArtifactStore::new();
        let key = ArtifactKey::plugin(&id("git"), Stage::Snapshot(CollectionMode::Real));
        assert!(!store.exists(&key));
        store.put(&key, "{}").unwrap();
        assert!(store.exists(&key));
        assert_eq!(store.get(&key).unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_clones_share_state() {
        let store = InMemoryArtifactStore::new();
        let other = store.clone();
        store
            .put(&ArtifactKey::dataset(Dataset::HealthBulk), "[]")
            .unwrap();
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn test_plugin_ids_by_stage() {
        let store = InMemoryArtifactStore::new();
        let sample = Stage::Advisories(AdvisoryMode::Sample);
        store.put(&ArtifactKey::plugin(&id("b"), sample), "x").unwrap();
        store.put(&ArtifactKey::plugin(&id("a"), sample), "x").unwrap();
        store
            .put(&ArtifactKey::plugin(&id("c"), Stage::Health), "x")
            .unwrap();
        assert_eq!(store.plugin_ids(sample).unwrap(), vec![id("a"), id("b")]);
    }

    #[test]
    fn test_stream_visible_after_commit() {
        let store = InMemoryArtifactStore::new();
        let key = ArtifactKey::dataset(Dataset::Registry);
        let mut stream = store.open_stream(&key).unwrap();
        stream.append_line("one").unwrap();
        assert!(!store.exists(&key));
        stream.commit().unwrap();
        assert_eq!(store.get(&key).unwrap().as_deref(), Some("one\n"));
    }
}
