use crate::ports::outbound::{ArtifactKey, ArtifactStore};

/// Idempotent-skip precondition for batch work.
///
/// A `(plugin_id, stage)` unit runs when its artifact is absent or the caller
/// asked for overwrite. Deciding *whether* to run lives here; *how* to run
/// lives in the collectors.
pub struct ResumePolicy;

impl ResumePolicy {
    pub fn should_run<ST>(store: &ST, key: &ArtifactKey, overwrite: bool) -> bool
    where
        ST: ArtifactStore + ?Sized,
    {
        overwrite || !store.exists(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::memory::InMemoryArtifactStore;
    use crate::ports::outbound::Stage;
    use crate::risk_assessment::domain::PluginId;

    #[test]
    fn test_should_run_matrix() {
        let store = InMemoryArtifactStore::new();
        let key = ArtifactKey::plugin(&PluginId::new("git").unwrap(), Stage::Health);

        assert!(ResumePolicy::should_run(&store, &key, false));
        assert!(ResumePolicy::should_run(&store, &key, true));

        store.put(&key, "{}").unwrap();
        assert!(!ResumePolicy::should_run(&store, &key, false));
        assert!(ResumePolicy::should_run(&store, &key, true));
    }
}
