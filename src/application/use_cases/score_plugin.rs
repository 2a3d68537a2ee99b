use crate::application::artifacts::{
    load_advisory_records, load_events, load_health, load_snapshot,
};
use crate::application::dto::ScoreRequest;
use crate::ports::outbound::ArtifactStore;
use crate::risk_assessment::domain::{CollectionMode, ScoreResult};
use crate::risk_assessment::services::{BaselineScorer, EventNormalizer, ScoringInputs};
use crate::shared::Result;
use tracing::debug;

/// Real metadata wins over the curated pilot records
const SNAPSHOT_PREFERENCE: [CollectionMode; 2] = [CollectionMode::Real, CollectionMode::Curated];

/// ScorePluginUseCase - Scores one plugin from whatever is stored
///
/// Missing inputs only remove their contributions; scoring a plugin with
/// no stored artifacts at all still yields the name heuristic.
pub struct ScorePluginUseCase<ST> {
    store: ST,
    scorer: BaselineScorer,
}

impl<ST: ArtifactStore> ScorePluginUseCase<ST> {
    pub fn new(store: ST, scorer: BaselineScorer) -> Self {
        Self { store, scorer }
    }

    pub fn execute(&self, request: ScoreRequest) -> Result<ScoreResult> {
        let plugin_id = &request.plugin_id;
        let mut inputs = ScoringInputs::new(request.as_of);

        inputs.snapshot = load_snapshot(&self.store, plugin_id, &SNAPSHOT_PREFERENCE)?;
        inputs.events = match load_events(&self.store)? {
            Some(events) => events
                .into_iter()
                .filter(|event| event.plugin_id() == plugin_id)
                .collect(),
            None => {
                let records = load_advisory_records(&self.store, plugin_id)?;
                EventNormalizer::normalize(&records)
            }
        };
        inputs.health = load_health(&self.store, plugin_id)?;

        debug!(
            plugin_id = %plugin_id,
            has_snapshot = inputs.snapshot.is_some(),
            events = inputs.events.len(),
            has_health = inputs.health.is_some(),
            "scoring inputs loaded"
        );
        Ok(self.scorer.score(plugin_id, &inputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::memory::InMemoryArtifactStore;
    use crate::application::artifacts::{to_jsonl, write_json};
    use crate::ports::outbound::{ArtifactKey, Dataset, Stage};
    use crate::risk_assessment::domain::{HealthRecord, PluginId};
    use chrono::NaiveDate;

    fn id(s: &str) -> PluginId {
        PluginId::new(s).unwrap()
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    #[test]
    fn test_score_without_artifacts_uses_name_only() {
        let use_case = ScorePluginUseCase::new(InMemoryArtifactStore::new(), BaselineScorer::default());
        let result = use_case
            .execute(ScoreRequest::new(id("ldap"), as_of()))
            .unwrap();
        assert_eq!(result.score, 20.0);
        assert_eq!(result.reasons.len(), 1);
    }

    #[test]
    fn test_score_reads_per_plugin_health() {
        let store = InMemoryArtifactStore::new();
        write_json(
            &store,
            &ArtifactKey::plugin(&id("mailer"), Stage::Health),
            &HealthRecord {
                plugin_id: id("mailer"),
                value: 50.0,
                as_of: None,
            },
        )
        .unwrap();

        let result = ScorePluginUseCase::new(store, BaselineScorer::default())
            .execute(ScoreRequest::new(id("mailer"), as_of()))
            .unwrap();

        assert_eq!(result.score, 0.0);
        assert_eq!(result.feature("health_score"), Some(&serde_json::json!(50.0)));
    }

    #[test]
    fn test_event_dataset_is_filtered_to_plugin() {
        let store = InMemoryArtifactStore::new();
        store
            .put(&ArtifactKey::dataset(Dataset::AdvisoryEvents), &to_jsonl::<u8>(&[]).unwrap())
            .unwrap();

        let result = ScorePluginUseCase::new(store, BaselineScorer::default())
            .execute(ScoreRequest::new(id("mailer"), as_of()))
            .unwrap();

        assert_eq!(result.feature("advisory_count"), Some(&serde_json::json!(0)));
    }
}
