use crate::application::artifacts::{load_bulk_health, write_json};
use crate::application::pacing::RequestPacer;
use crate::ports::outbound::{ArtifactKey, ArtifactStore, Dataset, HealthSource};
use crate::risk_assessment::domain::HealthDataset;
use crate::risk_assessment::services::parse_health_dataset;
use crate::shared::Result;
use serde_json::Value;
use tracing::{debug, info};

/// HealthCollector fetches the bulk plugin health export.
pub struct HealthCollector<S> {
    source: S,
}

impl<S: HealthSource> HealthCollector<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// The export exactly as received
    pub async fn fetch_payload(&self) -> Result<Value> {
        self.source.fetch_scores().await
    }

    pub async fn fetch(&self) -> Result<HealthDataset> {
        let payload = self.fetch_payload().await?;
        Ok(parse_health_dataset(&payload))
    }

    /// Returns the stored bulk dataset, fetching and storing it when absent.
    ///
    /// The second element is true when the dataset came from upstream.
    pub async fn load_or_fetch<ST>(
        &self,
        store: &ST,
        pacer: &RequestPacer,
    ) -> Result<(HealthDataset, bool)>
    where
        ST: ArtifactStore + ?Sized,
    {
        if let Some(dataset) = load_bulk_health(store)? {
            debug!(records = dataset.len(), "using stored health dataset");
            return Ok((dataset, false));
        }

        pacer.wait().await;
        let payload = self.fetch_payload().await?;
        write_json(store, &ArtifactKey::dataset(Dataset::HealthBulk), &payload)?;
        let dataset = parse_health_dataset(&payload);
        info!(
            records = dataset.len(),
            skipped = dataset.skipped,
            "health dataset fetched"
        );
        Ok((dataset, true))
    }
}
