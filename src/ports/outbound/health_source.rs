use crate::shared::Result;
use async_trait::async_trait;
use serde_json::Value;

/// HealthSource port for the bulk plugin health export
#[async_trait]
pub trait HealthSource: Send + Sync {
    async fn fetch_scores(&self) -> Result<Value>;
}
