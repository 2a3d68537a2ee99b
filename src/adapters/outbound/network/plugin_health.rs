use super::http::HttpClient;
use crate::ports::outbound::HealthSource;
use crate::shared::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

const HEALTH_SCORES_URL: &str = "https://plugin-health.jenkins.io/api/scores";
const ALLOWED_HOSTS: &[&str] = &["plugin-health.jenkins.io"];

/// Client for the plugin-health bulk score export
pub struct PluginHealthClient {
    http: HttpClient,
}

impl PluginHealthClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(timeout, ALLOWED_HOSTS)?,
        })
    }
}

#[async_trait]
impl HealthSource for PluginHealthClient {
    async fn fetch_scores(&self) -> Result<Value> {
        self.http.get_json(HEALTH_SCORES_URL).await
    }
}
