use super::http::HttpClient;
use crate::ports::outbound::{PageRequest, RegistrySource, SnapshotSource};
use crate::risk_assessment::domain::{PluginId, PLUGIN_SITE_BASE};
use crate::shared::error::{transport_status, CanaryError};
use crate::shared::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

const ALLOWED_HOSTS: &[&str] = &["plugins.jenkins.io"];

/// Client for the plugins.jenkins.io listing and per-plugin API
///
/// Serves both the registry listing and the snapshot documents, since they
/// live on the same host.
pub struct JenkinsPluginSiteClient {
    http: HttpClient,
    base_url: String,
}

impl JenkinsPluginSiteClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(timeout, ALLOWED_HOSTS)?,
            base_url: PLUGIN_SITE_BASE.to_string(),
        })
    }

    fn listing_url(&self, offset: usize, limit: usize) -> String {
        format!(
            "{}/api/plugins?limit={}&offset={}",
            self.base_url, limit, offset
        )
    }

    fn plugin_url(&self, plugin_id: &PluginId) -> String {
        format!(
            "{}/api/plugin/{}",
            self.base_url,
            urlencoding::encode(plugin_id.as_str())
        )
    }
}

#[async_trait]
impl RegistrySource for JenkinsPluginSiteClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Value> {
        let url = match request {
            PageRequest::Offset { offset, limit } => self.listing_url(*offset, *limit),
            // Followed verbatim; HttpClient still enforces the host allowlist
            PageRequest::Next(link) => link.clone(),
        };
        self.http.get_json(&url).await
    }
}

#[async_trait]
impl SnapshotSource for JenkinsPluginSiteClient {
    async fn fetch_plugin(&self, plugin_id: &PluginId) -> Result<Value> {
        let url = self.plugin_url(plugin_id);
        match self.http.get_json(&url).await {
            Ok(payload) => Ok(payload),
            Err(e) if transport_status(&e) == Some(404) => Err(CanaryError::NotFound {
                plugin_id: plugin_id.to_string(),
            }
            .into()),
            Err(e) => Err(e),
        }
    }
}
