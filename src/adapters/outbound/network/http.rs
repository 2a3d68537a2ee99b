use crate::shared::error::CanaryError;
use crate::shared::Result;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default request timeout for upstream calls
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Thin wrapper around `reqwest::Client` that only talks to allow-listed
/// https hosts and maps failures to [`CanaryError::Transport`].
///
/// Requests are never retried; the batch orchestrator's resume policy
/// picks up failed items on the next run.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    allowed_hosts: &'static [&'static str],
}

impl HttpClient {
    pub fn new(timeout: Duration, allowed_hosts: &'static [&'static str]) -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("plugin-canary/{}", version);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            allowed_hosts,
        })
    }

    /// Security: refuses anything but https URLs on an allow-listed host
    pub fn check_url(&self, url: &str) -> Result<Url> {
        let parsed = Url::parse(url).map_err(|e| CanaryError::Validation {
            message: format!("Refusing to fetch malformed URL {}: {}", url, e),
        })?;

        let host_allowed = parsed
            .host_str()
            .map(|host| self.allowed_hosts.contains(&host))
            .unwrap_or(false);
        if parsed.scheme() != "https" || !host_allowed || parsed.port().is_some() {
            return Err(CanaryError::Validation {
                message: format!("Refusing to fetch unexpected URL: {}", url),
            }
            .into());
        }
        Ok(parsed)
    }

    /// GETs a URL and returns the body as text
    ///
    /// # Errors
    /// - [`CanaryError::Validation`] if the URL is not allow-listed
    /// - [`CanaryError::Transport`] for network failures and non-success
    ///   statuses (`status` is set for the latter)
    pub async fn get_text(&self, url: &str, accept: &str) -> Result<String> {
        let checked = self.check_url(url)?;
        debug!(url = %checked, "GET");

        let response = self
            .client
            .get(checked)
            .header(reqwest::header::ACCEPT, accept)
            .send()
            .await
            .map_err(|e| CanaryError::Transport {
                url: url.to_string(),
                status: None,
                details: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CanaryError::Transport {
                url: url.to_string(),
                status: Some(status.as_u16()),
                details: format!("upstream returned status {}", status),
            }
            .into());
        }

        response.text().await.map_err(|e| {
            CanaryError::Transport {
                url: url.to_string(),
                status: Some(status.as_u16()),
                details: format!("Failed to read response body: {}", e),
            }
            .into()
        })
    }

    /// GETs a URL and parses the body as JSON
    pub async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        let body = self.get_text(url, "application/json").await?;
        serde_json::from_str(&body).map_err(|e| {
            CanaryError::Parse {
                source_name: url.to_string(),
                details: format!("invalid JSON: {}", e),
            }
            .into()
        })
    }
}
