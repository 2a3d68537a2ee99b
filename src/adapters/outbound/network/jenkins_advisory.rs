use super::http::HttpClient;
use crate::ports::outbound::AdvisoryPageSource;
use crate::risk_assessment::services::CanonicalUrl;
use crate::shared::Result;
use async_trait::async_trait;
use std::time::Duration;

const ALLOWED_HOSTS: &[&str] = &["www.jenkins.io", "jenkins.io"];

/// Fetches security advisory pages from www.jenkins.io
pub struct JenkinsAdvisoryClient {
    http: HttpClient,
}

impl JenkinsAdvisoryClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(timeout, ALLOWED_HOSTS)?,
        })
    }
}

#[async_trait]
impl AdvisoryPageSource for JenkinsAdvisoryClient {
    async fn fetch_page(&self, url: &CanonicalUrl) -> Result<String> {
        self.http.get_text(url.as_str(), "text/html").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk_assessment::services::canonicalize;

    #[tokio::test]
    async fn test_refuses_non_jenkins_hosts() {
        let client = JenkinsAdvisoryClient::new(Duration::from_secs(1)).unwrap();
        let url = canonicalize("https://example.com/security/advisory/2020-01-01/").unwrap();
        assert!(client.fetch_page(&url).await.is_err());
    }
}
