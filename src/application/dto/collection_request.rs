use crate::application::pacing::DEFAULT_REQUEST_DELAY_MS;
use crate::risk_assessment::domain::{AdvisoryMode, CollectionMode, PluginId};
use crate::risk_assessment::services::registry_spine::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::shared::error::CanaryError;
use crate::shared::Result;
use chrono::NaiveDate;
use std::time::Duration;

/// RegistryRequest - Request DTO for the registry collection use case
#[derive(Debug, Clone)]
pub struct RegistryRequest {
    pub mode: CollectionMode,
    /// Plugins requested per upstream page (1..=5000)
    pub page_size: usize,
    /// Stop once this many unique plugins were collected
    pub max_plugins: Option<usize>,
    /// Also persist the upstream pages as received
    pub save_raw: bool,
    /// Minimum gap between successive page requests
    pub request_delay: Duration,
}

impl RegistryRequest {
    pub fn new(mode: CollectionMode) -> Self {
        Self {
            mode,
            page_size: DEFAULT_PAGE_SIZE,
            max_plugins: None,
            save_raw: false,
            request_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(CanaryError::Validation {
                message: format!(
                    "page size must be between 1 and {}, got {}",
                    MAX_PAGE_SIZE, self.page_size
                ),
            }
            .into());
        }
        if self.max_plugins == Some(0) {
            return Err(CanaryError::Validation {
                message: "max plugins must be at least 1".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// SnapshotRequest - Request DTO for collecting one plugin snapshot
#[derive(Debug, Clone)]
pub struct SnapshotRequest {
    pub plugin_id: PluginId,
    pub mode: CollectionMode,
}

impl SnapshotRequest {
    pub fn new(plugin_id: PluginId, mode: CollectionMode) -> Self {
        Self { plugin_id, mode }
    }
}

/// AdvisoryRequest - Request DTO for collecting one plugin's advisories
#[derive(Debug, Clone)]
pub struct AdvisoryRequest {
    pub plugin_id: PluginId,
    pub mode: AdvisoryMode,
}

impl AdvisoryRequest {
    pub fn new(plugin_id: PluginId, mode: AdvisoryMode) -> Self {
        Self { plugin_id, mode }
    }
}

/// HealthRequest - Request DTO for splitting the bulk health dataset
#[derive(Debug, Clone, Default)]
pub struct HealthRequest {
    /// Refetch the bulk export and rewrite existing per-plugin artifacts
    pub overwrite: bool,
}

/// ScoreRequest - Request DTO for scoring one plugin
#[derive(Debug, Clone)]
pub struct ScoreRequest {
    pub plugin_id: PluginId,
    /// Reference date for every age-based feature
    pub as_of: NaiveDate,
}

impl ScoreRequest {
    pub fn new(plugin_id: PluginId, as_of: NaiveDate) -> Self {
        Self { plugin_id, as_of }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_request_defaults() {
        let request = RegistryRequest::new(CollectionMode::Real);
        assert_eq!(request.page_size, 500);
        assert!(request.max_plugins.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_registry_request_rejects_bad_page_size() {
        let mut request = RegistryRequest::new(CollectionMode::Real);
        request.page_size = 0;
        assert!(request.validate().is_err());
        request.page_size = 5001;
        assert!(request.validate().is_err());
        request.page_size = 5000;
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_registry_request_rejects_zero_cap() {
        let mut request = RegistryRequest::new(CollectionMode::Curated);
        request.max_plugins = Some(0);
        assert!(request.validate().is_err());
    }
}
