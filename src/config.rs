//! Configuration file support for plugin-canary.
//!
//! Provides YAML-based configuration through `canary.config.yml` files,
//! including data structures, file loading, validation, and resolution of
//! built-in defaults.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::adapters::outbound::network::DEFAULT_TIMEOUT_SECS;
use crate::application::dto::EnrichmentStage;
use crate::application::pacing::DEFAULT_REQUEST_DELAY_MS;
use crate::risk_assessment::services::registry_spine::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::risk_assessment::services::ScoringConfig;
use crate::shared::Result;

pub const CONFIG_FILENAME: &str = "canary.config.yml";
pub const DEFAULT_DATA_DIR: &str = "data";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub data_dir: Option<PathBuf>,
    pub request_delay_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub registry_page_size: Option<usize>,
    pub max_plugins: Option<usize>,
    pub overwrite: Option<bool>,
    pub stages: Option<Vec<String>>,
    /// Scoring weight overrides; unnamed weights keep their defaults
    pub scoring: Option<ScoringConfig>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

/// Effective settings after applying the config file over built-in defaults.
///
/// Command-line flags are applied on top by the caller.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub request_delay_ms: u64,
    pub timeout_secs: u64,
    pub registry_page_size: usize,
    pub max_plugins: Option<usize>,
    pub overwrite: bool,
    pub stages: Vec<EnrichmentStage>,
    pub scoring: ScoringConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            registry_page_size: DEFAULT_PAGE_SIZE,
            max_plugins: None,
            overwrite: false,
            stages: EnrichmentStage::ALL.to_vec(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl Settings {
    /// Resolves settings from an already validated config file.
    pub fn from_config(config: Option<ConfigFile>) -> Result<Self> {
        let defaults = Settings::default();
        let Some(config) = config else {
            return Ok(defaults);
        };

        let stages = match config.stages {
            Some(names) => parse_stages(&names)?,
            None => defaults.stages,
        };

        Ok(Self {
            data_dir: config.data_dir.unwrap_or(defaults.data_dir),
            request_delay_ms: config.request_delay_ms.unwrap_or(defaults.request_delay_ms),
            timeout_secs: config.timeout_secs.unwrap_or(defaults.timeout_secs),
            registry_page_size: config
                .registry_page_size
                .unwrap_or(defaults.registry_page_size),
            max_plugins: config.max_plugins,
            overwrite: config.overwrite.unwrap_or(defaults.overwrite),
            stages,
            scoring: config.scoring.unwrap_or(defaults.scoring),
        })
    }
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Parses stage names such as `snapshot,advisories`, rejecting unknown names.
pub fn parse_stages<S: AsRef<str>>(names: &[S]) -> Result<Vec<EnrichmentStage>> {
    let mut stages = Vec::new();
    for name in names {
        match name.as_ref().parse::<EnrichmentStage>() {
            Ok(stage) => {
                if !stages.contains(&stage) {
                    stages.push(stage);
                }
            }
            Err(message) => bail!("{}", message),
        }
    }
    if stages.is_empty() {
        bail!("Invalid config: stages must name at least one stage.\n\n💡 Hint: Use any of 'snapshot', 'advisories', 'health'.");
    }
    Ok(stages)
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    if let Some(page_size) = config.registry_page_size {
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            bail!(
                "Invalid config: registry_page_size must be between 1 and {}, got {}.\n\n\
                 💡 Hint: The plugin site rejects larger pages; {} is a good default.",
                MAX_PAGE_SIZE,
                page_size,
                DEFAULT_PAGE_SIZE
            );
        }
    }
    if config.timeout_secs == Some(0) {
        bail!(
            "Invalid config: timeout_secs must be at least 1.\n\n\
             💡 Hint: Remove the field to use the default of {} seconds.",
            DEFAULT_TIMEOUT_SECS
        );
    }
    if config.max_plugins == Some(0) {
        bail!("Invalid config: max_plugins must be at least 1.\n\n💡 Hint: Remove the field to process every plugin.");
    }
    if let Some(ref stages) = config.stages {
        parse_stages(stages).context("Invalid config: stages")?;
    }
    if let Some(ref scoring) = config.scoring {
        if let Some(field) = scoring.non_finite_field() {
            bail!("Invalid config: scoring.{} must be a finite number.", field);
        }
        if scoring.recency_half_life_days <= 0.0 {
            bail!("Invalid config: scoring.recency_half_life_days must be positive.");
        }
    }
    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    for key in config.unknown_fields.keys() {
        warn!(field = %key, "unknown config field will be ignored");
    }
}
