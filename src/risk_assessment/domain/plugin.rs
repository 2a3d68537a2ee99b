use crate::shared::error::CanaryError;
use crate::shared::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length for plugin identifiers (security limit)
const MAX_PLUGIN_ID_LENGTH: usize = 255;

/// NewType wrapper for a Jenkins plugin identifier (short name).
///
/// The identifier is the join key across every artifact and also becomes a
/// file name component, so only `[A-Za-z0-9._-]` is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PluginId(String);

impl PluginId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        Ok(Self::try_from(id.into())?)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> std::result::Result<(), String> {
        if id.is_empty() {
            return Err("plugin id cannot be empty".to_string());
        }

        if id.len() > MAX_PLUGIN_ID_LENGTH {
            return Err(format!(
                "plugin id is too long ({} bytes). Maximum allowed: {} bytes",
                id.len(),
                MAX_PLUGIN_ID_LENGTH
            ));
        }

        if id == "." || id == ".." {
            return Err("plugin id cannot be a relative directory reference".to_string());
        }

        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return Err(
                "only ASCII alphanumerics, hyphens, underscores and dots are allowed".to_string(),
            );
        }

        Ok(())
    }
}

impl TryFrom<String> for PluginId {
    type Error = CanaryError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match Self::validate(&value) {
            Ok(()) => Ok(Self(value)),
            Err(reason) => Err(CanaryError::InvalidPluginId { value, reason }),
        }
    }
}

impl From<PluginId> for String {
    fn from(id: PluginId) -> Self {
        id.0
    }
}

impl AsRef<str> for PluginId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source selection for registry and snapshot collection.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CollectionMode {
    /// Built-in offline records for the pilot plugin set
    #[default]
    Curated,
    /// Live upstream endpoints
    Real,
}

impl CollectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionMode::Curated => "curated",
            CollectionMode::Real => "real",
        }
    }

    pub fn is_networked(&self) -> bool {
        matches!(self, CollectionMode::Real)
    }
}

impl fmt::Display for CollectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CollectionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "curated" => Ok(CollectionMode::Curated),
            "real" => Ok(CollectionMode::Real),
            _ => Err(format!(
                "Invalid collection mode: {}. Please specify 'curated' or 'real'",
                s
            )),
        }
    }
}

/// Source selection for advisory collection.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryMode {
    /// Canned offline records
    #[default]
    Sample,
    /// Advisory pages discovered from the stored snapshot
    Real,
}

impl AdvisoryMode {
    pub const ALL: [AdvisoryMode; 2] = [AdvisoryMode::Real, AdvisoryMode::Sample];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdvisoryMode::Sample => "sample",
            AdvisoryMode::Real => "real",
        }
    }

    pub fn is_networked(&self) -> bool {
        matches!(self, AdvisoryMode::Real)
    }
}

impl From<CollectionMode> for AdvisoryMode {
    fn from(mode: CollectionMode) -> Self {
        match mode {
            CollectionMode::Curated => AdvisoryMode::Sample,
            CollectionMode::Real => AdvisoryMode::Real,
        }
    }
}

impl fmt::Display for AdvisoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
