use crate::risk_assessment::domain::{AdvisoryMode, CollectionMode, PluginId};
use crate::shared::Result;
use std::fmt;

/// Per-plugin artifact kinds.
///
/// Snapshots and advisory records are keyed by mode as well, so curated and
/// real collections never overwrite each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Snapshot(CollectionMode),
    Advisories(AdvisoryMode),
    Health,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Snapshot(mode) => write!(f, "snapshot ({})", mode),
            Stage::Advisories(mode) => write!(f, "advisories ({})", mode),
            Stage::Health => write!(f, "health"),
        }
    }
}

/// Whole-run artifacts not owned by a single plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dataset {
    /// Deduplicated registry spine, one entry per line
    Registry,
    /// Upstream registry pages exactly as received
    RegistryRaw,
    /// Bulk health export exactly as received
    HealthBulk,
    /// Normalized advisory event stream, one event per line
    AdvisoryEvents,
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dataset::Registry => "registry",
            Dataset::RegistryRaw => "raw registry pages",
            Dataset::HealthBulk => "bulk health dataset",
            Dataset::AdvisoryEvents => "advisory events",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKey {
    Plugin { plugin_id: PluginId, stage: Stage },
    Dataset(Dataset),
}

impl ArtifactKey {
    pub fn plugin(plugin_id: &PluginId, stage: Stage) -> Self {
        ArtifactKey::Plugin {
            plugin_id: plugin_id.clone(),
            stage,
        }
    }

    pub fn dataset(dataset: Dataset) -> Self {
        ArtifactKey::Dataset(dataset)
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKey::Plugin { plugin_id, stage } => write!(f, "{} {}", plugin_id, stage),
            ArtifactKey::Dataset(dataset) => write!(f, "{}", dataset),
        }
    }
}

/// Line-oriented writer for large artifacts.
///
/// Lines become visible under the final key only after [`commit`]; a
/// dropped, uncommitted stream leaves the previous artifact in place.
///
/// [`commit`]: ArtifactStream::commit
pub trait ArtifactStream: Send {
    /// Appends one line (without trailing newline) and flushes it
    fn append_line(&mut self, line: &str) -> Result<()>;

    /// Atomically replaces the artifact with the streamed lines
    fn commit(self: Box<Self>) -> Result<()>;
}

/// ArtifactStore port: the pipeline's only persistence seam
///
/// Every collector output and derived dataset is read and written through
/// this trait, keyed by [`ArtifactKey`]. Resumability is built on
/// [`exists`](ArtifactStore::exists).
///
/// Writes are whole-artifact replacements; readers never observe a
/// half-written value.
pub trait ArtifactStore: Send + Sync {
    /// True if an artifact is stored under `key`, even an empty one
    fn exists(&self, key: &ArtifactKey) -> bool;

    /// Reads an artifact, `None` if absent
    fn get(&self, key: &ArtifactKey) -> Result<Option<String>>;

    /// Replaces an artifact
    fn put(&self, key: &ArtifactKey, contents: &str) -> Result<()>;

    /// Ids of all plugins with an artifact for `stage`, sorted
    fn plugin_ids(&self, stage: Stage) -> Result<Vec<PluginId>>;

    /// Opens a streaming writer that replaces `key` on commit
    fn open_stream(&self, key: &ArtifactKey) -> Result<Box<dyn ArtifactStream>>;
}
