use crate::ports::outbound::{ArtifactKey, ArtifactStore, ArtifactStream, Dataset, Stage};
use crate::risk_assessment::domain::{AdvisoryMode, CollectionMode, PluginId};
use crate::shared::error::CanaryError;
use crate::shared::security::{read_artifact_file, validate_path_component};
use crate::shared::Result;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// FileSystemArtifactStore adapter persisting artifacts under a data directory
///
/// Layout (relative to the root):
/// - `raw/registry/plugins.jsonl`, `raw/registry/plugins.pages.json`
/// - `raw/plugins/{id}.snapshot.{curated,real}.json`
/// - `raw/advisories/{id}.advisories.{sample,real}.jsonl`
/// - `raw/healthscore/scores.json`, `raw/healthscore/plugins/{id}.healthscore.json`
/// - `processed/events/advisories.jsonl`
///
/// Every write goes to a temporary file in the target directory which is
/// then renamed over the target, so readers see either the old or the new
/// artifact.
#[derive(Debug, Clone)]
pub struct FileSystemArtifactStore {
    root: PathBuf,
}

impl FileSystemArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves the file backing an artifact key
    pub fn path_for(&self, key: &ArtifactKey) -> PathBuf {
        match key {
            ArtifactKey::Dataset(dataset) => self.root.join(dataset_path(*dataset)),
            ArtifactKey::Plugin { plugin_id, stage } => self
                .root
                .join(stage_dir(*stage))
                .join(format!("{}{}", plugin_id, stage_suffix(*stage))),
        }
    }

    fn prepare_parent(&self, path: &Path) -> Result<PathBuf> {
        let parent = path.parent().ok_or_else(|| CanaryError::ArtifactWrite {
            path: path.to_path_buf(),
            details: "artifact path has no parent directory".to_string(),
        })?;
        fs::create_dir_all(parent).map_err(|e| CanaryError::ArtifactWrite {
            path: path.to_path_buf(),
            details: format!("Failed to create directory {}: {}", parent.display(), e),
        })?;
        reject_symlink(path)?;
        Ok(parent.to_path_buf())
    }
}

impl ArtifactStore for FileSystemArtifactStore {
    fn exists(&self, key: &ArtifactKey) -> bool {
        let path = self.path_for(key);
        match fs::symlink_metadata(&path) {
            Ok(metadata) => metadata.is_file(),
            Err(_) => false,
        }
    }

    fn get(&self, key: &ArtifactKey) -> Result<Option<String>> {
        read_artifact_file(&self.path_for(key))
    }

    fn put(&self, key: &ArtifactKey, contents: &str) -> Result<()> {
        let path = self.path_for(key);
        let parent = self.prepare_parent(&path)?;

        let write_error = |details: String| CanaryError::ArtifactWrite {
            path: path.clone(),
            details,
        };

        let mut temp = NamedTempFile::new_in(&parent)
            .map_err(|e| write_error(format!("Failed to create temporary file: {}", e)))?;
        temp.write_all(contents.as_bytes())
            .and_then(|_| temp.flush())
            .map_err(|e| write_error(e.to_string()))?;
        temp.persist(&path)
            .map_err(|e| write_error(format!("Failed to replace artifact: {}", e.error)))?;

        debug!(artifact = %key, path = %path.display(), "artifact written");
        Ok(())
    }

    fn plugin_ids(&self, stage: Stage) -> Result<Vec<PluginId>> {
        let dir = self.root.join(stage_dir(stage));
        let suffix = stage_suffix(stage);

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CanaryError::ArtifactRead {
                    path: dir,
                    details: e.to_string(),
                }
                .into())
            }
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CanaryError::ArtifactRead {
                path: dir.clone(),
                details: e.to_string(),
            })?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Some(raw_id) = name.strip_suffix(suffix) else {
                continue;
            };
            match PluginId::new(raw_id) {
                Ok(id) => ids.push(id),
                Err(e) => warn!(file = %name, error = %e, "ignoring artifact with invalid plugin id"),
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn open_stream(&self, key: &ArtifactKey) -> Result<Box<dyn ArtifactStream>> {
        let path = self.path_for(key);
        let parent = self.prepare_parent(&path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("artifact")
            .to_string();
        validate_path_component(&file_name, "artifact file name")?;

        let prefix = format!(".{}.", file_name);
        sweep_stale_partials(&parent, &prefix);
        let temp = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".partial")
            .tempfile_in(&parent)
            .map_err(|e| CanaryError::ArtifactWrite {
                path: path.clone(),
                details: format!("Failed to open partial file: {}", e),
            })?;

        Ok(Box::new(FileArtifactStream {
            temp,
            target: path,
            lines: 0,
        }))
    }
}

/// Streams lines into a `.partial` sibling, renamed over the target on commit.
struct FileArtifactStream {
    temp: NamedTempFile,
    target: PathBuf,
    lines: usize,
}

impl ArtifactStream for FileArtifactStream {
    fn append_line(&mut self, line: &str) -> Result<()> {
        let written = {
            let file = self.temp.as_file_mut();
            file.write_all(line.as_bytes())
                .and_then(|_| file.write_all(b"\n"))
                .and_then(|_| file.flush())
        };
        written.map_err(|e| CanaryError::ArtifactWrite {
            path: self.temp.path().to_path_buf(),
            details: e.to_string(),
        })?;
        self.lines += 1;
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let FileArtifactStream {
            temp,
            target,
            lines,
        } = *self;
        temp.persist(&target).map_err(|e| CanaryError::ArtifactWrite {
            path: target.clone(),
            details: format!("Failed to replace artifact: {}", e.error),
        })?;
        debug!(path = %target.display(), lines, "streamed artifact committed");
        Ok(())
    }
}

/// Removes `.partial` siblings left behind by runs that never committed.
///
/// A stream is only ever open for one invocation at a time, so any
/// existing partial with this prefix is stale.
fn sweep_stale_partials(parent: &Path, prefix: &str) {
    let Ok(entries) = fs::read_dir(parent) else {
        return;
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !(name.starts_with(prefix) && name.ends_with(".partial")) {
            continue;
        }
        match fs::remove_file(entry.path()) {
            Ok(()) => debug!(file = %name, "removed stale partial artifact"),
            Err(e) => warn!(file = %name, error = %e, "could not remove stale partial artifact"),
        }
    }
}

fn dataset_path(dataset: Dataset) -> &'static str {
    match dataset {
        Dataset::Registry => "raw/registry/plugins.jsonl",
        Dataset::RegistryRaw => "raw/registry/plugins.pages.json",
        Dataset::HealthBulk => "raw/healthscore/scores.json",
        Dataset::AdvisoryEvents => "processed/events/advisories.jsonl",
    }
}

fn stage_dir(stage: Stage) -> &'static str {
    match stage {
        Stage::Snapshot(_) => "raw/plugins",
        Stage::Advisories(_) => "raw/advisories",
        Stage::Health => "raw/healthscore/plugins",
    }
}

fn stage_suffix(stage: Stage) -> &'static str {
    match stage {
        Stage::Snapshot(CollectionMode::Curated) => ".snapshot.curated.json",
        Stage::Snapshot(CollectionMode::Real) => ".snapshot.real.json",
        Stage::Advisories(AdvisoryMode::Sample) => ".advisories.sample.jsonl",
        Stage::Advisories(AdvisoryMode::Real) => ".advisories.real.jsonl",
        Stage::Health => ".healthscore.json",
    }
}

fn reject_symlink(path: &Path) -> Result<()> {
    if let Ok(metadata) = fs::symlink_metadata(path) {
        if metadata.is_symlink() {
            return Err(CanaryError::ArtifactWrite {
                path: path.to_path_buf(),
                details: "Security: artifact path is a symbolic link. For security reasons, writing to symbolic links is not allowed.".to_string(),
            }
            .into());
        }
    }
    Ok(())
}
