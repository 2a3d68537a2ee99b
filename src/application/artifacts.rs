//! Typed reads and writes on top of the string-valued [`ArtifactStore`].

use crate::ports::outbound::{ArtifactKey, ArtifactStore, Dataset, Stage};
use crate::risk_assessment::domain::{
    AdvisoryEvent, AdvisoryMode, AdvisoryRecord, CollectionMode, HealthDataset, HealthRecord,
    PluginId, PluginSnapshot, RegistryEntry,
};
use crate::risk_assessment::services::parse_health_dataset;
use crate::shared::error::CanaryError;
use crate::shared::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// JSONL lines read back from an artifact
#[derive(Debug)]
pub struct JsonLines<T> {
    pub items: Vec<T>,
    /// Lines that were not valid JSON for `T`
    pub malformed: usize,
}

impl<T> Default for JsonLines<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            malformed: 0,
        }
    }
}

/// Reads and deserializes a JSON artifact; `None` when absent.
pub fn read_json<T, ST>(store: &ST, key: &ArtifactKey) -> Result<Option<T>>
where
    T: DeserializeOwned,
    ST: ArtifactStore + ?Sized,
{
    let Some(contents) = store.get(key)? else {
        return Ok(None);
    };
    let value = serde_json::from_str(&contents).map_err(|e| CanaryError::Parse {
        source_name: key.to_string(),
        details: e.to_string(),
    })?;
    Ok(Some(value))
}

/// Serializes `value` as pretty JSON and replaces the artifact
pub fn write_json<T, ST>(store: &ST, key: &ArtifactKey, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    ST: ArtifactStore + ?Sized,
{
    let mut contents = serde_json::to_string_pretty(value)?;
    contents.push('\n');
    store.put(key, &contents)
}

/// One compact JSON document per line, each terminated by `\n`
pub fn to_jsonl<T: Serialize>(items: &[T]) -> Result<String> {
    let mut out = String::new();
    for item in items {
        out.push_str(&serde_json::to_string(item)?);
        out.push('\n');
    }
    Ok(out)
}

/// Parses JSONL, skipping blank lines and warning about malformed ones.
pub fn parse_jsonl<T: DeserializeOwned>(contents: &str, source: &str) -> JsonLines<T> {
    let mut parsed = JsonLines::default();
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(item) => parsed.items.push(item),
            Err(e) => {
                warn!(artifact = source, line = index + 1, error = %e, "skipping malformed line");
                parsed.malformed += 1;
            }
        }
    }
    parsed
}

/// Reads a JSONL artifact; an absent artifact reads as empty.
pub fn read_jsonl<T, ST>(store: &ST, key: &ArtifactKey) -> Result<JsonLines<T>>
where
    T: DeserializeOwned,
    ST: ArtifactStore + ?Sized,
{
    Ok(store
        .get(key)?
        .map(|contents| parse_jsonl(&contents, &key.to_string()))
        .unwrap_or_default())
}

/// Loads the registry spine written by `collect registry`.
pub fn load_registry<ST>(store: &ST) -> Result<Vec<RegistryEntry>>
where
    ST: ArtifactStore + ?Sized,
{
    let key = ArtifactKey::dataset(Dataset::Registry);
    if !store.exists(&key) {
        return Err(CanaryError::MissingDataset {
            dataset: Dataset::Registry.to_string(),
            hint: "Run `canary collect registry` first".to_string(),
        }
        .into());
    }
    Ok(read_jsonl(store, &key)?.items)
}

/// First stored snapshot among `modes`, in order of preference
pub fn load_snapshot<ST>(
    store: &ST,
    plugin_id: &PluginId,
    modes: &[CollectionMode],
) -> Result<Option<PluginSnapshot>>
where
    ST: ArtifactStore + ?Sized,
{
    for mode in modes {
        let key = ArtifactKey::plugin(plugin_id, Stage::Snapshot(*mode));
        if let Some(snapshot) = read_json(store, &key)? {
            return Ok(Some(snapshot));
        }
    }
    Ok(None)
}

/// Advisory records of one plugin across both advisory modes
pub fn load_advisory_records<ST>(store: &ST, plugin_id: &PluginId) -> Result<Vec<AdvisoryRecord>>
where
    ST: ArtifactStore + ?Sized,
{
    let mut records = Vec::new();
    for mode in AdvisoryMode::ALL {
        let key = ArtifactKey::plugin(plugin_id, Stage::Advisories(mode));
        records.extend(read_jsonl::<AdvisoryRecord, _>(store, &key)?.items);
    }
    Ok(records)
}

/// Stored event stream, or `None` when it was never built
pub fn load_events<ST>(store: &ST) -> Result<Option<Vec<AdvisoryEvent>>>
where
    ST: ArtifactStore + ?Sized,
{
    let key = ArtifactKey::dataset(Dataset::AdvisoryEvents);
    if !store.exists(&key) {
        return Ok(None);
    }
    Ok(Some(read_jsonl(store, &key)?.items))
}

/// Per-plugin health artifact, else the plugin's entry in the bulk dataset
pub fn load_health<ST>(store: &ST, plugin_id: &PluginId) -> Result<Option<HealthRecord>>
where
    ST: ArtifactStore + ?Sized,
{
    let key = ArtifactKey::plugin(plugin_id, Stage::Health);
    if let Some(record) = read_json::<HealthRecord, _>(store, &key)? {
        return Ok(Some(record));
    }
    Ok(load_bulk_health(store)?.and_then(|dataset| dataset.records.get(plugin_id).cloned()))
}

/// Parses the stored bulk health export, if any
pub fn load_bulk_health<ST>(store: &ST) -> Result<Option<HealthDataset>>
where
    ST: ArtifactStore + ?Sized,
{
    let key = ArtifactKey::dataset(Dataset::HealthBulk);
    Ok(read_json::<serde_json::Value, _>(store, &key)?.map(|payload| parse_health_dataset(&payload)))
}
