use crate::risk_assessment::domain::{IntegrityWarning, PluginId, RegistryEntry};
use crate::shared::error::CanaryError;
use crate::shared::Result;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

/// Default number of plugins requested per registry page
pub const DEFAULT_PAGE_SIZE: usize = 500;
/// Largest page size the registry API accepts
pub const MAX_PAGE_SIZE: usize = 5000;
/// Hard stop for runaway pagination
pub const MAX_REGISTRY_PAGES: usize = 1000;

/// Keys probed, in order, for a plugin's id in a registry item
const ID_KEYS: &[&str] = &["name", "pluginId", "id", "artifactId"];

/// One page of the registry listing, in either of its two shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryPage {
    pub items: Vec<Value>,
    pub total: Option<usize>,
    /// Absolute https link to the next page, when upstream provides one
    pub next: Option<String>,
}

impl RegistryPage {
    /// Accepts `{ "plugins": [...], "total": N, "next": url }` or a bare list.
    pub fn from_payload(payload: &Value, source: &str) -> Result<Self> {
        match payload {
            Value::Array(items) => Ok(Self {
                items: items.clone(),
                total: None,
                next: None,
            }),
            Value::Object(map) => {
                let items = map
                    .get("plugins")
                    .and_then(Value::as_array)
                    .ok_or_else(|| CanaryError::Parse {
                        source_name: source.to_string(),
                        details: "registry page object has no 'plugins' list".to_string(),
                    })?
                    .clone();
                let total = map.get("total").and_then(|t| match t {
                    Value::Number(n) => n.as_u64().map(|n| n as usize),
                    Value::String(s) => s.trim().parse().ok(),
                    _ => None,
                });
                let next = map
                    .get("next")
                    .and_then(Value::as_str)
                    .filter(|n| n.starts_with("https://"))
                    .map(str::to_string);
                Ok(Self { items, total, next })
            }
            other => Err(CanaryError::Parse {
                source_name: source.to_string(),
                details: format!("unexpected registry payload type: {}", json_type(other)),
            }
            .into()),
        }
    }

    /// True when no further offset-based page should be requested.
    ///
    /// A `next` link overrides this; the caller follows it verbatim.
    pub fn is_last(&self, offset: usize, page_size: usize) -> bool {
        if self.items.is_empty() {
            return true;
        }
        match self.total {
            Some(total) => offset + self.items.len() >= total,
            None => self.items.len() < page_size,
        }
    }
}

/// First non-empty string among `name`, `pluginId`, `id`, `artifactId`.
pub fn plugin_id_of(item: &Value) -> Option<&str> {
    ID_KEYS
        .iter()
        .filter_map(|key| item.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|id| !id.is_empty())
}

/// Builds a registry entry from one upstream item.
///
/// Fails when the item carries no id, or the id is not a valid [`PluginId`].
pub fn entry_from_item(item: &Value, collected_at: DateTime<Utc>) -> Result<RegistryEntry> {
    let raw_id = plugin_id_of(item).ok_or_else(|| CanaryError::Validation {
        message: "registry item has no plugin id".to_string(),
    })?;
    let mut entry = RegistryEntry::new(PluginId::new(raw_id)?, collected_at);

    entry.title = item
        .get("title")
        .and_then(Value::as_str)
        .map(str::to_string);
    entry.excerpt = item
        .get("excerpt")
        .and_then(Value::as_str)
        .map(str::to_string);
    entry.labels = item
        .get("labels")
        .and_then(Value::as_array)
        .map(|labels| {
            labels
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(entry)
}

/// Deduplicated registry spine.
///
/// The first occurrence of an id wins; later ones are only counted so they
/// can be reported as [`IntegrityWarning`]s.
#[derive(Debug, Default)]
pub struct RegistrySpine {
    entries: Vec<RegistryEntry>,
    occurrences: BTreeMap<PluginId, usize>,
}

impl RegistrySpine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the entry was new and kept
    pub fn admit(&mut self, entry: RegistryEntry) -> bool {
        let count = self.occurrences.entry(entry.plugin_id.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// One warning per duplicated id, sorted by id
    pub fn integrity_warnings(&self) -> Vec<IntegrityWarning> {
        self.occurrences
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(plugin_id, count)| IntegrityWarning {
                plugin_id: plugin_id.clone(),
                occurrences: *count,
            })
            .collect()
    }

    pub fn into_parts(self) -> (Vec<RegistryEntry>, Vec<IntegrityWarning>) {
        let warnings = self.integrity_warnings();
        (self.entries, warnings)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
