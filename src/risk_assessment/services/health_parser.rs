use crate::risk_assessment::domain::{HealthDataset, HealthRecord, PluginId};
use serde_json::{Map, Value};

const CONTAINER_KEYS: &[&str] = &["plugins", "scores", "data", "items"];
const ID_KEYS: &[&str] = &["plugin_id", "pluginId", "id", "plugin", "name"];
const VALUE_KEYS: &[&str] = &["value", "score", "healthScore", "health_score"];
const DATE_KEYS: &[&str] = &["date", "as_of", "asOf", "timestamp"];

/// Splits the bulk health export into per-plugin records.
///
/// The export's shape has changed over time, so three layouts are accepted:
/// a list of records, an object holding a list or map under one of
/// `plugins`/`scores`/`data`/`items`, or a direct `id -> record` map.
pub fn parse_health_dataset(payload: &Value) -> HealthDataset {
    let mut dataset = HealthDataset::default();

    for (fallback_id, record) in candidate_records(payload) {
        let Some(record) = record.as_object() else {
            dataset.skipped += 1;
            continue;
        };
        match health_record(record, fallback_id) {
            Some(parsed) => {
                dataset.records.insert(parsed.plugin_id.clone(), parsed);
            }
            None => dataset.skipped += 1,
        }
    }

    dataset
}

fn candidate_records(payload: &Value) -> Vec<(Option<&str>, &Value)> {
    match payload {
        Value::Array(items) => items.iter().map(|item| (None, item)).collect(),
        Value::Object(map) => {
            for key in CONTAINER_KEYS {
                match map.get(*key) {
                    Some(Value::Array(items)) => {
                        return items.iter().map(|item| (None, item)).collect();
                    }
                    Some(Value::Object(inner)) => return keyed_records(inner),
                    _ => {}
                }
            }
            keyed_records(map)
        }
        _ => Vec::new(),
    }
}

fn keyed_records(map: &Map<String, Value>) -> Vec<(Option<&str>, &Value)> {
    map.iter()
        .map(|(key, value)| (Some(key.as_str()), value))
        .collect()
}

fn health_record(record: &Map<String, Value>, fallback_id: Option<&str>) -> Option<HealthRecord> {
    let id = record_id(record).or(fallback_id)?;
    let plugin_id = PluginId::new(id).ok()?;

    let value = VALUE_KEYS.iter().find_map(|key| match record.get(*key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })?;
    if !value.is_finite() {
        return None;
    }

    let as_of = DATE_KEYS.iter().find_map(|key| match record.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    });

    Some(HealthRecord {
        plugin_id,
        value,
        as_of,
    })
}

fn record_id(record: &Map<String, Value>) -> Option<&str> {
    let direct = ID_KEYS
        .iter()
        .filter_map(|key| record.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|id| !id.is_empty());
    if direct.is_some() {
        return direct;
    }

    let nested = record.get("plugin")?.as_object()?;
    ["id", "name"]
        .iter()
        .filter_map(|key| nested.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|id| !id.is_empty())
}
