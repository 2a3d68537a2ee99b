use crate::risk_assessment::domain::{
    CollectionMode, Dependency, PluginId, PluginSnapshot, SecurityWarning, VersionRange,
};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Tolerant reader for the plugins.jenkins.io per-plugin document.
///
/// Missing or mistyped optional fields degrade to defaults and are noted in
/// `parse_issues`; parsing itself never fails. The payload is kept verbatim.
pub fn parse_plugin_payload(
    plugin_id: &PluginId,
    mode: CollectionMode,
    payload: Value,
    collected_at: DateTime<Utc>,
) -> PluginSnapshot {
    let mut issues = Vec::new();
    let empty = Map::new();
    let doc = match payload.as_object() {
        Some(doc) => doc,
        None => {
            issues.push("payload is not a JSON object".to_string());
            &empty
        }
    };

    let required_core = optional_string(doc, "requiredCore", &mut issues);
    let current_version = optional_string(doc, "version", &mut issues);
    let release_timestamp = optional_string(doc, "releaseTimestamp", &mut issues).and_then(|ts| {
        match DateTime::parse_from_rfc3339(&ts) {
            Ok(parsed) => Some(parsed.with_timezone(&Utc)),
            Err(e) => {
                issues.push(format!("releaseTimestamp {:?} is not RFC 3339: {}", ts, e));
                None
            }
        }
    });
    let scm_url = parse_scm(doc.get("scm"), &mut issues);
    let dependencies = parse_list(doc, "dependencies", &mut issues, parse_dependency);
    let security_warnings = parse_list(doc, "securityWarnings", &mut issues, parse_warning);

    PluginSnapshot {
        plugin_id: plugin_id.clone(),
        mode,
        collected_at,
        required_core,
        current_version,
        release_timestamp,
        scm_url,
        dependencies,
        security_warnings,
        raw_payload: payload,
        parse_issues: issues,
    }
}

fn optional_string(doc: &Map<String, Value>, key: &str, issues: &mut Vec<String>) -> Option<String> {
    match doc.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Some(other) => {
            issues.push(format!("{} has unexpected type {}", key, type_name(other)));
            None
        }
    }
}

fn parse_scm(value: Option<&Value>, issues: &mut Vec<String>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Object(scm)) => scm.get("link").and_then(Value::as_str).map(str::to_string),
        Some(other) => {
            issues.push(format!("scm has unexpected type {}", type_name(other)));
            None
        }
    }
}

fn parse_list<T>(
    doc: &Map<String, Value>,
    key: &str,
    issues: &mut Vec<String>,
    parse_item: fn(&Value) -> Option<T>,
) -> Vec<T> {
    let items = match doc.get(key) {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            issues.push(format!("{} has unexpected type {}", key, type_name(other)));
            return Vec::new();
        }
    };

    let mut parsed = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match parse_item(item) {
            Some(value) => parsed.push(value),
            None => issues.push(format!("{}[{}] skipped: unusable entry", key, index)),
        }
    }
    parsed
}

fn parse_dependency(item: &Value) -> Option<Dependency> {
    let name = item.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }
    Some(Dependency {
        name: name.to_string(),
        version: item.get("version").and_then(Value::as_str).map(str::to_string),
        optional: item.get("optional").and_then(Value::as_bool).unwrap_or(false),
    })
}

fn parse_warning(item: &Value) -> Option<SecurityWarning> {
    let obj = item.as_object()?;
    let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);
    let versions = obj
        .get("versions")
        .and_then(Value::as_array)
        .map(|ranges| {
            ranges
                .iter()
                .map(|range| VersionRange {
                    first_version: range
                        .get("firstVersion")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    last_version: range
                        .get("lastVersion")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default();

    Some(SecurityWarning {
        id: text("id"),
        url: text("url"),
        active: obj.get("active").and_then(Value::as_bool).unwrap_or(false),
        message: text("message"),
        versions,
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(payload: Value) -> PluginSnapshot {
        parse_plugin_payload(
            &PluginId::new("cucumber-reports").unwrap(),
            CollectionMode::Real,
            payload,
            Utc::now(),
        )
    }

    #[test]
    fn test_parse_full_payload() {
        let snapshot = parse(json!({
            "name": "cucumber-reports",
            "version": "5.8.1",
            "requiredCore": "2.361.4",
            "releaseTimestamp": "2024-03-01T12:00:00.00Z",
            "scm": {"link": "https://github.com/jenkinsci/cucumber-reports-plugin"},
            "dependencies": [
                {"name": "structs", "version": "1.20", "optional": false},
                {"name": "matrix-project", "version": "1.14", "optional": true}
            ],
            "securityWarnings": [{
                "id": "SECURITY-309",
                "url": "https://jenkins.io/security/advisory/2016-07-27/",
                "active": false,
                "message": "Stored XSS",
                "versions": [{"lastVersion": "2.5.1"}]
            }]
        }));

        assert!(snapshot.parse_issues.is_empty());
        assert_eq!(snapshot.required_core.as_deref(), Some("2.361.4"));
        assert_eq!(snapshot.current_version.as_deref(), Some("5.8.1"));
        assert_eq!(
            snapshot.scm_url.as_deref(),
            Some("https://github.com/jenkinsci/cucumber-reports-plugin")
        );
        assert_eq!(snapshot.dependencies.len(), 2);
        assert!(snapshot.dependencies[1].optional);
        assert_eq!(snapshot.security_warnings[0].id.as_deref(), Some("SECURITY-309"));
        assert_eq!(
            snapshot.security_warnings[0].versions[0].last_version.as_deref(),
            Some("2.5.1")
        );
        assert!(snapshot.release_timestamp.is_some());
        assert_eq!(snapshot.raw_payload["name"], "cucumber-reports");
    }

    #[test]
    fn test_parse_scm_as_string() {
        let snapshot = parse(json!({"scm": "https://github.com/jenkinsci/git-plugin"}));
        assert_eq!(
            snapshot.scm_url.as_deref(),
            Some("https://github.com/jenkinsci/git-plugin")
        );
    }

    #[test]
    fn test_missing_fields_degrade_without_issues() {
        let snapshot = parse(json!({}));
        assert!(snapshot.required_core.is_none());
        assert!(snapshot.dependencies.is_empty());
        assert!(snapshot.security_warnings.is_empty());
        assert!(snapshot.parse_issues.is_empty());
    }

    #[test]
    fn test_mistyped_fields_are_recorded() {
        let snapshot = parse(json!({
            "requiredCore": 2.4,
            "releaseTimestamp": "yesterday",
            "dependencies": "structs",
            "securityWarnings": [{"id": "SECURITY-1", "active": true}, "junk"]
        }));
        assert!(snapshot.required_core.is_none());
        assert!(snapshot.release_timestamp.is_none());
        assert!(snapshot.dependencies.is_empty());
        assert_eq!(snapshot.security_warnings.len(), 1);
        assert_eq!(snapshot.active_warning_count(), 1);
        assert_eq!(snapshot.parse_issues.len(), 4);
    }

    #[test]
    fn test_non_object_payload() {
        let snapshot = parse(json!(["not", "an", "object"]));
        assert_eq!(snapshot.parse_issues, vec!["payload is not a JSON object"]);
    }
}
