use crate::risk_assessment::domain::{
    AdvisoryEvent, AdvisoryRecord, EventKey, Severity, Vulnerability,
};
use std::collections::{BTreeMap, BTreeSet};

const PREFERRED_SOURCE_HOST: &str = "https://www.jenkins.io/";

/// Collapses advisory records into one event per (plugin, advisory, CVE).
///
/// Every merge step is commutative (min, max, union, or, sum), so the
/// result does not depend on the order records are read in, and the
/// output is sorted by [`EventKey`].
pub struct EventNormalizer;

impl EventNormalizer {
    pub fn normalize<'a, I>(records: I) -> Vec<AdvisoryEvent>
    where
        I: IntoIterator<Item = &'a AdvisoryRecord>,
    {
        let mut events: BTreeMap<EventKey, AdvisoryEvent> = BTreeMap::new();

        for record in records {
            if record.vulnerabilities.is_empty() {
                Self::fold(&mut events, record, None);
            } else {
                for vulnerability in &record.vulnerabilities {
                    Self::fold(&mut events, record, Some(vulnerability));
                }
            }
        }

        events.into_values().collect()
    }

    fn fold(
        events: &mut BTreeMap<EventKey, AdvisoryEvent>,
        record: &AdvisoryRecord,
        vulnerability: Option<&Vulnerability>,
    ) {
        let key = EventKey {
            plugin_id: record.plugin_id.clone(),
            advisory_id: record.advisory_id.trim().to_string(),
            cve_id: vulnerability.and_then(|v| normalize_cve(v.cve_id.as_deref())),
        };

        let event = events.entry(key.clone()).or_insert_with(|| AdvisoryEvent {
            key,
            published_date: None,
            cvss_score: None,
            severity: None,
            title: None,
            source_url: record.source_url.clone(),
            security_warning_ids: BTreeSet::new(),
            active_security_warning: false,
            modes: BTreeSet::new(),
            merged_from_count: 0,
        });

        event.published_date = min_option(event.published_date, record.published_date);
        event.source_url = preferred_source_url(&event.source_url, &record.source_url);
        event.title = min_title(event.title.take(), record.title.as_deref());
        event.active_security_warning |= record.active_security_warning;
        event.modes.insert(record.mode);
        event.merged_from_count += 1;

        let warning_ids: Vec<&String> = match vulnerability.and_then(|v| v.security_warning_id.as_ref()) {
            Some(id) => vec![id],
            None => record.security_warning_ids.iter().collect(),
        };
        for id in warning_ids {
            let id = id.trim();
            if !id.is_empty() {
                event.security_warning_ids.insert(id.to_string());
            }
        }

        if let Some(vulnerability) = vulnerability {
            let score = vulnerability.base_score().map(|s| s.value());
            event.cvss_score = match (event.cvss_score, score) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            };
            event.severity = max_severity(event.severity, vulnerability.effective_severity());
        }
    }
}

fn normalize_cve(cve: Option<&str>) -> Option<String> {
    cve.map(|c| c.trim().to_ascii_uppercase())
        .filter(|c| !c.is_empty())
}

fn min_option<T: Ord>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn max_severity(a: Option<Severity>, b: Option<Severity>) -> Option<Severity> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

fn min_title(current: Option<String>, candidate: Option<&str>) -> Option<String> {
    let candidate = candidate.map(str::trim).filter(|t| !t.is_empty());
    match (current, candidate) {
        (Some(current), Some(candidate)) if candidate < current.as_str() => {
            Some(candidate.to_string())
        }
        (Some(current), _) => Some(current),
        (None, candidate) => candidate.map(str::to_string),
    }
}

/// `www.jenkins.io` URLs win; ties break lexicographically.
fn preferred_source_url(current: &str, candidate: &str) -> String {
    let rank = |url: &str| (!url.starts_with(PREFERRED_SOURCE_HOST), url.to_string());
    if rank(candidate) < rank(current) {
        candidate.to_string()
    } else {
        current.to_string()
    }
}
