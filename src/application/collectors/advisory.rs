use crate::application::pacing::RequestPacer;
use crate::ports::outbound::AdvisoryPageSource;
use crate::risk_assessment::domain::{
    AdvisoryCollection, AdvisoryMode, AdvisoryRecord, Cvss, PluginId, PluginSnapshot,
    SecurityWarning, Severity, SeveritySource, SourceFailure, SourceFailureKind, Vulnerability,
};
use crate::risk_assessment::services::{
    canonicalize, cvss, AdvisoryPageParser, AdvisorySection, CanonicalUrl,
};
use crate::shared::error::{transport_status, CanaryError};
use crate::shared::Result;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Only pages on this host are treated as advisories
const ADVISORY_HOST: &str = "www.jenkins.io";

/// AdvisoryCollector resolves security warnings into advisory records.
///
/// In real mode every advisory page is fetched once per plugin, and a
/// failing page never stops its siblings: failures are returned next to
/// whatever could be extracted.
pub struct AdvisoryCollector<S> {
    source: S,
    parser: AdvisoryPageParser,
}

impl<S: AdvisoryPageSource> AdvisoryCollector<S> {
    pub fn new(source: S) -> Result<Self> {
        Ok(Self {
            source,
            parser: AdvisoryPageParser::new()?,
        })
    }

    /// # Errors
    /// [`CanaryError::MissingArtifact`] in real mode when `snapshot` is
    /// `None`. Per-page problems are reported in
    /// [`AdvisoryCollection::failures`] instead.
    pub async fn fetch(
        &self,
        plugin_id: &PluginId,
        mode: AdvisoryMode,
        snapshot: Option<&PluginSnapshot>,
        pacer: &RequestPacer,
    ) -> Result<AdvisoryCollection> {
        match mode {
            AdvisoryMode::Sample => Ok(AdvisoryCollection {
                records: sample_records(plugin_id, Utc::now()),
                failures: Vec::new(),
            }),
            AdvisoryMode::Real => {
                let snapshot = snapshot.ok_or_else(|| CanaryError::MissingArtifact {
                    plugin_id: plugin_id.to_string(),
                    artifact: "snapshot".to_string(),
                    hint: format!(
                        "Run `canary collect plugin --id {} --real` first",
                        plugin_id
                    ),
                })?;
                Ok(self.collect_real(plugin_id, snapshot, pacer).await)
            }
        }
    }

    async fn collect_real(
        &self,
        plugin_id: &PluginId,
        snapshot: &PluginSnapshot,
        pacer: &RequestPacer,
    ) -> AdvisoryCollection {
        let collected_at = Utc::now();
        let (groups, mut failures) = group_warnings(&snapshot.security_warnings);
        let mut records = Vec::with_capacity(groups.len());

        for (page_url, warnings) in groups {
            pacer.wait().await;
            match self.source.fetch_page(&page_url).await {
                Ok(html) => {
                    records.push(self.build_record(
                        plugin_id,
                        &page_url,
                        &html,
                        &warnings,
                        collected_at,
                    ));
                }
                Err(e) => {
                    let kind = if transport_status(&e) == Some(404) {
                        SourceFailureKind::NotFound
                    } else {
                        SourceFailureKind::Transport
                    };
                    warn!(plugin_id = %plugin_id, url = %page_url, error = %e, "advisory page unavailable");
                    failures.push(SourceFailure {
                        source: page_url.to_string(),
                        kind,
                        detail: first_line(&e.to_string()),
                    });
                }
            }
        }

        AdvisoryCollection { records, failures }
    }

    fn build_record(
        &self,
        plugin_id: &PluginId,
        page_url: &CanonicalUrl,
        html: &str,
        warnings: &[&SecurityWarning],
        collected_at: DateTime<Utc>,
    ) -> AdvisoryRecord {
        let page = self.parser.parse(html);

        let warning_ids: BTreeSet<String> = warnings
            .iter()
            .filter_map(|w| w.id.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();

        let vulnerabilities = warning_ids
            .iter()
            .flat_map(|warning_id| {
                let section = page.sections.get(&warning_id.to_ascii_uppercase());
                let description = warnings
                    .iter()
                    .find(|w| w.id.as_deref().map(str::trim) == Some(warning_id.as_str()))
                    .and_then(|w| w.message.clone());
                vulnerabilities(page_url, warning_id, section, description)
            })
            .collect::<Vec<_>>();
        debug!(
            plugin_id = %plugin_id,
            url = %page_url,
            vulnerabilities = vulnerabilities.len(),
            "advisory page parsed"
        );

        AdvisoryRecord {
            plugin_id: plugin_id.clone(),
            advisory_id: self.parser.advisory_id(page_url),
            source_url: page_url.to_string(),
            title: page.title,
            published_date: self.parser.advisory_date(page_url),
            security_warning_ids: warning_ids.into_iter().collect(),
            active_security_warning: warnings.iter().any(|w| w.active),
            vulnerabilities,
            mode: AdvisoryMode::Real,
            collected_at,
            fixed_version: None,
            affected_versions: None,
            notes: None,
        }
    }
}

/// Canonicalizes warning URLs and groups warnings by advisory page.
///
/// Warnings without a URL carry nothing to fetch and are ignored.
fn group_warnings(
    warnings: &[SecurityWarning],
) -> (
    BTreeMap<CanonicalUrl, Vec<&SecurityWarning>>,
    Vec<SourceFailure>,
) {
    let mut groups: BTreeMap<CanonicalUrl, Vec<&SecurityWarning>> = BTreeMap::new();
    let mut failures = Vec::new();

    for warning in warnings {
        let Some(raw) = warning.url.as_deref() else {
            continue;
        };
        let canonical = match canonicalize(raw) {
            Ok(url) => url,
            Err(e) => {
                warn!(url = raw, error = %e, "unusable security warning URL");
                failures.push(SourceFailure {
                    source: raw.to_string(),
                    kind: SourceFailureKind::Canonicalization,
                    detail: e.to_string(),
                });
                continue;
            }
        };
        if canonical.host() != Some(ADVISORY_HOST) {
            failures.push(SourceFailure {
                source: raw.to_string(),
                kind: SourceFailureKind::Canonicalization,
                detail: format!("not a Jenkins advisory host: {}", canonical),
            });
            continue;
        }
        groups
            .entry(canonical.without_fragment())
            .or_default()
            .push(warning);
    }

    (groups, failures)
}

/// One vulnerability per CVE in the warning's section; a section without
/// CVEs (or no section at all) still yields one CVE-less entry.
fn vulnerabilities(
    page_url: &CanonicalUrl,
    warning_id: &str,
    section: Option<&AdvisorySection>,
    description: Option<String>,
) -> Vec<Vulnerability> {
    let cvss = section.and_then(|s| s.cvss.clone());
    let (severity, severity_source) = match section.and_then(|s| s.severity) {
        Some(label) => (Some(label), Some(SeveritySource::JenkinsAdvisory)),
        None => match cvss.as_ref().and_then(|c| c.base_score) {
            Some(score) => (
                Some(Severity::from_cvss_score(score)),
                Some(SeveritySource::CvssV3Derived),
            ),
            None => (None, None),
        },
    };

    let cve_ids: Vec<Option<String>> = match section {
        Some(s) if !s.cve_ids.is_empty() => s.cve_ids.iter().cloned().map(Some).collect(),
        _ => vec![None],
    };
    cve_ids
        .into_iter()
        .map(|cve_id| Vulnerability {
            security_warning_id: Some(warning_id.to_string()),
            cve_id,
            cvss: cvss.clone(),
            severity,
            severity_source,
            description: description.clone(),
            url_fragment: Some(format!("{}#{}", page_url, warning_id)),
        })
        .collect()
}

fn first_line(message: &str) -> String {
    message.lines().next().unwrap_or_default().to_string()
}

/// Canned records for offline runs
fn sample_records(plugin_id: &PluginId, collected_at: DateTime<Utc>) -> Vec<AdvisoryRecord> {
    let record = |advisory_id: &str, published: Option<NaiveDate>, title: &str| AdvisoryRecord {
        plugin_id: plugin_id.clone(),
        advisory_id: advisory_id.to_string(),
        source_url: format!("https://www.jenkins.io/security/advisory/{}/", advisory_id),
        title: Some(title.to_string()),
        published_date: published,
        security_warning_ids: Vec::new(),
        active_security_warning: false,
        vulnerabilities: Vec::new(),
        mode: AdvisoryMode::Sample,
        collected_at,
        fixed_version: None,
        affected_versions: None,
        notes: None,
    };

    match plugin_id.as_str() {
        "workflow-cps" => {
            let vector = "CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H";
            let mut sample = record(
                "2025-01-001",
                NaiveDate::from_ymd_opt(2025, 1, 10),
                "Sample advisory: Pipeline: Groovy sandbox bypass",
            );
            sample.security_warning_ids = vec!["SECURITY-3499".to_string()];
            sample.active_security_warning = true;
            sample.fixed_version = Some("3.0".to_string());
            sample.affected_versions = Some("<= 2.9".to_string());
            sample.notes = Some("Canned record for offline runs".to_string());
            sample.vulnerabilities = vec![Vulnerability {
                security_warning_id: Some("SECURITY-3499".to_string()),
                cve_id: Some("CVE-2025-0001".to_string()),
                cvss: Some(Cvss {
                    version: Some("3.1".to_string()),
                    vector: Some(vector.to_string()),
                    base_score: cvss::base_score(vector),
                    url: None,
                }),
                severity: Some(Severity::Critical),
                severity_source: Some(SeveritySource::CvssV3Derived),
                description: Some("Sandbox bypass vulnerability".to_string()),
                url_fragment: Some(
                    "https://www.jenkins.io/security/advisory/2025-01-001/#SECURITY-3499"
                        .to_string(),
                ),
            }];
            vec![sample]
        }
        "cucumber-reports" => {
            let mut sample = record(
                "2016-07-27",
                NaiveDate::from_ymd_opt(2016, 7, 27),
                "Jenkins Security Advisory 2016-07-27",
            );
            sample.security_warning_ids = vec!["SECURITY-309".to_string()];
            sample.notes = Some("Canned record for offline runs".to_string());
            sample.vulnerabilities = vec![Vulnerability {
                security_warning_id: Some("SECURITY-309".to_string()),
                cve_id: None,
                cvss: None,
                severity: None,
                severity_source: None,
                description: Some("Stored XSS vulnerability".to_string()),
                url_fragment: Some(
                    "https://www.jenkins.io/security/advisory/2016-07-27/#SECURITY-309"
                        .to_string(),
                ),
            }];
            vec![sample]
        }
        _ => Vec::new(),
    }
}
