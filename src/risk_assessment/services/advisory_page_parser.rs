use super::cvss;
use super::url_canonicalizer::CanonicalUrl;
use crate::risk_assessment::domain::{Cvss, Severity};
use crate::shared::Result;
use chrono::NaiveDate;
use regex::Regex;
use std::collections::BTreeMap;

/// Facts extracted from one Jenkins security advisory page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedAdvisoryPage {
    pub title: Option<String>,
    /// Keyed by upper-case tracker id (`SECURITY-309`)
    pub sections: BTreeMap<String, AdvisorySection>,
}

/// Everything the page says about one `SECURITY-n` issue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvisorySection {
    pub severity: Option<Severity>,
    pub cve_ids: Vec<String>,
    pub cvss: Option<Cvss>,
}

/// Regex-based scraper for advisory HTML.
///
/// Pages are split into sections at each `SECURITY-n` mention; text up to
/// the next mention belongs to that issue.
pub struct AdvisoryPageParser {
    title: Regex,
    severity_label: Regex,
    security_id: Regex,
    cve: Regex,
    href: Regex,
    advisory_date: Regex,
}

impl AdvisoryPageParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            title: Regex::new(r"(?is)<title[^>]*>(.*?)</title>")?,
            severity_label: Regex::new(
                r"(?i)(SECURITY-\d+)\s+is\s+considered\s+(low|medium|high|critical)",
            )?,
            security_id: Regex::new(r"(?i)SECURITY-\d+")?,
            cve: Regex::new(r"CVE-\d{4}-\d{4,}")?,
            href: Regex::new(r#"(?i)href\s*=\s*["']([^"']+)["']"#)?,
            advisory_date: Regex::new(r"/security/advisory/(\d{4}-\d{2}-\d{2})/?$")?,
        })
    }

    pub fn parse(&self, html: &str) -> ParsedAdvisoryPage {
        let title = self
            .title
            .captures(html)
            .and_then(|c| c.get(1))
            .map(|m| collapse_whitespace(m.as_str()))
            .filter(|t| !t.is_empty());

        let labels = self.extract_severity_labels(html);

        let mut sections: BTreeMap<String, AdvisorySection> = BTreeMap::new();
        for (id, chunk) in self.security_chunks(html) {
            let section = sections.entry(id.clone()).or_default();

            for cve in self.cve.find_iter(chunk) {
                let cve = cve.as_str().to_string();
                if !section.cve_ids.contains(&cve) {
                    section.cve_ids.push(cve);
                }
            }

            if section.cvss.is_none() {
                section.cvss = self
                    .href
                    .captures_iter(chunk)
                    .filter_map(|c| c.get(1))
                    .find_map(|m| cvss::from_calculator_link(&m.as_str().replace("&amp;", "&")));
            }

            if section.severity.is_none() {
                section.severity = labels.get(&id).copied();
            }
        }

        ParsedAdvisoryPage { title, sections }
    }

    /// Jenkins' own wording: "SECURITY-123 is considered high".
    pub fn extract_severity_labels(&self, html: &str) -> BTreeMap<String, Severity> {
        let mut labels = BTreeMap::new();
        for captures in self.severity_label.captures_iter(html) {
            let (Some(id), Some(label)) = (captures.get(1), captures.get(2)) else {
                continue;
            };
            if let Some(severity) = Severity::from_label(label.as_str()) {
                labels
                    .entry(id.as_str().to_ascii_uppercase())
                    .or_insert(severity);
            }
        }
        labels
    }

    /// Publication date encoded in `/security/advisory/YYYY-MM-DD/`.
    pub fn advisory_date(&self, url: &CanonicalUrl) -> Option<NaiveDate> {
        let path = url.as_url().path();
        let captures = self.advisory_date.captures(path)?;
        NaiveDate::parse_from_str(captures.get(1)?.as_str(), "%Y-%m-%d").ok()
    }

    /// Stable advisory identifier: the URL date, else the last path segment.
    pub fn advisory_id(&self, url: &CanonicalUrl) -> String {
        if let Some(date) = self.advisory_date(url) {
            return date.format("%Y-%m-%d").to_string();
        }
        url.as_url()
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string)
            .unwrap_or_else(|| url.without_fragment().to_string())
    }

    fn security_chunks<'a>(&self, html: &'a str) -> Vec<(String, &'a str)> {
        let starts: Vec<(usize, String)> = self
            .security_id
            .find_iter(html)
            .map(|m| (m.start(), m.as_str().to_ascii_uppercase()))
            .collect();

        starts
            .iter()
            .enumerate()
            .map(|(i, (start, id))| {
                let end = starts.get(i + 1).map_or(html.len(), |(next, _)| *next);
                (id.clone(), &html[*start..end])
            })
            .collect()
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk_assessment::services::url_canonicalizer::canonicalize;

    const PAGE: &str = r#"<html><head><title>
        Jenkins Security Advisory 2016-07-27
    </title></head><body>
    <h3 id="SECURITY-309">Cucumber Reports Plugin stored XSS</h3>
    <p><strong>SECURITY-309 / CVE-2016-9999</strong></p>
    <p>Severity (CVSS): <a href="https://www.first.org/cvss/calculator/3.0#CVSS:3.0/AV:N/AC:H/PR:L/UI:R/S:C/C:L/I:L/A:N">Medium</a></p>
    <p>SECURITY-309 is considered medium.</p>
    <h3 id="SECURITY-310">Another issue</h3>
    <p>SECURITY-310 is considered high.</p>
    </body></html>"#;

    fn parser() -> AdvisoryPageParser {
        AdvisoryPageParser::new().unwrap()
    }

    #[test]
    fn test_parse_title() {
        let page = parser().parse(PAGE);
        assert_eq!(
            page.title.as_deref(),
            Some("Jenkins Security Advisory 2016-07-27")
        );
    }

    #[test]
    fn test_parse_sections() {
        let page = parser().parse(PAGE);
        assert_eq!(page.sections.len(), 2);

        let first = &page.sections["SECURITY-309"];
        assert_eq!(first.cve_ids, vec!["CVE-2016-9999".to_string()]);
        assert_eq!(first.severity, Some(Severity::Medium));
        let cvss = first.cvss.as_ref().unwrap();
        assert_eq!(cvss.version.as_deref(), Some("3.0"));
        assert_eq!(cvss.base_score.unwrap().value(), 4.4);

        let second = &page.sections["SECURITY-310"];
        assert!(second.cve_ids.is_empty());
        assert!(second.cvss.is_none());
        assert_eq!(second.severity, Some(Severity::High));
    }

    #[test]
    fn test_parse_page_without_sections() {
        let page = parser().parse("<html><body>No issues here</body></html>");
        assert!(page.title.is_none());
        assert!(page.sections.is_empty());
    }

    #[test]
    fn test_extract_severity_labels_keeps_first() {
        let labels = parser().extract_severity_labels(
            "security-1 is considered LOW. SECURITY-1 is considered critical.",
        );
        assert_eq!(labels.get("SECURITY-1"), Some(&Severity::Low));
    }

    #[test]
    fn test_advisory_date_and_id() {
        let p = parser();
        let dated = canonicalize("https://www.jenkins.io/security/advisory/2016-07-27/").unwrap();
        assert_eq!(
            p.advisory_date(&dated),
            NaiveDate::from_ymd_opt(2016, 7, 27)
        );
        assert_eq!(p.advisory_id(&dated), "2016-07-27");

        let undated = canonicalize("https://www.jenkins.io/security/advisory/2025-01-001/").unwrap();
        assert!(p.advisory_date(&undated).is_none());
        assert_eq!(p.advisory_id(&undated), "2025-01-001");
    }

    #[test]
    fn test_advisory_date_rejects_impossible_dates() {
        let url = canonicalize("https://www.jenkins.io/security/advisory/2016-13-45/").unwrap();
        assert!(parser().advisory_date(&url).is_none());
    }
}
