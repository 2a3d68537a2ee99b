use crate::shared::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// CVSS base score in the closed range 0.0..=10.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct CvssScore(f64);

impl CvssScore {
    pub fn new(value: f64) -> Result<Self> {
        Self::try_from(value).map_err(anyhow::Error::msg)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for CvssScore {
    type Error = String;

    fn try_from(value: f64) -> std::result::Result<Self, Self::Error> {
        if !value.is_finite() || !(0.0..=10.0).contains(&value) {
            return Err(format!(
                "CVSS score must be between 0.0 and 10.0, got {}",
                value
            ));
        }
        Ok(Self(value))
    }
}

impl From<CvssScore> for f64 {
    fn from(score: CvssScore) -> Self {
        score.0
    }
}

impl fmt::Display for CvssScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// Severity bucket derived from a CVSS base score or an advisory label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Buckets a base score: 0 is None, then Low below 4, Medium below 7,
    /// High below 9 and Critical from 9 up.
    pub fn from_cvss_score(score: CvssScore) -> Self {
        let value = score.value();
        if value == 0.0 {
            Severity::None
        } else if value < 4.0 {
            Severity::Low
        } else if value < 7.0 {
            Severity::Medium
        } else if value < 9.0 {
            Severity::High
        } else {
            Severity::Critical
        }
    }

    /// Parses the wording used by Jenkins advisories ("considered high").
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "critical" => Some(Severity::Critical),
            "high" => Some(Severity::High),
            "medium" | "moderate" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            "none" => Some(Severity::None),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a vulnerability's severity came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeveritySource {
    JenkinsAdvisory,
    CvssV3Derived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cvss {
    /// e.g. `3.1`
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub vector: Option<String>,
    #[serde(default)]
    pub base_score: Option<CvssScore>,
    /// Calculator link the vector was read from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// One vulnerability listed by an advisory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    #[serde(default)]
    pub security_warning_id: Option<String>,
    #[serde(default)]
    pub cve_id: Option<String>,
    #[serde(default)]
    pub cvss: Option<Cvss>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity_source: Option<SeveritySource>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_fragment: Option<String>,
}

impl Vulnerability {
    pub fn base_score(&self) -> Option<CvssScore> {
        self.cvss.as_ref().and_then(|c| c.base_score)
    }

    /// CVSS bucket when a base score exists, otherwise the advisory label
    pub fn effective_severity(&self) -> Option<Severity> {
        self.base_score()
            .map(Severity::from_cvss_score)
            .or(self.severity)
    }
}
