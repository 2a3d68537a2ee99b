use crate::risk_assessment::domain::{
    AdvisoryEvent, CvssScore, HealthRecord, PluginId, PluginSnapshot, ScoreResult, Severity,
    MAX_SCORE, MIN_SCORE,
};
use crate::risk_assessment::policies::NameHeuristic;
use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Display;

/// Weekly core releases are counted from 2.0's release date.
const CORE_2_0_RELEASE: (i32, u32, u32) = (2016, 4, 20);
const DAYS_PER_YEAR: f64 = 365.25;

/// Point weights for every contribution the baseline scorer applies.
///
/// All fields have defaults, so a config file only needs to name the
/// weights it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub name_security_points: f64,
    pub name_scm_points: f64,
    pub name_generic_points: f64,
    pub points_per_advisory: f64,
    pub advisory_points_cap: f64,
    pub recency_points_per_advisory: f64,
    pub recency_half_life_days: f64,
    pub recency_points_cap: f64,
    pub critical_points: f64,
    pub high_points: f64,
    pub medium_points: f64,
    pub low_points: f64,
    pub points_per_dependency: f64,
    pub dependency_points_cap: f64,
    pub core_age_years_moderate: f64,
    pub core_age_moderate_points: f64,
    pub core_age_years_severe: f64,
    pub core_age_severe_points: f64,
    pub active_warning_points: f64,
    pub recent_release_days: i64,
    pub recent_release_points: f64,
    pub health_max_reduction: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            name_security_points: 20.0,
            name_scm_points: 10.0,
            name_generic_points: 5.0,
            points_per_advisory: 3.0,
            advisory_points_cap: 15.0,
            recency_points_per_advisory: 10.0,
            recency_half_life_days: 730.0,
            recency_points_cap: 20.0,
            critical_points: 25.0,
            high_points: 15.0,
            medium_points: 8.0,
            low_points: 3.0,
            points_per_dependency: 0.5,
            dependency_points_cap: 10.0,
            core_age_years_moderate: 4.0,
            core_age_moderate_points: 2.0,
            core_age_years_severe: 6.0,
            core_age_severe_points: 4.0,
            active_warning_points: 30.0,
            recent_release_days: 180,
            recent_release_points: -5.0,
            health_max_reduction: 10.0,
        }
    }
}

impl ScoringConfig {
    /// Name of the first weight that is NaN or infinite, if any
    pub fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("name_security_points", self.name_security_points),
            ("name_scm_points", self.name_scm_points),
            ("name_generic_points", self.name_generic_points),
            ("points_per_advisory", self.points_per_advisory),
            ("advisory_points_cap", self.advisory_points_cap),
            ("recency_points_per_advisory", self.recency_points_per_advisory),
            ("recency_half_life_days", self.recency_half_life_days),
            ("recency_points_cap", self.recency_points_cap),
            ("critical_points", self.critical_points),
            ("high_points", self.high_points),
            ("medium_points", self.medium_points),
            ("low_points", self.low_points),
            ("points_per_dependency", self.points_per_dependency),
            ("dependency_points_cap", self.dependency_points_cap),
            ("core_age_years_moderate", self.core_age_years_moderate),
            ("core_age_moderate_points", self.core_age_moderate_points),
            ("core_age_years_severe", self.core_age_years_severe),
            ("core_age_severe_points", self.core_age_severe_points),
            ("active_warning_points", self.active_warning_points),
            ("recent_release_points", self.recent_release_points),
            ("health_max_reduction", self.health_max_reduction),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite())
        .map(|(name, _)| name)
    }
}

/// Everything the scorer may look at for one plugin
#[derive(Debug, Clone)]
pub struct ScoringInputs {
    pub snapshot: Option<PluginSnapshot>,
    pub events: Vec<AdvisoryEvent>,
    pub health: Option<HealthRecord>,
    /// Reference date for every age computation
    pub as_of: NaiveDate,
}

impl ScoringInputs {
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            snapshot: None,
            events: Vec::new(),
            health: None,
            as_of,
        }
    }
}

/// Running total plus the reasons and features that explain it
struct Breakdown {
    total: f64,
    reasons: Vec<String>,
    features: BTreeMap<String, Value>,
}

impl Breakdown {
    fn new() -> Self {
        Self {
            total: 0.0,
            reasons: Vec::new(),
            features: BTreeMap::new(),
        }
    }

    fn contribute(&mut self, points: f64, explanation: impl Display) {
        let points = round_one_decimal(points);
        if !points.is_finite() {
            self.reasons
                .push(format!("ignored non-finite contribution: {}", explanation));
            return;
        }
        if points == 0.0 {
            return;
        }
        self.total += points;
        self.reasons.push(format!("{:+}: {}", points, explanation));
    }

    fn feature(&mut self, name: &str, value: impl Into<Value>) {
        self.features.insert(name.to_string(), value.into());
    }
}

/// Transparent additive risk scorer.
///
/// Contributions are applied in a fixed order (name, advisories, snapshot,
/// health), each rounded to one decimal. The total is clamped to
/// [`MIN_SCORE`]..=[`MAX_SCORE`].
pub struct BaselineScorer {
    config: ScoringConfig,
}

impl BaselineScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(&self, plugin_id: &PluginId, inputs: &ScoringInputs) -> ScoreResult {
        let mut breakdown = Breakdown::new();

        self.apply_name_heuristic(plugin_id, &mut breakdown);
        let max_severity = self.apply_advisory_features(plugin_id, inputs, &mut breakdown);
        self.apply_snapshot_features(inputs, &mut breakdown);
        self.apply_health_feature(inputs, &mut breakdown);

        let unclamped = round_one_decimal(breakdown.total);
        let score = if unclamped.is_finite() {
            unclamped.clamp(MIN_SCORE, MAX_SCORE)
        } else {
            MIN_SCORE
        };
        if score != unclamped {
            breakdown
                .reasons
                .push(format!("clamped to {} (unclamped total {})", score, unclamped));
        }

        ScoreResult {
            plugin_id: plugin_id.clone(),
            score,
            max_severity,
            reasons: breakdown.reasons,
            features: breakdown.features,
        }
    }

    fn apply_name_heuristic(&self, plugin_id: &PluginId, breakdown: &mut Breakdown) {
        let heuristic = NameHeuristic::classify(plugin_id.as_str());
        let points = match heuristic {
            NameHeuristic::SecuritySensitive => self.config.name_security_points,
            NameHeuristic::SourceControl => self.config.name_scm_points,
            NameHeuristic::Generic => self.config.name_generic_points,
        };
        breakdown.feature("name_heuristic", heuristic.as_str());
        breakdown.contribute(points, heuristic.explanation());
    }

    fn apply_advisory_features(
        &self,
        plugin_id: &PluginId,
        inputs: &ScoringInputs,
        breakdown: &mut Breakdown,
    ) -> Option<Severity> {
        let events: Vec<&AdvisoryEvent> = inputs
            .events
            .iter()
            .filter(|e| e.plugin_id() == plugin_id)
            .collect();

        // Earliest known date per advisory
        let mut advisories: BTreeMap<&str, Option<NaiveDate>> = BTreeMap::new();
        for event in &events {
            let date = advisories.entry(event.key.advisory_id.as_str()).or_insert(None);
            *date = match (*date, event.published_date) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };
        }

        let advisory_count = advisories.len();
        let latest = advisories.values().flatten().max().copied();
        breakdown.feature("advisory_count", advisory_count);
        breakdown.feature(
            "latest_advisory_date",
            latest.map(|d| d.format("%Y-%m-%d").to_string()),
        );

        if advisory_count > 0 {
            let points = (advisory_count as f64 * self.config.points_per_advisory)
                .min(self.config.advisory_points_cap);
            breakdown.contribute(points, format!("{} published advisories", advisory_count));
        }

        let recency: f64 = advisories
            .values()
            .flatten()
            .map(|date| {
                let age_days = (inputs.as_of - *date).num_days().max(0) as f64;
                self.config.recency_points_per_advisory
                    * 0.5_f64.powf(age_days / self.config.recency_half_life_days)
            })
            .sum();
        let recency = round_one_decimal(recency.min(self.config.recency_points_cap));
        breakdown.feature("advisory_recency_weight", recency);
        if let Some(latest) = latest {
            breakdown.contribute(
                recency,
                format!("advisory recency (latest {})", latest.format("%Y-%m-%d")),
            );
        }

        let max_cvss = events
            .iter()
            .filter_map(|e| e.cvss_score)
            .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.max(s))));
        let cvss_severity = max_cvss
            .and_then(|s| CvssScore::new(s).ok())
            .map(Severity::from_cvss_score);
        let label_severity = events.iter().filter_map(|e| e.severity).max();
        breakdown.feature("max_cvss_base_score", max_cvss);
        breakdown.feature("max_cvss_severity", cvss_severity.map(|s| s.as_str()));

        let max_severity = cvss_severity.or(label_severity);
        breakdown.feature("max_advisory_severity", max_severity.map(|s| s.as_str()));
        if let Some(severity) = max_severity {
            let explanation = match max_cvss {
                Some(score) => format!("max CVSS base score {:.1} ({})", score, severity),
                None => format!("max advisory severity {}", severity),
            };
            breakdown.contribute(self.severity_points(severity), explanation);
        }

        max_severity
    }

    fn apply_snapshot_features(&self, inputs: &ScoringInputs, breakdown: &mut Breakdown) {
        let Some(snapshot) = &inputs.snapshot else {
            breakdown.feature("snapshot_mode", Value::Null);
            return;
        };
        breakdown.feature("snapshot_mode", snapshot.mode.as_str());

        let dependency_count = snapshot.dependencies.len();
        breakdown.feature("dependency_count", dependency_count);
        breakdown.contribute(
            (dependency_count as f64 * self.config.points_per_dependency)
                .min(self.config.dependency_points_cap),
            format!("{} dependencies (surface area)", dependency_count),
        );

        let core_age = snapshot
            .required_core
            .as_deref()
            .and_then(estimate_core_release)
            .map(|released| {
                round_one_decimal(
                    ((inputs.as_of - released).num_days().max(0) as f64) / DAYS_PER_YEAR,
                )
            });
        breakdown.feature("required_core", snapshot.required_core.clone());
        breakdown.feature("required_core_age_years", core_age);
        if let (Some(age), Some(core)) = (core_age, snapshot.required_core.as_deref()) {
            let points = if age >= self.config.core_age_years_severe {
                self.config.core_age_severe_points
            } else if age >= self.config.core_age_years_moderate {
                self.config.core_age_moderate_points
            } else {
                0.0
            };
            breakdown.contribute(
                points,
                format!("requires Jenkins core {} (~{} years old)", core, age),
            );
        }

        let active = snapshot.active_warning_count();
        breakdown.feature("active_security_warning_count", active);
        if active >= 1 {
            breakdown.contribute(
                self.config.active_warning_points,
                format!("{} active security warning(s)", active),
            );
        }

        let days_since_release = snapshot
            .release_timestamp
            .map(|released| (inputs.as_of - released.date_naive()).num_days());
        breakdown.feature("days_since_release", days_since_release);
        if let Some(days) = days_since_release {
            if (0..=self.config.recent_release_days).contains(&days) {
                breakdown.contribute(
                    self.config.recent_release_points,
                    format!("released {} days ago (actively maintained)", days),
                );
            }
        }
    }

    fn apply_health_feature(&self, inputs: &ScoringInputs, breakdown: &mut Breakdown) {
        let Some(health) = &inputs.health else {
            return;
        };
        let value = health.value.clamp(0.0, 100.0);
        breakdown.feature("health_score", value);
        breakdown.feature("health_as_of", health.as_of.clone());
        breakdown.contribute(
            -(value / 100.0 * self.config.health_max_reduction),
            format!("health score {}", value),
        );
    }

    fn severity_points(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Critical => self.config.critical_points,
            Severity::High => self.config.high_points,
            Severity::Medium => self.config.medium_points,
            Severity::Low => self.config.low_points,
            Severity::None => 0.0,
        }
    }
}

impl Default for BaselineScorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

/// Estimated release date of a `2.N` core line, assuming weekly releases.
///
/// `1.x` lines are treated as no newer than 2.0. Unknown shapes yield None.
pub fn estimate_core_release(version: &str) -> Option<NaiveDate> {
    let mut parts = version.trim().split('.');
    let major: u32 = parts.next()?.parse().ok()?;
    let (year, month, day) = CORE_2_0_RELEASE;
    let base = NaiveDate::from_ymd_opt(year, month, day)?;
    match major {
        1 => Some(base),
        2 => {
            let minor: i64 = parts.next()?.parse().ok()?;
            base.checked_add_signed(TimeDelta::try_weeks(minor)?)
        }
        _ => None,
    }
}

fn round_one_decimal(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    // Avoid "-0" in reasons
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
