//! Typed dashboard snapshot records and their validated construction.
//!
//! Snapshots arrive as loosely-shaped `Raw*` documents. `DashboardSnapshot::from_raw`
//! checks every field and reports all problems in one `SnapshotValidationError`;
//! a snapshot that validates is immutable and internally consistent.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, IssueCollector, SnapshotValidationError};
use crate::palette::ColorToken;
use crate::risk_classifier::{
    classify_risk_score, ensure_score_in_range, RiskClassification, RiskLevel, ScoreBucket,
};

pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;
pub const SNAPSHOT_DATE_FORMAT: &str = "%Y-%m-%d";

const MAX_UPTIME_PERCENT: f64 = 100.0;

/// A document field as found: the expected shape, or whatever JSON was there instead.
///
/// Mistyped values are kept so validation can report them alongside every other issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawField<T> {
    Typed(T),
    Mistyped(serde_json::Value),
}

impl<T> From<T> for RawField<T> {
    fn from(value: T) -> Self {
        Self::Typed(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDashboardSnapshot {
    pub schema_version: Option<RawField<u32>>,
    pub control_safeguard: Option<RawField<RawSafeguardSnapshot>>,
    pub site_assessment: Option<RawField<RawAssessmentSnapshot>>,
    pub site_risk_for_a_unit: Option<RawField<Vec<RawRiskSample>>>,
    pub last_risk_assessment_for_sites: Option<RawField<Vec<RawSiteRiskRecord>>>,
    pub system_health: Option<RawField<RawSystemHealth>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSafeguardSnapshot {
    pub total: Option<RawField<u32>>,
    pub active: Option<RawField<u32>>,
    pub inactive: Option<RawField<u32>>,
    pub critical: Option<RawField<u32>>,
    pub trend: Option<RawField<Vec<f64>>>,
    pub monthly_series: Option<RawField<Vec<RawMonthlyControlPoint>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMonthlyControlPoint {
    pub month: Option<RawField<String>>,
    pub active_controls: Option<RawField<u32>>,
    pub critical_issues: Option<RawField<u32>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAssessmentSnapshot {
    pub total: Option<RawField<u32>>,
    pub completed: Option<RawField<u32>>,
    pub pending: Option<RawField<u32>>,
    pub overdue: Option<RawField<u32>>,
    pub average_score: Option<RawField<f64>>,
    pub score_distribution: Option<RawField<Vec<RawScoreDistributionEntry>>>,
    pub monthly_progress: Option<RawField<Vec<RawMonthlyProgressPoint>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawScoreDistributionEntry {
    pub bucket: Option<RawField<String>>,
    pub count: Option<RawField<u32>>,
    pub color: Option<RawField<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMonthlyProgressPoint {
    pub month: Option<RawField<String>>,
    pub completed: Option<RawField<u32>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRiskSample {
    pub date: Option<RawField<String>>,
    pub risk_level: Option<RawField<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSiteRiskRecord {
    pub site: Option<RawField<String>>,
    pub last_assessment: Option<RawField<String>>,
    pub score: Option<RawField<f64>>,
    pub risk_level: Option<RawField<String>>,
    pub color: Option<RawField<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSystemHealth {
    pub uptime_percent: Option<RawField<f64>>,
    pub active_monitors: Option<RawField<u32>>,
    pub critical_alerts: Option<RawField<u32>>,
}

fn required<T: Clone>(
    issues: &mut IssueCollector,
    path: &str,
    field: &str,
    value: &Option<RawField<T>>,
) -> Option<T> {
    if value.is_none() {
        issues.invalid(
            join_path(path, field),
            "missing required snapshot field",
        );
    }
    optional(issues, path, field, value)
}

fn optional<T: Clone>(
    issues: &mut IssueCollector,
    path: &str,
    field: &str,
    value: &Option<RawField<T>>,
) -> Option<T> {
    match value {
        Some(RawField::Typed(value)) => Some(value.clone()),
        Some(RawField::Mistyped(found)) => {
            issues.invalid(
                join_path(path, field),
                format!("unexpected value {found} (wrong type or out of range)"),
            );
            None
        }
        None => None,
    }
}

fn join_path(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{path}.{field}")
    }
}

fn required_label(
    issues: &mut IssueCollector,
    path: &str,
    field: &str,
    value: &Option<RawField<String>>,
) -> Option<String> {
    let label = required(issues, path, field, value)?;
    if label.trim().is_empty() {
        issues.invalid(join_path(path, field), "must not be empty");
        return None;
    }
    Some(label)
}

fn check_score(issues: &mut IssueCollector, path: &str, score: f64) -> Option<f64> {
    match ensure_score_in_range(path, score) {
        Ok(score) => Some(score),
        Err(error) => {
            issues.invalid(path, error.to_string());
            None
        }
    }
}

fn parse_snapshot_date(issues: &mut IssueCollector, path: &str, raw: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(raw.trim(), SNAPSHOT_DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(error) => {
            issues.invalid(
                path,
                format!("'{raw}' is not an ISO-8601 calendar date: {error}"),
            );
            None
        }
    }
}

/// Runs one validation closure and converts its collected issues into a `DashboardError`.
fn construct<T>(
    build: impl FnOnce(&mut IssueCollector) -> Option<T>,
) -> Result<T, DashboardError> {
    let mut issues = IssueCollector::default();
    let value = build(&mut issues);
    issues.into_dashboard_error()?;
    value.ok_or_else(|| DashboardError::invalid_input("record failed validation"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyControlPoint {
    month: String,
    active_controls: u32,
    critical_issues: u32,
}

impl MonthlyControlPoint {
    pub fn new(
        month: impl Into<String>,
        active_controls: u32,
        critical_issues: u32,
    ) -> Result<Self, DashboardError> {
        let raw = RawMonthlyControlPoint {
            month: Some(RawField::Typed(month.into())),
            active_controls: Some(RawField::Typed(active_controls)),
            critical_issues: Some(RawField::Typed(critical_issues)),
        };
        construct(|issues| Self::validate(&raw, "monthly_control_point", issues))
    }

    fn validate(
        raw: &RawMonthlyControlPoint,
        path: &str,
        issues: &mut IssueCollector,
    ) -> Option<Self> {
        let month = required_label(issues, path, "month", &raw.month);
        let active_controls = required(issues, path, "active_controls", &raw.active_controls);
        let critical_issues = required(issues, path, "critical_issues", &raw.critical_issues);
        Some(Self {
            month: month?,
            active_controls: active_controls?,
            critical_issues: critical_issues?,
        })
    }

    pub fn month(&self) -> &str {
        &self.month
    }

    pub fn active_controls(&self) -> u32 {
        self.active_controls
    }

    pub fn critical_issues(&self) -> u32 {
        self.critical_issues
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SafeguardSnapshot {
    total: u32,
    active: u32,
    inactive: u32,
    critical: u32,
    trend: Vec<f64>,
    monthly_series: Vec<MonthlyControlPoint>,
}

impl SafeguardSnapshot {
    pub fn new(
        total: u32,
        active: u32,
        inactive: u32,
        critical: u32,
        trend: Vec<f64>,
        monthly_series: Vec<MonthlyControlPoint>,
    ) -> Result<Self, DashboardError> {
        let raw = RawSafeguardSnapshot {
            total: Some(RawField::Typed(total)),
            active: Some(RawField::Typed(active)),
            inactive: Some(RawField::Typed(inactive)),
            critical: Some(RawField::Typed(critical)),
            trend: Some(RawField::Typed(trend)),
            monthly_series: Some(RawField::Typed(
                monthly_series
                    .into_iter()
                    .map(|point| RawMonthlyControlPoint {
                        month: Some(RawField::Typed(point.month)),
                        active_controls: Some(RawField::Typed(point.active_controls)),
                        critical_issues: Some(RawField::Typed(point.critical_issues)),
                    })
                    .collect(),
            )),
        };
        construct(|issues| Self::validate(&raw, "control_safeguard", issues))
    }

    fn validate(
        raw: &RawSafeguardSnapshot,
        path: &str,
        issues: &mut IssueCollector,
    ) -> Option<Self> {
        let issues_before = issues.issue_count();
        let total = required(issues, path, "total", &raw.total);
        let active = required(issues, path, "active", &raw.active);
        let inactive = required(issues, path, "inactive", &raw.inactive);
        let critical = required(issues, path, "critical", &raw.critical);
        let trend = required(issues, path, "trend", &raw.trend);
        let monthly_series = required(issues, path, "monthly_series", &raw.monthly_series);

        if let (Some(total), Some(active), Some(inactive)) = (total, active, inactive) {
            if u64::from(active) + u64::from(inactive) != u64::from(total) {
                issues.invalid(
                    join_path(path, "total"),
                    format!("active ({active}) + inactive ({inactive}) must equal total ({total})"),
                );
            }
        }
        if let (Some(total), Some(critical)) = (total, critical) {
            if critical > total {
                issues.invalid(
                    join_path(path, "critical"),
                    format!("critical ({critical}) exceeds total ({total})"),
                );
            }
        }
        if let Some(trend) = &trend {
            if trend.is_empty() {
                issues.invalid(join_path(path, "trend"), "must contain at least one value");
            }
            for (index, value) in trend.iter().enumerate() {
                if !value.is_finite() {
                    issues.invalid(
                        format!("{}[{index}]", join_path(path, "trend")),
                        "must be a finite number",
                    );
                }
            }
        }
        let monthly_series = monthly_series.map(|points| {
            points
                .iter()
                .enumerate()
                .filter_map(|(index, point)| {
                    let point_path = format!("{}[{index}]", join_path(path, "monthly_series"));
                    MonthlyControlPoint::validate(point, &point_path, issues)
                })
                .collect::<Vec<_>>()
        });

        if issues.issue_count() != issues_before {
            return None;
        }
        Some(Self {
            total: total?,
            active: active?,
            inactive: inactive?,
            critical: critical?,
            trend: trend?,
            monthly_series: monthly_series?,
        })
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn active(&self) -> u32 {
        self.active
    }

    pub fn inactive(&self) -> u32 {
        self.inactive
    }

    pub fn critical(&self) -> u32 {
        self.critical
    }

    pub fn trend(&self) -> &[f64] {
        &self.trend
    }

    pub fn monthly_series(&self) -> &[MonthlyControlPoint] {
        &self.monthly_series
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreDistributionEntry {
    bucket: ScoreBucket,
    count: u32,
}

impl ScoreDistributionEntry {
    pub fn new(bucket: ScoreBucket, count: u32) -> Self {
        Self { bucket, count }
    }

    fn validate(
        raw: &RawScoreDistributionEntry,
        path: &str,
        issues: &mut IssueCollector,
    ) -> Option<Self> {
        let bucket_label = required_label(issues, path, "bucket", &raw.bucket);
        let count = required(issues, path, "count", &raw.count);
        let claimed_color = optional(issues, path, "color", &raw.color);
        let bucket = match bucket_label {
            Some(label) => {
                let bucket = ScoreBucket::parse(&label);
                if bucket.is_none() {
                    issues.invalid(
                        join_path(path, "bucket"),
                        format!("unknown score bucket '{label}'"),
                    );
                }
                bucket
            }
            None => None,
        }?;
        if let Some(color) = claimed_color {
            if ColorToken::parse(&color) != Some(bucket.color()) {
                issues.inconsistent(
                    join_path(path, "color"),
                    format!(
                        "supplied color '{color}' does not match bucket {} color {}",
                        bucket.as_str(),
                        bucket.color().hex()
                    ),
                );
            }
        }
        Some(Self {
            bucket,
            count: count?,
        })
    }

    pub fn bucket(&self) -> ScoreBucket {
        self.bucket
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn label(&self) -> &'static str {
        self.bucket.label()
    }

    pub fn color(&self) -> ColorToken {
        self.bucket.color()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyProgressPoint {
    month: String,
    completed: u32,
}

impl MonthlyProgressPoint {
    pub fn new(month: impl Into<String>, completed: u32) -> Result<Self, DashboardError> {
        let raw = RawMonthlyProgressPoint {
            month: Some(RawField::Typed(month.into())),
            completed: Some(RawField::Typed(completed)),
        };
        construct(|issues| Self::validate(&raw, "monthly_progress_point", issues))
    }

    fn validate(
        raw: &RawMonthlyProgressPoint,
        path: &str,
        issues: &mut IssueCollector,
    ) -> Option<Self> {
        let month = required_label(issues, path, "month", &raw.month);
        let completed = required(issues, path, "completed", &raw.completed);
        Some(Self {
            month: month?,
            completed: completed?,
        })
    }

    pub fn month(&self) -> &str {
        &self.month
    }

    pub fn completed(&self) -> u32 {
        self.completed
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentSnapshot {
    total: u32,
    completed: u32,
    pending: u32,
    overdue: u32,
    average_score: f64,
    score_distribution: Vec<ScoreDistributionEntry>,
    monthly_progress: Vec<MonthlyProgressPoint>,
}

impl AssessmentSnapshot {
    pub fn new(
        total: u32,
        completed: u32,
        pending: u32,
        overdue: u32,
        average_score: f64,
        score_distribution: Vec<ScoreDistributionEntry>,
        monthly_progress: Vec<MonthlyProgressPoint>,
    ) -> Result<Self, DashboardError> {
        let raw = RawAssessmentSnapshot {
            total: Some(RawField::Typed(total)),
            completed: Some(RawField::Typed(completed)),
            pending: Some(RawField::Typed(pending)),
            overdue: Some(RawField::Typed(overdue)),
            average_score: Some(RawField::Typed(average_score)),
            score_distribution: Some(RawField::Typed(
                score_distribution
                    .into_iter()
                    .map(|entry| RawScoreDistributionEntry {
                        bucket: Some(RawField::Typed(entry.bucket.as_str().to_string())),
                        count: Some(RawField::Typed(entry.count)),
                        color: None,
                    })
                    .collect(),
            )),
            monthly_progress: Some(RawField::Typed(
                monthly_progress
                    .into_iter()
                    .map(|point| RawMonthlyProgressPoint {
                        month: Some(RawField::Typed(point.month)),
                        completed: Some(RawField::Typed(point.completed)),
                    })
                    .collect(),
            )),
        };
        construct(|issues| Self::validate(&raw, "site_assessment", issues))
    }

    fn validate(
        raw: &RawAssessmentSnapshot,
        path: &str,
        issues: &mut IssueCollector,
    ) -> Option<Self> {
        let issues_before = issues.issue_count();
        let total = required(issues, path, "total", &raw.total);
        let completed = required(issues, path, "completed", &raw.completed);
        let pending = required(issues, path, "pending", &raw.pending);
        let overdue = required(issues, path, "overdue", &raw.overdue);
        let average_score = required(issues, path, "average_score", &raw.average_score)
            .and_then(|score| check_score(issues, &join_path(path, "average_score"), score));
        let score_distribution =
            required(issues, path, "score_distribution", &raw.score_distribution).map(|entries| {
                entries
                    .iter()
                    .enumerate()
                    .filter_map(|(index, entry)| {
                        let entry_path =
                            format!("{}[{index}]", join_path(path, "score_distribution"));
                        ScoreDistributionEntry::validate(entry, &entry_path, issues)
                    })
                    .collect::<Vec<_>>()
            });
        let monthly_progress =
            required(issues, path, "monthly_progress", &raw.monthly_progress).map(|points| {
                points
                    .iter()
                    .enumerate()
                    .filter_map(|(index, point)| {
                        let point_path =
                            format!("{}[{index}]", join_path(path, "monthly_progress"));
                        MonthlyProgressPoint::validate(point, &point_path, issues)
                    })
                    .collect::<Vec<_>>()
            });

        if let (Some(total), Some(completed)) = (total, completed) {
            if completed > total {
                issues.invalid(
                    join_path(path, "completed"),
                    format!("completed ({completed}) exceeds total ({total})"),
                );
            }
        }
        if let Some(entries) = &score_distribution {
            for (index, entry) in entries.iter().enumerate() {
                if entries[..index]
                    .iter()
                    .any(|previous| previous.bucket == entry.bucket)
                {
                    issues.invalid(
                        format!("{}[{index}].bucket", join_path(path, "score_distribution")),
                        format!("score bucket '{}' appears more than once", entry.bucket.as_str()),
                    );
                }
            }
            if let Some(total) = total {
                let distributed = entries
                    .iter()
                    .map(|entry| u64::from(entry.count))
                    .sum::<u64>();
                if distributed > u64::from(total) {
                    issues.invalid(
                        join_path(path, "score_distribution"),
                        format!("bucket counts sum to {distributed}, exceeding total ({total})"),
                    );
                }
            }
        }

        if issues.issue_count() != issues_before {
            return None;
        }
        Some(Self {
            total: total?,
            completed: completed?,
            pending: pending?,
            overdue: overdue?,
            average_score: average_score?,
            score_distribution: score_distribution?,
            monthly_progress: monthly_progress?,
        })
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub fn pending(&self) -> u32 {
        self.pending
    }

    pub fn overdue(&self) -> u32 {
        self.overdue
    }

    pub fn average_score(&self) -> f64 {
        self.average_score
    }

    pub fn score_distribution(&self) -> &[ScoreDistributionEntry] {
        &self.score_distribution
    }

    pub fn monthly_progress(&self) -> &[MonthlyProgressPoint] {
        &self.monthly_progress
    }

    pub fn distributed_count(&self) -> u64 {
        self.score_distribution
            .iter()
            .map(|entry| u64::from(entry.count))
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskSample {
    date: NaiveDate,
    risk_level: f64,
}

impl RiskSample {
    pub fn new(date: NaiveDate, risk_level: f64) -> Result<Self, DashboardError> {
        let risk_level = ensure_score_in_range("risk_level", risk_level)?;
        Ok(Self { date, risk_level })
    }

    fn validate(raw: &RawRiskSample, path: &str, issues: &mut IssueCollector) -> Option<Self> {
        let date = required(issues, path, "date", &raw.date)
            .and_then(|date| parse_snapshot_date(issues, &join_path(path, "date"), &date));
        let risk_level = required(issues, path, "risk_level", &raw.risk_level)
            .and_then(|level| check_score(issues, &join_path(path, "risk_level"), level));
        Some(Self {
            date: date?,
            risk_level: risk_level?,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn risk_level(&self) -> f64 {
        self.risk_level
    }
}

/// Latest assessment for one site. Severity and color are always derived from `score`.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteRiskRecord {
    site_name: String,
    last_assessment: NaiveDate,
    score: f64,
    classification: RiskClassification,
}

impl SiteRiskRecord {
    pub fn new(
        site_name: impl Into<String>,
        last_assessment: NaiveDate,
        score: f64,
    ) -> Result<Self, DashboardError> {
        Self::verified(site_name, last_assessment, score, None, None)
    }

    /// Builds a record and checks any caller-supplied severity or color against the derived one.
    pub fn verified(
        site_name: impl Into<String>,
        last_assessment: NaiveDate,
        score: f64,
        claimed_level: Option<RiskLevel>,
        claimed_color: Option<ColorToken>,
    ) -> Result<Self, DashboardError> {
        let site_name = site_name.into();
        construct(|issues| {
            Self::checked(
                site_name,
                last_assessment,
                score,
                claimed_level,
                claimed_color.map(|color| color.hex().to_string()),
                "site_risk_record",
                issues,
            )
        })
    }

    fn validate(raw: &RawSiteRiskRecord, path: &str, issues: &mut IssueCollector) -> Option<Self> {
        let issues_before = issues.issue_count();
        let site_name = required_label(issues, path, "site", &raw.site);
        let last_assessment = required(issues, path, "last_assessment", &raw.last_assessment)
            .and_then(|date| {
                parse_snapshot_date(issues, &join_path(path, "last_assessment"), &date)
            });
        let score = required(issues, path, "score", &raw.score);
        let claimed_color = optional(issues, path, "color", &raw.color);
        let claimed_level = match optional(issues, path, "risk_level", &raw.risk_level) {
            Some(level) => {
                let parsed = RiskLevel::parse(&level);
                if parsed.is_none() {
                    issues.invalid(
                        join_path(path, "risk_level"),
                        format!("unknown risk level '{level}'"),
                    );
                }
                parsed
            }
            None => None,
        };
        if issues.issue_count() != issues_before {
            return None;
        }
        Self::checked(
            site_name?,
            last_assessment?,
            score?,
            claimed_level,
            claimed_color,
            path,
            issues,
        )
    }

    fn checked(
        site_name: String,
        last_assessment: NaiveDate,
        score: f64,
        claimed_level: Option<RiskLevel>,
        claimed_color: Option<String>,
        path: &str,
        issues: &mut IssueCollector,
    ) -> Option<Self> {
        if site_name.trim().is_empty() {
            issues.invalid(join_path(path, "site"), "must not be empty");
            return None;
        }
        let classification = match classify_risk_score(score) {
            Ok(classification) => classification,
            Err(error) => {
                issues.invalid(join_path(path, "score"), error.to_string());
                return None;
            }
        };
        let mut consistent = true;
        if let Some(level) = claimed_level {
            if level != classification.level {
                issues.inconsistent(
                    join_path(path, "risk_level"),
                    format!(
                        "supplied level {} does not match score {score} (classified {})",
                        level.label(),
                        classification.level.label()
                    ),
                );
                consistent = false;
            }
        }
        if let Some(color) = claimed_color {
            if ColorToken::parse(&color) != Some(classification.color) {
                issues.inconsistent(
                    join_path(path, "color"),
                    format!(
                        "supplied color '{color}' does not match score {score} (classified {})",
                        classification.color.hex()
                    ),
                );
                consistent = false;
            }
        }
        consistent.then_some(Self {
            site_name,
            last_assessment,
            score,
            classification,
        })
    }

    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    pub fn last_assessment(&self) -> NaiveDate {
        self.last_assessment
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.classification.level
    }

    pub fn color(&self) -> ColorToken {
        self.classification.color
    }

    pub fn classification(&self) -> RiskClassification {
        self.classification
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemHealth {
    uptime_percent: f64,
    active_monitors: u32,
    critical_alerts: u32,
}

impl SystemHealth {
    pub fn new(
        uptime_percent: f64,
        active_monitors: u32,
        critical_alerts: u32,
    ) -> Result<Self, DashboardError> {
        let raw = RawSystemHealth {
            uptime_percent: Some(RawField::Typed(uptime_percent)),
            active_monitors: Some(RawField::Typed(active_monitors)),
            critical_alerts: Some(RawField::Typed(critical_alerts)),
        };
        construct(|issues| Self::validate(&raw, "system_health", issues))
    }

    fn validate(raw: &RawSystemHealth, path: &str, issues: &mut IssueCollector) -> Option<Self> {
        let uptime_percent = required(issues, path, "uptime_percent", &raw.uptime_percent);
        let active_monitors = required(issues, path, "active_monitors", &raw.active_monitors);
        let critical_alerts = required(issues, path, "critical_alerts", &raw.critical_alerts);
        let uptime_percent = uptime_percent.and_then(|uptime| {
            if uptime.is_finite() && (0.0..=MAX_UPTIME_PERCENT).contains(&uptime) {
                Some(uptime)
            } else {
                issues.invalid(
                    join_path(path, "uptime_percent"),
                    format!("{uptime} is outside [0, {MAX_UPTIME_PERCENT}]"),
                );
                None
            }
        });
        Some(Self {
            uptime_percent: uptime_percent?,
            active_monitors: active_monitors?,
            critical_alerts: critical_alerts?,
        })
    }

    pub fn uptime_percent(&self) -> f64 {
        self.uptime_percent
    }

    pub fn active_monitors(&self) -> u32 {
        self.active_monitors
    }

    pub fn critical_alerts(&self) -> u32 {
        self.critical_alerts
    }
}

fn check_risk_sample_order(samples: &[RiskSample], path: &str, issues: &mut IssueCollector) {
    for (index, pair) in samples.windows(2).enumerate() {
        if pair[1].date < pair[0].date {
            issues.invalid(
                format!("{path}[{}].date", index + 1),
                format!(
                    "risk samples must be in ascending date order ({} follows {})",
                    pair[1].date, pair[0].date
                ),
            );
        }
    }
}

/// One complete, validated set of dashboard records backing a render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    control_safeguard: SafeguardSnapshot,
    site_assessment: AssessmentSnapshot,
    risk_samples: Vec<RiskSample>,
    site_records: Vec<SiteRiskRecord>,
    system_health: SystemHealth,
}

impl DashboardSnapshot {
    pub fn new(
        control_safeguard: SafeguardSnapshot,
        site_assessment: AssessmentSnapshot,
        risk_samples: Vec<RiskSample>,
        site_records: Vec<SiteRiskRecord>,
        system_health: SystemHealth,
    ) -> Result<Self, DashboardError> {
        let mut issues = IssueCollector::default();
        check_risk_sample_order(&risk_samples, "site_risk_for_a_unit", &mut issues);
        issues.into_dashboard_error()?;
        Ok(Self {
            control_safeguard,
            site_assessment,
            risk_samples,
            site_records,
            system_health,
        })
    }

    /// Validates a raw document, reporting every issue at once.
    #[tracing::instrument(level = "debug", skip(raw))]
    pub fn from_raw(raw: &RawDashboardSnapshot) -> Result<Self, SnapshotValidationError> {
        let mut issues = IssueCollector::default();
        match required(&mut issues, "", "schema_version", &raw.schema_version) {
            Some(SNAPSHOT_SCHEMA_VERSION) | None => {}
            Some(version) => issues.invalid(
                "schema_version",
                format!(
                    "unsupported schema version {version} (expected {SNAPSHOT_SCHEMA_VERSION})"
                ),
            ),
        }

        let control_safeguard =
            required(&mut issues, "", "control_safeguard", &raw.control_safeguard).and_then(
                |section| SafeguardSnapshot::validate(&section, "control_safeguard", &mut issues),
            );
        let site_assessment =
            required(&mut issues, "", "site_assessment", &raw.site_assessment).and_then(
                |section| AssessmentSnapshot::validate(&section, "site_assessment", &mut issues),
            );
        let risk_samples =
            required(&mut issues, "", "site_risk_for_a_unit", &raw.site_risk_for_a_unit).map(
                |samples| {
                    samples
                        .iter()
                        .enumerate()
                        .filter_map(|(index, sample)| {
                            RiskSample::validate(
                                sample,
                                &format!("site_risk_for_a_unit[{index}]"),
                                &mut issues,
                            )
                        })
                        .collect::<Vec<_>>()
                },
            );
        if let Some(samples) = &risk_samples {
            check_risk_sample_order(samples, "site_risk_for_a_unit", &mut issues);
        }
        let site_records = required(
            &mut issues,
            "",
            "last_risk_assessment_for_sites",
            &raw.last_risk_assessment_for_sites,
        )
        .map(|records| {
            records
                .iter()
                .enumerate()
                .filter_map(|(index, record)| {
                    SiteRiskRecord::validate(
                        record,
                        &format!("last_risk_assessment_for_sites[{index}]"),
                        &mut issues,
                    )
                })
                .collect::<Vec<_>>()
        });
        let system_health = required(&mut issues, "", "system_health", &raw.system_health)
            .and_then(|section| SystemHealth::validate(&section, "system_health", &mut issues));

        if let Err(error) = issues.finish() {
            tracing::warn!(
                issue_count = error.issues.len(),
                "dashboard snapshot rejected"
            );
            return Err(error);
        }
        let (
            Some(control_safeguard),
            Some(site_assessment),
            Some(risk_samples),
            Some(site_records),
            Some(system_health),
        ) = (
            control_safeguard,
            site_assessment,
            risk_samples,
            site_records,
            system_health,
        )
        else {
            return Err(SnapshotValidationError::invalid_input(
                "",
                "snapshot is incomplete",
            ));
        };
        Ok(Self {
            control_safeguard,
            site_assessment,
            risk_samples,
            site_records,
            system_health,
        })
    }

    pub fn control_safeguard(&self) -> &SafeguardSnapshot {
        &self.control_safeguard
    }

    pub fn site_assessment(&self) -> &AssessmentSnapshot {
        &self.site_assessment
    }

    pub fn risk_samples(&self) -> &[RiskSample] {
        &self.risk_samples
    }

    pub fn site_records(&self) -> &[SiteRiskRecord] {
        &self.site_records
    }

    pub fn system_health(&self) -> &SystemHealth {
        &self.system_health
    }
}
