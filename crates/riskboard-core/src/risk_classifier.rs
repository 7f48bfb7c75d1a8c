//! Score-to-severity classification and assessment score buckets.
//!
//! `classify_risk_score` is the only place severity and badge color are
//! decided; site records derive both from their score through it.

use crate::error::DashboardError;
use crate::palette::ColorToken;
use crate::snapshot::SiteRiskRecord;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;
pub const MEDIUM_RISK_THRESHOLD: f64 = 4.0;
pub const HIGH_RISK_THRESHOLD: f64 = 7.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn color(self) -> ColorToken {
        match self {
            Self::Low => ColorToken::Green,
            Self::Medium => ColorToken::Amber,
            Self::High => ColorToken::Red,
        }
    }

    pub fn badge_class(self) -> &'static str {
        match self {
            Self::Low => "badge-low",
            Self::Medium => "badge-medium",
            Self::High => "badge-high",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(trimmed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskClassification {
    pub level: RiskLevel,
    pub color: ColorToken,
}

/// Rejects non-finite scores and scores outside `[0, 10]`.
pub fn ensure_score_in_range(field: &str, score: f64) -> Result<f64, DashboardError> {
    if !score.is_finite() {
        return Err(DashboardError::invalid_input(format!(
            "{field} must be a finite number"
        )));
    }
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(DashboardError::invalid_input(format!(
            "{field} {score} is outside [{MIN_SCORE}, {MAX_SCORE}]"
        )));
    }
    Ok(score)
}

/// Maps a risk score to its severity level and badge color.
#[tracing::instrument(level = "debug")]
pub fn classify_risk_score(score: f64) -> Result<RiskClassification, DashboardError> {
    let score = ensure_score_in_range("risk score", score)?;
    let level = if score < MEDIUM_RISK_THRESHOLD {
        RiskLevel::Low
    } else if score < HIGH_RISK_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    };
    Ok(RiskClassification {
        level,
        color: level.color(),
    })
}

/// Assessment-score ranges used by the distribution chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScoreBucket {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl ScoreBucket {
    pub const ALL: [ScoreBucket; 5] = [
        ScoreBucket::Excellent,
        ScoreBucket::Good,
        ScoreBucket::Fair,
        ScoreBucket::Poor,
        ScoreBucket::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
            Self::Critical => "critical",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent (9-10)",
            Self::Good => "Good (7-8)",
            Self::Fair => "Fair (5-6)",
            Self::Poor => "Poor (3-4)",
            Self::Critical => "Critical (0-2)",
        }
    }

    pub fn color(self) -> ColorToken {
        match self {
            Self::Excellent => ColorToken::Green,
            Self::Good => ColorToken::Blue,
            Self::Fair => ColorToken::Amber,
            Self::Poor => ColorToken::Red,
            Self::Critical => ColorToken::DarkRed,
        }
    }

    /// Inclusive lower bound of the bucket.
    pub fn lower_bound(self) -> f64 {
        match self {
            Self::Excellent => 9.0,
            Self::Good => 7.0,
            Self::Fair => 5.0,
            Self::Poor => 3.0,
            Self::Critical => 0.0,
        }
    }

    /// Accepts the bucket key (`good`) or its display label (`Good (7-8)`).
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ALL.into_iter().find(|bucket| {
            bucket.as_str().eq_ignore_ascii_case(trimmed)
                || bucket.label().eq_ignore_ascii_case(trimmed)
        })
    }
}

/// Places an assessment score into its distribution bucket.
#[tracing::instrument(level = "debug")]
pub fn classify_assessment_score(score: f64) -> Result<ScoreBucket, DashboardError> {
    let score = ensure_score_in_range("assessment score", score)?;
    Ok(ScoreBucket::ALL
        .into_iter()
        .find(|bucket| score >= bucket.lower_bound())
        .unwrap_or(ScoreBucket::Critical))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiskLevelTally {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl RiskLevelTally {
    pub fn count(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::Low => self.low,
            RiskLevel::Medium => self.medium,
            RiskLevel::High => self.high,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.medium + self.high
    }
}

/// Counts site records per severity level.
pub fn tally_risk_levels(records: &[SiteRiskRecord]) -> RiskLevelTally {
    records
        .iter()
        .fold(RiskLevelTally::default(), |mut tally, record| {
            match record.risk_level() {
                RiskLevel::Low => tally.low += 1,
                RiskLevel::Medium => tally.medium += 1,
                RiskLevel::High => tally.high += 1,
            }
            tally
        })
}
