//! Derived card, chart and list models for one render pass.

use chrono::{Months, NaiveDate};
use riskboard_core::chart_adapter::{
    build_chart_series, format_chart_value, format_date_label, ChartDefinition, ChartError,
    ChartSeries, DateLabelContext, ASSESSMENT_SCORE_DISTRIBUTION_CHART,
    CONTROL_SAFEGUARD_TRENDS_CHART, LATEST_RISK_BY_SITE_CHART, MONTHLY_ASSESSMENT_PROGRESS_CHART,
    SITE_RISK_OVER_TIME_CHART,
};
use riskboard_core::normalizer::{scale_sparkline, SparklineBar};
use riskboard_core::risk_classifier::{
    classify_assessment_score, tally_risk_levels, RiskLevelTally, ScoreBucket,
};
use riskboard_core::snapshot::{RiskSample, SiteRiskRecord, SystemHealth};
use riskboard_core::{DashboardError, DashboardSnapshot, RiskLevel};

pub const SPARKLINE_MIN_HEIGHT_PX: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

impl TrendDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Flat => "flat",
        }
    }
}

/// Whole-percent change between two readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PercentChange {
    pub percent: i64,
    pub direction: TrendDirection,
}

impl PercentChange {
    /// `None` when the baseline is zero.
    pub fn between(baseline: f64, current: f64) -> Option<Self> {
        if baseline == 0.0 || !baseline.is_finite() || !current.is_finite() {
            return None;
        }
        let percent = ((current - baseline) / baseline * 100.0).round() as i64;
        let direction = match percent.signum() {
            1 => TrendDirection::Up,
            -1 => TrendDirection::Down,
            _ => TrendDirection::Flat,
        };
        Some(Self { percent, direction })
    }

    pub fn label(&self) -> String {
        if self.percent > 0 {
            format!("+{}%", self.percent)
        } else {
            format!("{}%", self.percent)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlSafeguardCard {
    pub total: u32,
    pub active: u32,
    pub critical: u32,
    pub sparkline: Vec<SparklineBar>,
    pub trend_change: Option<PercentChange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteAssessmentCard {
    pub total: u32,
    pub completed: u32,
    pub pending: u32,
    pub overdue: u32,
    pub average_score: f64,
    pub average_bucket: ScoreBucket,
    pub completion_rate_percent: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskTrendCard {
    pub current: Option<RiskSample>,
    pub baseline: Option<RiskSample>,
    pub change: Option<PercentChange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSitesCard {
    pub site_count: usize,
    pub tally: RiskLevelTally,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteListRow {
    pub site_name: String,
    pub initial: String,
    pub date_label: String,
    pub score_label: String,
    pub level: RiskLevel,
}

/// A chart and its build outcome; a failed chart renders an error marker in place.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPanel {
    pub definition: ChartDefinition,
    pub series: Result<ChartSeries, ChartError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardViewModel {
    pub last_updated: NaiveDate,
    pub control_safeguard: ControlSafeguardCard,
    pub site_assessment: SiteAssessmentCard,
    pub risk_trend: RiskTrendCard,
    pub active_sites: ActiveSitesCard,
    pub charts: Vec<ChartPanel>,
    pub site_rows: Vec<SiteListRow>,
    pub system_health: SystemHealth,
}

fn completion_rate_percent(completed: u32, total: u32) -> Option<u32> {
    if total == 0 {
        return None;
    }
    Some((f64::from(completed) / f64::from(total) * 100.0).round() as u32)
}

/// Latest sample and the newest sample at least one calendar month before it.
fn risk_trend_card(samples: &[RiskSample]) -> RiskTrendCard {
    let current = samples.last().copied();
    let baseline = current.and_then(|current| {
        let cutoff = current.date().checked_sub_months(Months::new(1))?;
        samples
            .iter()
            .rev()
            .find(|sample| sample.date() <= cutoff)
            .copied()
    });
    let change = match (baseline, current) {
        (Some(baseline), Some(current)) => {
            PercentChange::between(baseline.risk_level(), current.risk_level())
        }
        _ => None,
    };
    RiskTrendCard {
        current,
        baseline,
        change,
    }
}

/// Second word's first letter (`Site Alpha` -> `A`), else the name's first letter.
fn site_initial(site_name: &str) -> String {
    let mut words = site_name.split_whitespace();
    let first = words.next();
    words
        .next()
        .or(first)
        .and_then(|word| word.chars().next())
        .map(|initial| initial.to_uppercase().collect::<String>())
        .unwrap_or_default()
}

fn site_list_row(record: &SiteRiskRecord) -> SiteListRow {
    SiteListRow {
        site_name: record.site_name().to_string(),
        initial: site_initial(record.site_name()),
        date_label: format_date_label(record.last_assessment(), DateLabelContext::Axis),
        score_label: format_chart_value(record.score()),
        level: record.risk_level(),
    }
}

fn chart_panel(
    definition: ChartDefinition,
    series: Result<ChartSeries, ChartError>,
) -> ChartPanel {
    if let Err(error) = &series {
        tracing::warn!(chart = definition.id, error = %error, "chart failed to build");
    }
    ChartPanel { definition, series }
}

fn build_chart_panels(snapshot: &DashboardSnapshot) -> Vec<ChartPanel> {
    let safeguard = snapshot.control_safeguard();
    let assessment = snapshot.site_assessment();
    vec![
        chart_panel(
            CONTROL_SAFEGUARD_TRENDS_CHART,
            build_chart_series(&CONTROL_SAFEGUARD_TRENDS_CHART, safeguard.monthly_series()),
        ),
        chart_panel(
            ASSESSMENT_SCORE_DISTRIBUTION_CHART,
            build_chart_series(
                &ASSESSMENT_SCORE_DISTRIBUTION_CHART,
                assessment.score_distribution(),
            ),
        ),
        chart_panel(
            SITE_RISK_OVER_TIME_CHART,
            build_chart_series(&SITE_RISK_OVER_TIME_CHART, snapshot.risk_samples()),
        ),
        chart_panel(
            LATEST_RISK_BY_SITE_CHART,
            build_chart_series(&LATEST_RISK_BY_SITE_CHART, snapshot.site_records()),
        ),
        chart_panel(
            MONTHLY_ASSESSMENT_PROGRESS_CHART,
            build_chart_series(
                &MONTHLY_ASSESSMENT_PROGRESS_CHART,
                assessment.monthly_progress(),
            ),
        ),
    ]
}

/// Computes every derived value of a render pass from one snapshot.
#[tracing::instrument(level = "debug", skip(snapshot))]
pub fn compose_dashboard_view_model(
    snapshot: &DashboardSnapshot,
    last_updated: NaiveDate,
) -> Result<DashboardViewModel, DashboardError> {
    let safeguard = snapshot.control_safeguard();
    let trend = safeguard.trend();
    let trend_change = match (trend.first(), trend.last()) {
        (Some(first), Some(last)) => PercentChange::between(*first, *last),
        _ => None,
    };
    let control_safeguard = ControlSafeguardCard {
        total: safeguard.total(),
        active: safeguard.active(),
        critical: safeguard.critical(),
        sparkline: scale_sparkline(trend, SPARKLINE_MIN_HEIGHT_PX)?,
        trend_change,
    };

    let assessment = snapshot.site_assessment();
    let site_assessment = SiteAssessmentCard {
        total: assessment.total(),
        completed: assessment.completed(),
        pending: assessment.pending(),
        overdue: assessment.overdue(),
        average_score: assessment.average_score(),
        average_bucket: classify_assessment_score(assessment.average_score())?,
        completion_rate_percent: completion_rate_percent(
            assessment.completed(),
            assessment.total(),
        ),
    };

    let site_records = snapshot.site_records();
    Ok(DashboardViewModel {
        last_updated,
        control_safeguard,
        site_assessment,
        risk_trend: risk_trend_card(snapshot.risk_samples()),
        active_sites: ActiveSitesCard {
            site_count: site_records.len(),
            tally: tally_risk_levels(site_records),
        },
        charts: build_chart_panels(snapshot),
        site_rows: site_records.iter().map(site_list_row).collect(),
        system_health: *snapshot.system_health(),
    })
}
