//! Declarative field selection from record collections into render-ready chart series.
//!
//! A chart is described by a [`ChartDefinition`]: which record field drives the
//! x-axis and which numeric fields become series. [`build_chart_series`] walks the
//! records in supplied order and produces one [`ChartPoint`] per record, with axis
//! labels and tooltip lines already formatted. Failures stay local to one chart.

use chrono::NaiveDate;
use thiserror::Error;

use crate::palette::ColorToken;
use crate::snapshot::{
    MonthlyControlPoint, MonthlyProgressPoint, RiskSample, ScoreDistributionEntry,
    SiteRiskRecord, SNAPSHOT_DATE_FORMAT,
};

const AXIS_DATE_FORMAT: &str = "%b %-d";
const TOOLTIP_DATE_FORMAT: &str = "%B %-d, %Y";

/// A single field read from a chart record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

/// Record types that can feed a chart expose their fields by key.
pub trait ChartRecord {
    fn field(&self, key: &str) -> Option<FieldValue>;

    /// Color for series configured with [`SeriesColor::PerRecord`].
    fn record_color(&self) -> Option<ColorToken> {
        None
    }
}

impl ChartRecord for MonthlyControlPoint {
    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "month" => Some(FieldValue::Text(self.month().to_string())),
            "activeControls" => Some(FieldValue::Number(f64::from(self.active_controls()))),
            "criticalIssues" => Some(FieldValue::Number(f64::from(self.critical_issues()))),
            _ => None,
        }
    }
}

impl ChartRecord for MonthlyProgressPoint {
    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "month" => Some(FieldValue::Text(self.month().to_string())),
            "completed" => Some(FieldValue::Number(f64::from(self.completed()))),
            _ => None,
        }
    }
}

impl ChartRecord for ScoreDistributionEntry {
    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "name" => Some(FieldValue::Text(self.label().to_string())),
            "value" => Some(FieldValue::Number(f64::from(self.count()))),
            _ => None,
        }
    }

    fn record_color(&self) -> Option<ColorToken> {
        Some(self.color())
    }
}

impl ChartRecord for RiskSample {
    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "date" => Some(FieldValue::Date(self.date())),
            "riskLevel" => Some(FieldValue::Number(self.risk_level())),
            _ => None,
        }
    }
}

impl ChartRecord for SiteRiskRecord {
    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "site" => Some(FieldValue::Text(self.site_name().to_string())),
            "lastAssessment" => Some(FieldValue::Date(self.last_assessment())),
            "score" => Some(FieldValue::Number(self.score())),
            "riskLevel" => Some(FieldValue::Text(self.risk_level().label().to_string())),
            _ => None,
        }
    }

    fn record_color(&self) -> Option<ColorToken> {
        Some(self.color())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Area,
    Bar,
    Donut,
}

impl ChartKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Area => "area",
            Self::Bar => "bar",
            Self::Donut => "donut",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisFormat {
    Text,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesColor {
    Fixed(ColorToken),
    PerRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesSelection {
    pub key: &'static str,
    pub name: &'static str,
    pub color: SeriesColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSelection {
    pub x_key: &'static str,
    pub x_format: AxisFormat,
    pub primary: SeriesSelection,
    pub secondary: Option<SeriesSelection>,
}

impl FieldSelection {
    pub fn series(&self) -> impl Iterator<Item = &SeriesSelection> {
        std::iter::once(&self.primary).chain(self.secondary.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub kind: ChartKind,
    pub selection: FieldSelection,
}

pub const CONTROL_SAFEGUARD_TRENDS_CHART: ChartDefinition = ChartDefinition {
    id: "control-safeguard-trends",
    title: "Control Safeguard Trends",
    kind: ChartKind::Line,
    selection: FieldSelection {
        x_key: "month",
        x_format: AxisFormat::Text,
        primary: SeriesSelection {
            key: "activeControls",
            name: "Active Controls",
            color: SeriesColor::Fixed(ColorToken::Green),
        },
        secondary: Some(SeriesSelection {
            key: "criticalIssues",
            name: "Critical Issues",
            color: SeriesColor::Fixed(ColorToken::Red),
        }),
    },
};

pub const ASSESSMENT_SCORE_DISTRIBUTION_CHART: ChartDefinition = ChartDefinition {
    id: "assessment-score-distribution",
    title: "Assessment Score Distribution",
    kind: ChartKind::Donut,
    selection: FieldSelection {
        x_key: "name",
        x_format: AxisFormat::Text,
        primary: SeriesSelection {
            key: "value",
            name: "Count",
            color: SeriesColor::PerRecord,
        },
        secondary: None,
    },
};

pub const SITE_RISK_OVER_TIME_CHART: ChartDefinition = ChartDefinition {
    id: "site-risk-over-time",
    title: "Site Risk Over Time",
    kind: ChartKind::Area,
    selection: FieldSelection {
        x_key: "date",
        x_format: AxisFormat::Date,
        primary: SeriesSelection {
            key: "riskLevel",
            name: "Risk Level",
            color: SeriesColor::Fixed(ColorToken::Purple),
        },
        secondary: None,
    },
};

pub const LATEST_RISK_BY_SITE_CHART: ChartDefinition = ChartDefinition {
    id: "latest-risk-by-site",
    title: "Latest Risk Assessment by Site",
    kind: ChartKind::Bar,
    selection: FieldSelection {
        x_key: "site",
        x_format: AxisFormat::Text,
        primary: SeriesSelection {
            key: "score",
            name: "Risk Score",
            color: SeriesColor::PerRecord,
        },
        secondary: None,
    },
};

pub const MONTHLY_ASSESSMENT_PROGRESS_CHART: ChartDefinition = ChartDefinition {
    id: "monthly-assessment-progress",
    title: "Monthly Assessment Progress",
    kind: ChartKind::Bar,
    selection: FieldSelection {
        x_key: "month",
        x_format: AxisFormat::Text,
        primary: SeriesSelection {
            key: "completed",
            name: "Assessments Completed",
            color: SeriesColor::Fixed(ColorToken::Blue),
        },
        secondary: None,
    },
};

/// The dashboard's charts in display order.
pub const DASHBOARD_CHARTS: [ChartDefinition; 5] = [
    CONTROL_SAFEGUARD_TRENDS_CHART,
    ASSESSMENT_SCORE_DISTRIBUTION_CHART,
    SITE_RISK_OVER_TIME_CHART,
    LATEST_RISK_BY_SITE_CHART,
    MONTHLY_ASSESSMENT_PROGRESS_CHART,
];

/// One series value at a point; also the unit a tooltip line is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesValue {
    pub series_name: &'static str,
    pub value: f64,
    pub color: ColorToken,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub axis_label: String,
    pub tooltip_label: String,
    pub values: Vec<SeriesValue>,
    pub tooltip_lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub definition: ChartDefinition,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    #[error("chart '{chart}': record {index} has no field '{key}'")]
    UnknownField {
        chart: &'static str,
        index: usize,
        key: &'static str,
    },
    #[error("chart '{chart}': field '{key}' of record {index} is not numeric")]
    NonNumericField {
        chart: &'static str,
        index: usize,
        key: &'static str,
    },
    #[error("chart '{chart}': '{raw}' in record {index} is not an ISO-8601 date")]
    InvalidDate {
        chart: &'static str,
        index: usize,
        raw: String,
    },
    #[error("chart '{chart}': record {index} carries no color for series '{series}'")]
    MissingRecordColor {
        chart: &'static str,
        index: usize,
        series: &'static str,
    },
}

impl ChartError {
    pub fn chart_id(&self) -> &'static str {
        match self {
            Self::UnknownField { chart, .. }
            | Self::NonNumericField { chart, .. }
            | Self::InvalidDate { chart, .. }
            | Self::MissingRecordColor { chart, .. } => *chart,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLabelContext {
    Axis,
    Tooltip,
}

pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), SNAPSHOT_DATE_FORMAT).ok()
}

/// `Mar 15` on the axis, `March 15, 2024` in tooltips.
pub fn format_date_label(date: NaiveDate, context: DateLabelContext) -> String {
    let format = match context {
        DateLabelContext::Axis => AXIS_DATE_FORMAT,
        DateLabelContext::Tooltip => TOOLTIP_DATE_FORMAT,
    };
    date.format(format).to_string()
}

/// Integers print without a fraction, other reals in shortest round-trip form.
pub fn format_chart_value(value: f64) -> String {
    format!("{value}")
}

/// Point label first, then one `"{series}: {value}"` line per entry.
pub fn format_tooltip(point_label: &str, entries: &[SeriesValue]) -> Vec<String> {
    std::iter::once(point_label.to_string())
        .chain(entries.iter().map(|entry| {
            format!("{}: {}", entry.series_name, format_chart_value(entry.value))
        }))
        .collect()
}

pub fn format_donut_tooltip(bucket_label: &str, count: f64) -> Vec<String> {
    vec![
        bucket_label.to_string(),
        format!("Count: {}", format_chart_value(count)),
    ]
}

fn point_labels(
    definition: &ChartDefinition,
    index: usize,
    value: FieldValue,
) -> Result<(String, String), ChartError> {
    let selection = &definition.selection;
    match (selection.x_format, value) {
        (AxisFormat::Date, FieldValue::Date(date)) => Ok((
            format_date_label(date, DateLabelContext::Axis),
            format_date_label(date, DateLabelContext::Tooltip),
        )),
        (AxisFormat::Date, FieldValue::Text(raw)) => {
            let date = parse_iso_date(&raw).ok_or(ChartError::InvalidDate {
                chart: definition.id,
                index,
                raw,
            })?;
            Ok((
                format_date_label(date, DateLabelContext::Axis),
                format_date_label(date, DateLabelContext::Tooltip),
            ))
        }
        (AxisFormat::Date, FieldValue::Number(number)) => Err(ChartError::InvalidDate {
            chart: definition.id,
            index,
            raw: format_chart_value(number),
        }),
        (AxisFormat::Text, FieldValue::Text(label)) => Ok((label.clone(), label)),
        (AxisFormat::Text, FieldValue::Number(number)) => {
            let label = format_chart_value(number);
            Ok((label.clone(), label))
        }
        (AxisFormat::Text, FieldValue::Date(date)) => {
            let label = date.format(SNAPSHOT_DATE_FORMAT).to_string();
            Ok((label.clone(), label))
        }
    }
}

fn series_value<R: ChartRecord>(
    definition: &ChartDefinition,
    index: usize,
    record: &R,
    series: &SeriesSelection,
) -> Result<SeriesValue, ChartError> {
    let value = match record.field(series.key) {
        Some(FieldValue::Number(value)) => value,
        Some(_) => {
            return Err(ChartError::NonNumericField {
                chart: definition.id,
                index,
                key: series.key,
            })
        }
        None => {
            return Err(ChartError::UnknownField {
                chart: definition.id,
                index,
                key: series.key,
            })
        }
    };
    let color = match series.color {
        SeriesColor::Fixed(color) => color,
        SeriesColor::PerRecord => {
            record
                .record_color()
                .ok_or(ChartError::MissingRecordColor {
                    chart: definition.id,
                    index,
                    series: series.name,
                })?
        }
    };
    Ok(SeriesValue {
        series_name: series.name,
        value,
        color,
    })
}

/// Selects the configured fields from `records`, one point per record in order.
#[tracing::instrument(
    level = "debug",
    skip(definition, records),
    fields(chart = definition.id, records = records.len())
)]
pub fn build_chart_series<R: ChartRecord>(
    definition: &ChartDefinition,
    records: &[R],
) -> Result<ChartSeries, ChartError> {
    let selection = &definition.selection;
    let points = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let x_value = record.field(selection.x_key).ok_or(ChartError::UnknownField {
                chart: definition.id,
                index,
                key: selection.x_key,
            })?;
            let (axis_label, tooltip_label) = point_labels(definition, index, x_value)?;
            let values = selection
                .series()
                .map(|series| series_value(definition, index, record, series))
                .collect::<Result<Vec<_>, _>>()?;
            let tooltip_lines = match (definition.kind, values.first()) {
                (ChartKind::Donut, Some(slice)) => {
                    format_donut_tooltip(&tooltip_label, slice.value)
                }
                _ => format_tooltip(&tooltip_label, &values),
            };
            Ok(ChartPoint {
                axis_label,
                tooltip_label,
                values,
                tooltip_lines,
            })
        })
        .collect::<Result<Vec<_>, ChartError>>()?;
    Ok(ChartSeries {
        definition: *definition,
        points,
    })
}
