//! Data model, validation and data-shaping for the risk analytics dashboard.
//!
//! Provides the validated snapshot records, the metrics provider seam, and the
//! pure normalizer, risk classifier and chart adapter consumed by the view layer.

pub mod chart_adapter;
pub mod error;
pub mod metrics_provider;
pub mod normalizer;
pub mod palette;
pub mod risk_classifier;
pub mod snapshot;

pub use error::{DashboardError, SnapshotValidationError, ValidationIssue, ValidationIssueKind};
pub use metrics_provider::{
    load_dashboard_snapshot, parse_dashboard_snapshot, BuiltinMetricsProvider,
    FixtureMetricsProvider, MetricsProvider,
};
pub use palette::ColorToken;
pub use risk_classifier::{classify_risk_score, RiskClassification, RiskLevel, ScoreBucket};
pub use snapshot::{DashboardSnapshot, SNAPSHOT_SCHEMA_VERSION};
