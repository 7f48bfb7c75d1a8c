use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use riskboard_core::chart_adapter::{build_chart_series, DASHBOARD_CHARTS};
use riskboard_core::{
    BuiltinMetricsProvider, DashboardSnapshot, FixtureMetricsProvider, MetricsProvider,
    SnapshotValidationError, ValidationIssueKind,
};
use riskboard_dashboard_ui::{DashboardTab, DashboardView};
use serde_json::{json, Value};

fn render_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 20).expect("valid date")
}

fn snapshot_document(sites: Value) -> Value {
    json!({
        "schema_version": 1,
        "control_safeguard": {
            "total": 20,
            "active": 15,
            "inactive": 5,
            "critical": 2,
            "trend": [10, 20, 30],
            "monthly_series": [
                { "month": "Jan", "active_controls": 12, "critical_issues": 3 },
                { "month": "Feb", "active_controls": 15, "critical_issues": 2 }
            ]
        },
        "site_assessment": {
            "total": 10,
            "completed": 8,
            "pending": 2,
            "overdue": 1,
            "average_score": 6.4,
            "score_distribution": [
                { "bucket": "good", "count": 6, "color": "blue" },
                { "bucket": "poor", "count": 4 }
            ],
            "monthly_progress": [
                { "month": "Jan", "completed": 3 },
                { "month": "Feb", "completed": 5 }
            ]
        },
        "site_risk_for_a_unit": [
            { "date": "2024-02-01", "risk_level": 5.0 },
            { "date": "2024-03-01", "risk_level": 6.0 }
        ],
        "last_risk_assessment_for_sites": sites,
        "system_health": { "uptime_percent": 97.25, "active_monitors": 40, "critical_alerts": 1 }
    })
}

fn write_snapshot(dir: &Path, name: &str, document: &Value) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_vec_pretty(document).expect("encode snapshot"))
        .expect("write snapshot");
    path
}

fn render(snapshot: DashboardSnapshot, tab: DashboardTab) -> Result<String> {
    let mut view = DashboardView::new(Arc::new(snapshot), render_date());
    Ok(view.set_active_tab(tab)?)
}

#[test]
fn integration_fixture_snapshot_renders_through_full_pipeline() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_snapshot(
        temp.path(),
        "snapshot.json",
        &snapshot_document(json!([
            { "site": "Depot North", "last_assessment": "2024-03-02", "score": 7.0, "risk_level": "High" },
            { "site": "Depot South", "last_assessment": "2024-03-09", "score": 3.99 }
        ])),
    );
    let snapshot = FixtureMetricsProvider::new(&path)
        .load_snapshot()
        .expect("fixture snapshot is valid");
    let html = render(snapshot, DashboardTab::Controls).expect("render");

    assert!(html.contains("data-active-tab=\"controls\""));
    assert!(html.contains("data-site-count=\"2\""));
    assert!(html.contains("data-site=\"Depot North\" data-risk-level=\"high\""));
    assert!(html.contains("data-site=\"Depot South\" data-risk-level=\"low\""));
    assert!(html.contains("data-completion-rate=\"80%\""));
    assert!(html.contains(">+200%<"));
    assert!(html.contains(">+20%<"));
    assert!(html.contains("data-uptime-percent=\"97.25\""));
    assert!(html.contains("data-failed-chart-count=\"0\""));
    assert!(html.contains(">Count: 6<"));
}

#[test]
fn integration_inconsistent_fixture_never_reaches_rendering() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_snapshot(
        temp.path(),
        "snapshot.json",
        &snapshot_document(json!([
            { "site": "Depot North", "last_assessment": "2024-03-02", "score": 2.0, "risk_level": "High" },
            { "site": "", "last_assessment": "03/09/2024", "score": 11.0 }
        ])),
    );
    let error = FixtureMetricsProvider::new(&path)
        .load_snapshot()
        .expect_err("inconsistent fixture is rejected");
    let validation = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<SnapshotValidationError>())
        .expect("validation error in chain");
    assert!(validation.has_kind(ValidationIssueKind::InconsistentRecord));
    assert!(validation.has_kind(ValidationIssueKind::InvalidInput));
    assert!(validation
        .issue_for_path("last_risk_assessment_for_sites[0].risk_level")
        .is_some());
    assert!(validation
        .issue_for_path("last_risk_assessment_for_sites[1].site")
        .is_some());
    assert!(validation
        .issue_for_path("last_risk_assessment_for_sites[1].last_assessment")
        .is_some());
}

#[test]
fn integration_refresh_replaces_the_whole_snapshot() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_snapshot(
        temp.path(),
        "snapshot.json",
        &snapshot_document(json!([
            { "site": "Depot North", "last_assessment": "2024-03-02", "score": 5.5 }
        ])),
    );
    let provider = FixtureMetricsProvider::new(&path);
    let first = provider.load_snapshot().expect("first load");
    assert_eq!(first.site_records().len(), 1);

    write_snapshot(
        temp.path(),
        "snapshot.json",
        &snapshot_document(json!([
            { "site": "Depot North", "last_assessment": "2024-03-02", "score": 5.5 },
            { "site": "Depot East", "last_assessment": "2024-03-05", "score": 9.1 }
        ])),
    );
    let second = provider.load_snapshot().expect("second load");
    assert_eq!(second.site_records().len(), 2);
    assert_eq!(first.site_records().len(), 1);
}

#[test]
fn integration_pipeline_output_is_deterministic_for_one_snapshot() {
    let snapshot = BuiltinMetricsProvider
        .load_snapshot()
        .expect("built-in snapshot is valid");
    let first_series = build_chart_series(&DASHBOARD_CHARTS[3], snapshot.site_records());
    let second_series = build_chart_series(&DASHBOARD_CHARTS[3], snapshot.site_records());
    assert_eq!(first_series, second_series);

    let shared = Arc::new(snapshot);
    let view = DashboardView::new(Arc::clone(&shared), render_date());
    let first = view.render().expect("first render");
    let second = DashboardView::new(shared, render_date())
        .render()
        .expect("second render");
    assert_eq!(first, second);
}
