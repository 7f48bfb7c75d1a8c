use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::SnapshotValidationError;
use crate::snapshot::{DashboardSnapshot, RawDashboardSnapshot};

const BUILTIN_SNAPSHOT_JSON: &str = include_str!("../data/builtin_snapshot.json");

/// Supplies one validated snapshot per load.
pub trait MetricsProvider {
    fn load_snapshot(&self) -> Result<DashboardSnapshot>;
}

/// The bundled demonstration dataset.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinMetricsProvider;

impl MetricsProvider for BuiltinMetricsProvider {
    fn load_snapshot(&self) -> Result<DashboardSnapshot> {
        parse_dashboard_snapshot(BUILTIN_SNAPSHOT_JSON).context("invalid built-in snapshot")
    }
}

/// Reads a snapshot document from disk on every load.
#[derive(Debug, Clone)]
pub struct FixtureMetricsProvider {
    path: PathBuf,
}

impl FixtureMetricsProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MetricsProvider for FixtureMetricsProvider {
    fn load_snapshot(&self) -> Result<DashboardSnapshot> {
        load_dashboard_snapshot(&self.path)
    }
}

pub fn parse_dashboard_snapshot(raw: &str) -> Result<DashboardSnapshot> {
    let document = serde_json::from_str::<RawDashboardSnapshot>(raw)
        .map_err(|error| {
            SnapshotValidationError::invalid_input(
                "",
                format!("malformed snapshot document: {error}"),
            )
        })
        .context("failed to parse dashboard snapshot")?;
    let snapshot = DashboardSnapshot::from_raw(&document)?;
    tracing::debug!(
        sites = snapshot.site_records().len(),
        risk_samples = snapshot.risk_samples().len(),
        "dashboard snapshot validated"
    );
    Ok(snapshot)
}

pub fn load_dashboard_snapshot(path: &Path) -> Result<DashboardSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    parse_dashboard_snapshot(&raw).with_context(|| format!("invalid snapshot {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{
        load_dashboard_snapshot, parse_dashboard_snapshot, BuiltinMetricsProvider,
        FixtureMetricsProvider, MetricsProvider,
    };
    use crate::error::{SnapshotValidationError, ValidationIssueKind};
    use crate::risk_classifier::{tally_risk_levels, RiskLevel};

    fn fixture_path(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("testdata")
            .join("dashboard-snapshot")
            .join(name)
    }

    fn validation_error(error: &anyhow::Error) -> &SnapshotValidationError {
        error
            .chain()
            .find_map(|cause| cause.downcast_ref::<SnapshotValidationError>())
            .expect("validation error in chain")
    }

    #[test]
    fn functional_builtin_snapshot_matches_reference_dataset() {
        let snapshot = BuiltinMetricsProvider
            .load_snapshot()
            .expect("built-in snapshot is valid");
        let safeguard = snapshot.control_safeguard();
        assert_eq!(safeguard.total(), 247);
        assert_eq!(safeguard.active() + safeguard.inactive(), safeguard.total());
        assert_eq!(safeguard.trend().len(), 8);
        assert_eq!(safeguard.monthly_series().len(), 8);

        let assessment = snapshot.site_assessment();
        assert_eq!(assessment.score_distribution().len(), 5);
        assert_eq!(assessment.distributed_count(), u64::from(assessment.total()));
        assert_eq!(assessment.monthly_progress().len(), 6);

        assert_eq!(snapshot.risk_samples().len(), 8);
        assert_eq!(snapshot.site_records().len(), 7);
        let tally = tally_risk_levels(snapshot.site_records());
        assert_eq!(tally.count(RiskLevel::Low), 3);
        assert_eq!(tally.count(RiskLevel::Medium), 2);
        assert_eq!(tally.count(RiskLevel::High), 2);
        assert_eq!(snapshot.system_health().critical_alerts(), 3);

        let document: serde_json::Value =
            serde_json::from_str(include_str!("../data/builtin_snapshot.json"))
                .expect("built-in snapshot is json");
        let sites = document["last_risk_assessment_for_sites"]
            .as_array()
            .expect("site list");
        assert!(sites.iter().all(|site| site.get("color").is_some()));
    }

    #[test]
    fn functional_fixture_provider_loads_valid_fixture() {
        let provider = FixtureMetricsProvider::new(fixture_path("valid-minimal.json"));
        let snapshot = provider.load_snapshot().expect("valid fixture");
        assert_eq!(snapshot.site_records().len(), 2);
        assert_eq!(snapshot.site_records()[1].risk_level(), RiskLevel::High);
    }

    #[test]
    fn regression_missing_sections_are_reported_together() {
        let error = load_dashboard_snapshot(&fixture_path("missing-sections.json"))
            .expect_err("missing sections fail");
        let validation = validation_error(&error);
        assert!(validation.issue_for_path("site_assessment").is_some());
        assert!(validation.issue_for_path("system_health").is_some());
        assert!(validation
            .issues
            .iter()
            .all(|issue| issue.kind == ValidationIssueKind::InvalidInput));
    }

    #[test]
    fn regression_inconsistent_site_color_is_flagged() {
        let error = load_dashboard_snapshot(&fixture_path("inconsistent-site-color.json"))
            .expect_err("inconsistent color fails");
        let validation = validation_error(&error);
        let issue = validation
            .issue_for_path("last_risk_assessment_for_sites[0].color")
            .expect("color issue");
        assert_eq!(issue.kind, ValidationIssueKind::InconsistentRecord);
    }

    #[test]
    fn regression_unordered_risk_samples_are_rejected() {
        let error = load_dashboard_snapshot(&fixture_path("unordered-risk-samples.json"))
            .expect_err("unordered samples fail");
        let validation = validation_error(&error);
        assert!(validation
            .issue_for_path("site_risk_for_a_unit[1].date")
            .is_some());
    }

    #[test]
    fn regression_unreadable_and_malformed_files_carry_context() {
        let error = load_dashboard_snapshot(&fixture_path("does-not-exist.json"))
            .expect_err("missing file fails");
        assert!(error.to_string().contains("failed to read snapshot"));

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ \"schema_version\": 1, ").expect("write fixture");
        let error = load_dashboard_snapshot(&path).expect_err("malformed json fails");
        assert!(error.to_string().contains("invalid snapshot"));
        assert!(format!("{error:#}").contains("failed to parse dashboard snapshot"));
        assert!(validation_error(&error).has_kind(ValidationIssueKind::InvalidInput));
    }

    #[test]
    fn regression_mistyped_fields_are_aggregated_as_invalid_input() {
        let raw = include_str!("../data/builtin_snapshot.json")
            .replace("\"count\": 45", "\"count\": -1")
            .replace("\"score\": 6.2", "\"score\": \"high\"")
            .replace("\"active_monitors\": 247", "\"active_monitors\": 4294967296");
        let error = parse_dashboard_snapshot(&raw).expect_err("mistyped fields fail");
        let validation = validation_error(&error);
        for path in [
            "site_assessment.score_distribution[0].count",
            "last_risk_assessment_for_sites[0].score",
            "system_health.active_monitors",
        ] {
            let issue = validation
                .issue_for_path(path)
                .unwrap_or_else(|| panic!("missing issue for {path}"));
            assert_eq!(issue.kind, ValidationIssueKind::InvalidInput);
        }
        assert_eq!(validation.issues.len(), 3);
    }

    #[test]
    fn regression_assessment_count_invariants_are_reported_together() {
        let error = load_dashboard_snapshot(&fixture_path("invalid-assessment-distribution.json"))
            .expect_err("broken assessment counts fail");
        let validation = validation_error(&error);
        for path in [
            "site_assessment.completed",
            "site_assessment.score_distribution",
            "site_assessment.score_distribution[1].bucket",
        ] {
            let issue = validation
                .issue_for_path(path)
                .unwrap_or_else(|| panic!("missing issue for {path}"));
            assert_eq!(issue.kind, ValidationIssueKind::InvalidInput);
        }
        let color = validation
            .issue_for_path("site_assessment.score_distribution[0].color")
            .expect("bucket color issue");
        assert_eq!(color.kind, ValidationIssueKind::InconsistentRecord);
    }

    #[test]
    fn regression_unsupported_schema_version_is_invalid_input() {
        let raw = std::fs::read_to_string(fixture_path("valid-minimal.json"))
            .expect("read fixture")
            .replace("\"schema_version\": 1", "\"schema_version\": 2");
        let error = parse_dashboard_snapshot(&raw).expect_err("schema 2 fails");
        let validation = validation_error(&error);
        assert!(validation.issue_for_path("schema_version").is_some());
    }
}
