use riskboard_dashboard_ui::DashboardTab;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct DashboardControlsQuery {
    #[serde(default)]
    tab: String,
}

impl DashboardControlsQuery {
    /// Unknown or empty values fall back to the overview tab.
    pub(crate) fn active_tab(&self) -> DashboardTab {
        if self.tab.trim().is_empty() {
            return DashboardTab::default();
        }
        DashboardTab::parse(&self.tab).unwrap_or_else(|| {
            tracing::debug!(tab = %self.tab, "ignoring unknown dashboard tab");
            DashboardTab::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use riskboard_dashboard_ui::DashboardTab;

    use super::DashboardControlsQuery;

    fn query(tab: &str) -> DashboardControlsQuery {
        DashboardControlsQuery {
            tab: tab.to_string(),
        }
    }

    #[test]
    fn unit_active_tab_resolves_known_values() {
        assert_eq!(query("assessments").active_tab(), DashboardTab::Assessments);
        assert_eq!(query("SITES").active_tab(), DashboardTab::Sites);
    }

    #[test]
    fn regression_unknown_or_missing_tab_defaults_to_overview() {
        assert_eq!(query("").active_tab(), DashboardTab::Overview);
        assert_eq!(query("billing").active_tab(), DashboardTab::Overview);
        assert_eq!(
            DashboardControlsQuery::default().active_tab(),
            DashboardTab::Overview
        );
    }
}
