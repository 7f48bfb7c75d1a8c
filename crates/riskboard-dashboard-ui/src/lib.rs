//! Leptos SSR rendering for the risk analytics dashboard.
//!
//! `DashboardView` owns the only interactive state (the active tab) and renders
//! one snapshot into HTML carrying `data-component` / `data-*` contract markers.

use std::sync::Arc;

use chrono::NaiveDate;
use leptos::prelude::*;
use riskboard_core::chart_adapter::{
    format_chart_value, format_date_label, ChartSeries, DateLabelContext, SeriesColor,
};
use riskboard_core::snapshot::SystemHealth;
use riskboard_core::{DashboardError, DashboardSnapshot, RiskLevel, SNAPSHOT_SCHEMA_VERSION};

pub mod view_model;

pub use view_model::{
    compose_dashboard_view_model, ActiveSitesCard, ChartPanel, ControlSafeguardCard,
    DashboardViewModel, PercentChange, RiskTrendCard, SiteAssessmentCard, SiteListRow,
    TrendDirection, SPARKLINE_MIN_HEIGHT_PX,
};

pub const DASHBOARD_PATH: &str = "/dashboard";
pub const DASHBOARD_TITLE: &str = "Risk Analytics Dashboard";
const DASHBOARD_SUBTITLE: &str = "Real-time monitoring and insights";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DashboardTab {
    #[default]
    Overview,
    Controls,
    Assessments,
    Sites,
}

impl DashboardTab {
    pub const ALL: [DashboardTab; 4] = [
        DashboardTab::Overview,
        DashboardTab::Controls,
        DashboardTab::Assessments,
        DashboardTab::Sites,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Controls => "controls",
            Self::Assessments => "assessments",
            Self::Sites => "sites",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Controls => "Controls",
            Self::Assessments => "Assessments",
            Self::Sites => "Sites",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|tab| tab.as_str().eq_ignore_ascii_case(trimmed))
    }

    fn href(self) -> String {
        format!("{DASHBOARD_PATH}?tab={}", self.as_str())
    }
}

/// View state for one dashboard session over a shared snapshot.
#[derive(Debug, Clone)]
pub struct DashboardView {
    snapshot: Arc<DashboardSnapshot>,
    last_updated: NaiveDate,
    active_tab: DashboardTab,
}

impl DashboardView {
    pub fn new(snapshot: Arc<DashboardSnapshot>, last_updated: NaiveDate) -> Self {
        Self {
            snapshot,
            last_updated,
            active_tab: DashboardTab::default(),
        }
    }

    pub fn active_tab(&self) -> DashboardTab {
        self.active_tab
    }

    /// Switches the active tab and re-renders.
    pub fn set_active_tab(&mut self, tab: DashboardTab) -> Result<String, DashboardError> {
        if tab != self.active_tab {
            tracing::debug!(
                from = self.active_tab.as_str(),
                to = tab.as_str(),
                "dashboard tab changed"
            );
        }
        self.active_tab = tab;
        self.render()
    }

    pub fn view_model(&self) -> Result<DashboardViewModel, DashboardError> {
        compose_dashboard_view_model(&self.snapshot, self.last_updated)
    }

    pub fn render(&self) -> Result<String, DashboardError> {
        let view_model = self.view_model()?;
        Ok(render_dashboard_html(&view_model, self.active_tab))
    }
}

fn percent_change_label(change: Option<PercentChange>) -> String {
    change
        .map(|change| change.label())
        .unwrap_or_else(|| "n/a".to_string())
}

fn percent_change_direction(change: Option<PercentChange>) -> &'static str {
    change
        .map(|change| change.direction.as_str())
        .unwrap_or("none")
}

fn render_tab_strip(active_tab: DashboardTab) -> AnyView {
    let tabs = DashboardTab::ALL
        .into_iter()
        .map(|tab| {
            let selected = if tab == active_tab { "true" } else { "false" };
            let tab_id = format!("riskboard-tab-{}", tab.as_str());
            view! {
                <a
                    id=tab_id
                    role="tab"
                    href={tab.href()}
                    data-tab={tab.as_str()}
                    aria-selected=selected
                >
                    {tab.label()}
                </a>
            }
        })
        .collect_view();
    view! {
        <nav
            id="riskboard-tabs"
            role="tablist"
            aria-label="Dashboard sections"
            data-active-tab={active_tab.as_str()}
        >
            {tabs}
        </nav>
    }
    .into_any()
}

fn render_control_safeguard_card(card: &ControlSafeguardCard) -> AnyView {
    let bar_count = card.sparkline.len().to_string();
    let min_height_value = format_chart_value(SPARKLINE_MIN_HEIGHT_PX);
    let bars = card
        .sparkline
        .iter()
        .map(|bar| {
            let height_value = format!("{:.1}", bar.height_percent);
            let style = format!(
                "height: max({}px, {:.1}%)",
                format_chart_value(bar.min_height_px),
                bar.height_percent
            );
            view! {
                <span class="sparkline-bar" data-height-percent=height_value style=style></span>
            }
        })
        .collect_view();
    let change_label = percent_change_label(card.trend_change);
    let change_direction = percent_change_direction(card.trend_change);
    view! {
        <article
            id="riskboard-card-control-safeguard"
            data-component="StatCard"
            data-card="control-safeguard"
            data-total={card.total.to_string()}
            data-active={card.active.to_string()}
            data-critical={card.critical.to_string()}
        >
            <h2>"Control Safeguard"</h2>
            <p class="stat-value">{card.total.to_string()}</p>
            <span class="stat-badge" data-trend-direction=change_direction>{change_label}</span>
            <p class="stat-detail">
                {format!("{} active, {} critical", card.active, card.critical)}
            </p>
            <div
                id="riskboard-control-sparkline"
                data-component="Sparkline"
                data-bar-count=bar_count
                data-min-height-px=min_height_value
            >
                {bars}
            </div>
        </article>
    }
    .into_any()
}

fn render_site_assessment_card(card: &SiteAssessmentCard) -> AnyView {
    let completion_rate = card
        .completion_rate_percent
        .map(|rate| format!("{rate}%"))
        .unwrap_or_else(|| "n/a".to_string());
    let average_score = format_chart_value(card.average_score);
    view! {
        <article
            id="riskboard-card-site-assessment"
            data-component="StatCard"
            data-card="site-assessment"
            data-total={card.total.to_string()}
            data-completed={card.completed.to_string()}
            data-pending={card.pending.to_string()}
            data-overdue={card.overdue.to_string()}
            data-completion-rate={completion_rate.clone()}
        >
            <h2>"Site Assessment"</h2>
            <p class="stat-value">{card.total.to_string()}</p>
            <span class="stat-badge">{completion_rate.clone()}</span>
            <p class="stat-detail">
                {format!("{} completed, {} pending", card.completed, card.pending)}
            </p>
            <p
                class="stat-detail"
                data-average-score={average_score.clone()}
                data-average-bucket={card.average_bucket.as_str()}
            >
                {format!("Average score {average_score} ({})", card.average_bucket.label())}
            </p>
        </article>
    }
    .into_any()
}

fn render_risk_trend_card(card: &RiskTrendCard) -> AnyView {
    let current_value = card
        .current
        .map(|sample| format_chart_value(sample.risk_level()))
        .unwrap_or_else(|| "n/a".to_string());
    let current_date = card
        .current
        .map(|sample| format_date_label(sample.date(), DateLabelContext::Tooltip))
        .unwrap_or_default();
    let baseline_date = card
        .baseline
        .map(|sample| format_date_label(sample.date(), DateLabelContext::Tooltip))
        .unwrap_or_default();
    let change_label = percent_change_label(card.change);
    let change_direction = percent_change_direction(card.change);
    view! {
        <article
            id="riskboard-card-risk-trend"
            data-component="StatCard"
            data-card="risk-trend"
            data-current-risk={current_value.clone()}
            data-baseline-date=baseline_date
        >
            <h2>"Risk Trend"</h2>
            <p class="stat-value">{current_value.clone()}</p>
            <span class="stat-badge" data-trend-direction=change_direction>{change_label}</span>
            <p class="stat-detail">{current_date}</p>
        </article>
    }
    .into_any()
}

fn render_active_sites_card(card: &ActiveSitesCard) -> AnyView {
    let levels = RiskLevel::ALL
        .into_iter()
        .map(|level| {
            let count = card.tally.count(level).to_string();
            view! {
                <li data-risk-level={level.as_str()} data-count={count.clone()}>
                    {format!("{}: {count}", level.label())}
                </li>
            }
        })
        .collect_view();
    view! {
        <article
            id="riskboard-card-active-sites"
            data-component="StatCard"
            data-card="active-sites"
            data-site-count={card.site_count.to_string()}
        >
            <h2>"Active Sites"</h2>
            <p class="stat-value">{card.site_count.to_string()}</p>
            <ul class="stat-breakdown">{levels}</ul>
        </article>
    }
    .into_any()
}

fn render_chart_points(chart_id: &str, series: &ChartSeries) -> AnyView {
    series
        .points
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let point_id = format!("riskboard-chart-{chart_id}-point-{index}");
            let values = point
                .values
                .iter()
                .map(|value| {
                    let display = format_chart_value(value.value);
                    view! {
                        <span
                            class="chart-value"
                            data-series=value.series_name
                            data-value={display.clone()}
                            data-color={value.color.hex()}
                        >
                            {display.clone()}
                        </span>
                    }
                })
                .collect_view();
            let tooltip_lines = point
                .tooltip_lines
                .iter()
                .map(|line| view! { <span class="tooltip-line">{line.clone()}</span> })
                .collect_view();
            view! {
                <li
                    id=point_id
                    data-axis-label={point.axis_label.clone()}
                    data-tooltip-label={point.tooltip_label.clone()}
                >
                    <span class="chart-axis-label">{point.axis_label.clone()}</span>
                    {values}
                    <span class="chart-tooltip" role="tooltip">{tooltip_lines}</span>
                </li>
            }
        })
        .collect_view()
        .into_any()
}

fn render_chart_panel(panel: &ChartPanel) -> AnyView {
    let definition = panel.definition;
    let section_id = format!("riskboard-chart-{}", definition.id);
    match &panel.series {
        Ok(series) => {
            let legend = definition
                .selection
                .series()
                .map(|selection| {
                    let color = match selection.color {
                        SeriesColor::Fixed(color) => color.hex(),
                        SeriesColor::PerRecord => "per-record",
                    };
                    view! {
                        <li data-series=selection.name data-color=color>{selection.name}</li>
                    }
                })
                .collect_view();
            let point_count = series.points.len().to_string();
            let points = render_chart_points(definition.id, series);
            view! {
                <section
                    id=section_id
                    data-component="Chart"
                    data-chart-id=definition.id
                    data-chart-kind={definition.kind.as_str()}
                    data-chart-status="ok"
                    data-point-count=point_count
                >
                    <h3>{definition.title}</h3>
                    <ul class="chart-legend">{legend}</ul>
                    <ol class="chart-points">{points}</ol>
                </section>
            }
            .into_any()
        }
        Err(error) => view! {
            <section
                id=section_id
                data-component="ChartError"
                data-chart-id=definition.id
                data-chart-kind={definition.kind.as_str()}
                data-chart-status="error"
            >
                <h3>{definition.title}</h3>
                <p class="chart-error" role="alert">{error.to_string()}</p>
            </section>
        }
        .into_any(),
    }
}

fn render_site_list(rows: &[SiteListRow]) -> AnyView {
    let row_count = rows.len().to_string();
    let items = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let row_id = format!("riskboard-site-row-{index}");
            let badge_class = format!("badge {}", row.level.badge_class());
            view! {
                <li
                    id=row_id
                    data-site={row.site_name.clone()}
                    data-risk-level={row.level.as_str()}
                >
                    <span class="site-avatar" aria-hidden="true">{row.initial.clone()}</span>
                    <span class="site-name">{row.site_name.clone()}</span>
                    <span class="site-date">{row.date_label.clone()}</span>
                    <span class="site-score">{row.score_label.clone()}</span>
                    <span class=badge_class data-color={row.level.color().hex()}>
                        {row.level.label()}
                    </span>
                </li>
            }
        })
        .collect_view();
    view! {
        <section id="riskboard-site-list" data-component="SiteRiskList" data-row-count=row_count>
            <h2>"Site Risk Assessments"</h2>
            <ul>{items}</ul>
        </section>
    }
    .into_any()
}

fn render_system_health(health: &SystemHealth) -> AnyView {
    let uptime = format!("{}%", format_chart_value(health.uptime_percent()));
    let monitors = health.active_monitors().to_string();
    let alerts = health.critical_alerts().to_string();
    view! {
        <section
            id="riskboard-system-health"
            data-component="SystemHealth"
            data-uptime-percent={format_chart_value(health.uptime_percent())}
            data-active-monitors={monitors.clone()}
            data-critical-alerts={alerts.clone()}
        >
            <h2>"System Health"</h2>
            <dl>
                <dt>"Uptime"</dt>
                <dd>{uptime}</dd>
                <dt>"Active Monitors"</dt>
                <dd>{monitors.clone()}</dd>
                <dt>"Critical Alerts"</dt>
                <dd>{alerts.clone()}</dd>
            </dl>
        </section>
    }
    .into_any()
}

/// Renders a composed view model to an HTML string.
pub fn render_dashboard_html(view_model: &DashboardViewModel, active_tab: DashboardTab) -> String {
    let last_updated_iso = view_model.last_updated.format("%Y-%m-%d").to_string();
    let last_updated_label = format!(
        "Last updated: {}",
        format_date_label(view_model.last_updated, DateLabelContext::Tooltip)
    );
    let failed_chart_count = view_model
        .charts
        .iter()
        .filter(|panel| panel.series.is_err())
        .count()
        .to_string();
    let charts = view_model
        .charts
        .iter()
        .map(render_chart_panel)
        .collect_view();

    let shell = view! {
        <div
            id="riskboard-shell"
            data-app="riskboard"
            data-schema-version={SNAPSHOT_SCHEMA_VERSION.to_string()}
            data-active-tab={active_tab.as_str()}
        >
            <header id="riskboard-header">
                <h1>{DASHBOARD_TITLE}</h1>
                <p id="riskboard-subtitle">{DASHBOARD_SUBTITLE}</p>
                <p id="riskboard-last-updated" data-last-updated=last_updated_iso>
                    {last_updated_label}
                </p>
            </header>
            {render_tab_strip(active_tab)}
            <main id="riskboard-main">
                <section id="riskboard-summary-cards" data-card-count="4">
                    {render_control_safeguard_card(&view_model.control_safeguard)}
                    {render_site_assessment_card(&view_model.site_assessment)}
                    {render_risk_trend_card(&view_model.risk_trend)}
                    {render_active_sites_card(&view_model.active_sites)}
                </section>
                <section
                    id="riskboard-charts"
                    data-chart-count={view_model.charts.len().to_string()}
                    data-failed-chart-count=failed_chart_count
                >
                    {charts}
                </section>
                {render_site_list(&view_model.site_rows)}
                {render_system_health(&view_model.system_health)}
            </main>
        </div>
    };
    shell.to_html()
}
