//! Dashboard server bootstrap and router wiring.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use chrono::NaiveDate;
use riskboard_core::{
    BuiltinMetricsProvider, DashboardSnapshot, FixtureMetricsProvider, MetricsProvider,
};
use riskboard_dashboard_ui::DASHBOARD_PATH;
use tokio::net::TcpListener;

use crate::dashboard_handlers::{
    handle_dashboard_health, handle_dashboard_page, handle_root_redirect,
};

pub const DEFAULT_DASHBOARD_BIND: &str = "127.0.0.1:8791";
pub const DASHBOARD_HEALTH_ENDPOINT: &str = "/dashboard/health";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardServerConfig {
    pub bind: String,
    /// Snapshot fixture to serve; the bundled dataset is used when `None`.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for DashboardServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_DASHBOARD_BIND.to_string(),
            snapshot_path: None,
        }
    }
}

impl DashboardServerConfig {
    fn metrics_provider(&self) -> Box<dyn MetricsProvider + Send + Sync> {
        match &self.snapshot_path {
            Some(path) => Box::new(FixtureMetricsProvider::new(path.clone())),
            None => Box::new(BuiltinMetricsProvider),
        }
    }

    fn snapshot_source(&self) -> String {
        self.snapshot_path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "builtin".to_string())
    }
}

/// Read-only state shared by every request handler.
#[derive(Debug)]
pub struct DashboardServerState {
    pub(crate) snapshot: Arc<DashboardSnapshot>,
    pub(crate) last_updated: NaiveDate,
}

impl DashboardServerState {
    pub fn new(snapshot: DashboardSnapshot, last_updated: NaiveDate) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
            last_updated,
        }
    }
}

pub async fn run_dashboard_server(config: DashboardServerConfig) -> Result<()> {
    let bind_addr = config
        .bind
        .parse::<SocketAddr>()
        .with_context(|| format!("invalid --bind '{}'", config.bind))?;
    let snapshot = config
        .metrics_provider()
        .load_snapshot()
        .with_context(|| {
            format!(
                "failed to load dashboard snapshot from {}",
                config.snapshot_source()
            )
        })?;
    let last_updated = chrono::Local::now().date_naive();

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind dashboard server on {bind_addr}"))?;
    let local_addr = listener
        .local_addr()
        .context("failed to resolve bound dashboard server address")?;
    tracing::info!(
        addr = %local_addr,
        endpoint = DASHBOARD_PATH,
        snapshot = %config.snapshot_source(),
        sites = snapshot.site_records().len(),
        "dashboard server listening"
    );

    let state = Arc::new(DashboardServerState::new(snapshot, last_updated));
    let app = build_dashboard_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("dashboard server exited unexpectedly")?;
    tracing::info!("dashboard server stopped");
    Ok(())
}

pub fn build_dashboard_router(state: Arc<DashboardServerState>) -> Router {
    Router::new()
        .route("/", get(handle_root_redirect))
        .route(DASHBOARD_PATH, get(handle_dashboard_page))
        .route(DASHBOARD_HEALTH_ENDPOINT, get(handle_dashboard_health))
        .with_state(state)
}
