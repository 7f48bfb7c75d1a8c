//! Dashboard page, redirect and health handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use riskboard_core::SNAPSHOT_SCHEMA_VERSION;
use riskboard_dashboard_ui::{DashboardView, DASHBOARD_PATH};
use serde_json::json;

use crate::dashboard_controls::DashboardControlsQuery;
use crate::server_bootstrap::DashboardServerState;

pub(crate) async fn handle_dashboard_page(
    State(state): State<Arc<DashboardServerState>>,
    Query(controls): Query<DashboardControlsQuery>,
) -> Response {
    let mut view = DashboardView::new(Arc::clone(&state.snapshot), state.last_updated);
    match view.set_active_tab(controls.active_tab()) {
        Ok(html) => Html(html).into_response(),
        Err(error) => {
            tracing::error!(error = %error, "dashboard render failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("dashboard render failed: {error}"),
            )
                .into_response()
        }
    }
}

pub(crate) async fn handle_root_redirect() -> Redirect {
    Redirect::to(DASHBOARD_PATH)
}

pub(crate) async fn handle_dashboard_health(
    State(state): State<Arc<DashboardServerState>>,
) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "schema_version": SNAPSHOT_SCHEMA_VERSION,
        "site_count": state.snapshot.site_records().len(),
    }))
}
