use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::StatusCode;
use chrono::NaiveDate;
use reqwest::Client;
use riskboard_core::{BuiltinMetricsProvider, MetricsProvider};
use tokio::net::TcpListener;

use crate::{
    build_dashboard_router, run_dashboard_server, DashboardServerConfig, DashboardServerState,
    DASHBOARD_HEALTH_ENDPOINT,
};

fn test_state() -> Arc<DashboardServerState> {
    let snapshot = BuiltinMetricsProvider
        .load_snapshot()
        .expect("built-in snapshot is valid");
    let last_updated = NaiveDate::from_ymd_opt(2024, 4, 20).expect("valid date");
    Arc::new(DashboardServerState::new(snapshot, last_updated))
}

async fn spawn_test_server(
    state: Arc<DashboardServerState>,
) -> Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("bind ephemeral listener")?;
    let addr = listener.local_addr().context("resolve listener addr")?;
    let app = build_dashboard_router(state);
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    Ok((addr, handle))
}

#[tokio::test]
async fn functional_dashboard_endpoint_returns_rendered_html() {
    let (addr, handle) = spawn_test_server(test_state()).await.expect("spawn server");

    let response = Client::new()
        .get(format!("http://{addr}/dashboard"))
        .send()
        .await
        .expect("send request");
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.contains("text/html"));
    let body = response.text().await.expect("read dashboard body");
    assert!(body.contains("id=\"riskboard-shell\""));
    assert!(body.contains("data-active-tab=\"overview\""));
    assert!(body.contains("data-chart-count=\"5\""));
    assert!(body.contains("Last updated: April 20, 2024"));

    handle.abort();
}

#[tokio::test]
async fn functional_tab_query_selects_active_tab() {
    let (addr, handle) = spawn_test_server(test_state()).await.expect("spawn server");
    let client = Client::new();

    let body = client
        .get(format!("http://{addr}/dashboard?tab=assessments"))
        .send()
        .await
        .expect("send request")
        .text()
        .await
        .expect("read body");
    assert!(body.contains("data-active-tab=\"assessments\""));
    assert!(body.contains("data-tab=\"assessments\" aria-selected=\"true\""));

    let body = client
        .get(format!("http://{addr}/dashboard?tab=unknown"))
        .send()
        .await
        .expect("send request")
        .text()
        .await
        .expect("read body");
    assert!(body.contains("data-active-tab=\"overview\""));

    handle.abort();
}

#[tokio::test]
async fn functional_root_redirects_to_dashboard() {
    let (addr, handle) = spawn_test_server(test_state()).await.expect("spawn server");

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("build client");
    let response = client
        .get(format!("http://{addr}/"))
        .send()
        .await
        .expect("send request");
    assert!(response.status().is_redirection());
    let location = response
        .headers()
        .get("location")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert_eq!(location, "/dashboard");

    handle.abort();
}

#[tokio::test]
async fn functional_health_endpoint_reports_snapshot_summary() {
    let (addr, handle) = spawn_test_server(test_state()).await.expect("spawn server");

    let response = Client::new()
        .get(format!("http://{addr}{DASHBOARD_HEALTH_ENDPOINT}"))
        .send()
        .await
        .expect("send request");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = response
        .json::<serde_json::Value>()
        .await
        .expect("parse health payload");
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["schema_version"], 1);
    assert_eq!(payload["site_count"], 7);

    handle.abort();
}

#[tokio::test]
async fn regression_invalid_snapshot_fails_startup_with_context() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("snapshot.json");
    std::fs::write(&path, "{\"schema_version\": 1}").expect("write snapshot");

    let error = run_dashboard_server(DashboardServerConfig {
        bind: "127.0.0.1:0".to_string(),
        snapshot_path: Some(path),
    })
    .await
    .expect_err("invalid snapshot fails startup");
    let rendered = format!("{error:#}");
    assert!(rendered.contains("failed to load dashboard snapshot"));
    assert!(rendered.contains("control_safeguard"));
}

#[tokio::test]
async fn regression_invalid_bind_address_is_rejected() {
    let error = run_dashboard_server(DashboardServerConfig {
        bind: "not-an-address".to_string(),
        snapshot_path: None,
    })
    .await
    .expect_err("invalid bind fails");
    assert!(error.to_string().contains("invalid --bind"));
}
