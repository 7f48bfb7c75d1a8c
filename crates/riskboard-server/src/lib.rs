//! HTTP host for the risk analytics dashboard.
//!
//! Loads one validated snapshot at startup, shares it read-only across request
//! handlers and renders a fresh `DashboardView` per request.

mod dashboard_controls;
mod dashboard_handlers;
mod server_bootstrap;

pub use server_bootstrap::{
    build_dashboard_router, run_dashboard_server, DashboardServerConfig, DashboardServerState,
    DASHBOARD_HEALTH_ENDPOINT, DEFAULT_DASHBOARD_BIND,
};

#[cfg(test)]
mod tests;
