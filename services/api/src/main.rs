mod error;
mod issues;
mod jira;
mod metrics;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use deskpulse_common::types::ServiceInfo;
use deskpulse_config::{init_tracing, AppConfig};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;

use jira::client::{JiraClient, JiraClientConfig};

#[derive(Clone)]
pub struct AppState {
    pub jira: JiraClient,
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn info() -> Json<ServiceInfo> {
    Json(ServiceInfo::new("deskpulse-api"))
}

async fn up_probe() -> impl IntoResponse {
    let body = "\
# HELP deskpulse_up Service up indicator\n\
# TYPE deskpulse_up gauge\n\
deskpulse_up 1\n";

    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        body,
    )
}

fn build_router(state: AppState) -> Router {
    // The dashboard is served elsewhere; accept any origin like the
    // tracker-facing deployments do.
    Router::new()
        .route("/health", get(health))
        .route("/info", get(info))
        .route("/metrics", get(up_probe))
        .merge(issues::router())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    init_tracing("info");

    let config = AppConfig::from_env().expect("failed to load config");
    let jira_config = JiraClientConfig::from_env().expect("missing Jira configuration");
    tracing::info!(
        service = "deskpulse-api",
        project = %jira_config.project_key,
        "starting"
    );

    let jira = JiraClient::new(jira_config).expect("failed to build Jira client");
    let state = AppState { jira };

    let app = build_router(state);
    let addr: SocketAddr = config.bind_addr().parse().expect("invalid bind address");

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
