// HTTP request handlers
use crate::domain::error::DashboardError;
use crate::presentation::app_state::AppState;
use crate::presentation::renderer::{render_dashboard, render_failure};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/healthz", get(health_check))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Every request is a fresh render pass; nothing is cached between loads.
pub async fn dashboard_page(State(state): State<Arc<AppState>>) -> Response {
    match state.dashboard_service.build_dashboard().await {
        Ok(dashboard) => Html(render_dashboard(&dashboard)).into_response(),
        Err(e) => (status_for(&e), Html(render_failure(&e))).into_response(),
    }
}

fn status_for(error: &DashboardError) -> StatusCode {
    match error {
        DashboardError::Connectivity(_) => StatusCode::BAD_GATEWAY,
        DashboardError::Payload(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
