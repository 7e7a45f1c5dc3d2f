// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_metrics_source::HttpMetricsSource;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config()?;
    tracing::info!("Monitoring API: {}", config.source.url);

    // Create metrics source (infrastructure layer)
    let source = Arc::new(HttpMetricsSource::new(config.source.url));

    // Create services (application layer)
    let dashboard_service = DashboardService::new(source);

    // Create application state
    let state = Arc::new(AppState { dashboard_service });

    // Build router (presentation layer)
    let app = router(state);

    // Start server
    let addr = config.server.bind;
    tracing::info!("Starting ops-dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
