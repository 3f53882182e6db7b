//! services/dashboard/src/bin/dashboard.rs

use dashboard_lib::{
    adapters::HttpBackendAdapter,
    config::Config,
    controller::DashboardController,
    error::DashboardError,
    web::{router, AppState},
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), DashboardError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting dashboard...");

    // --- 2. Initialize the Backend Adapter ---
    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;
    let backend = Arc::new(HttpBackendAdapter::new(http, config.api_base.clone()));
    info!("Using backend at {}", config.api_base);

    // --- 3. Build the Controller and Shared State ---
    let controller = Arc::new(DashboardController::new(backend, &config));
    let app_state = Arc::new(AppState::new(controller));

    // --- 4. Start the Server ---
    let app = router(app_state);
    info!("Dashboard available at http://{}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Dashboard stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}
