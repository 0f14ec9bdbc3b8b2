// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::event_bus::EventBus;
use crate::application::refresh_service::RefreshService;
use crate::domain::range::RangeSelection;
use crate::infrastructure::config::load_config;
use crate::infrastructure::http_repository::HttpSensorRepository;
use crate::presentation::app_state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chart_viewport=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = load_config()?;
    let initial_range = RangeSelection::predefined(&config.backend.default_range)?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(HttpSensorRepository::new(
        config.backend.base_url.clone(),
        Duration::from_secs(config.backend.timeout_secs),
    )?);

    // Create services (application layer)
    let bus = EventBus::new();
    let dashboard_service = DashboardService::new(
        repository,
        bus.clone(),
        config.backend.machine_name.clone(),
        initial_range,
        config.profiles.clone(),
        config.palette.clone(),
    );
    let _refresh = RefreshService::new(
        dashboard_service.clone(),
        Duration::from_secs(config.backend.refresh_secs.max(1)),
    )
    .spawn(&bus);

    // Create application state
    let state = Arc::new(AppState {
        dashboard_service,
        bus,
    });

    // Build router (presentation layer)
    let router = presentation::router(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!(
        "Starting chart-viewport service on {} for machine {}",
        addr,
        config.backend.machine_name
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
