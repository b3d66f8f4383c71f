// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::assessment_service::AssessmentService;
use crate::application::clock::{Clock, SystemClock};
use crate::application::streaming_service::StreamingAssessmentService;
use crate::application::weather_cache::CachedWeatherSource;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::gps_repository::GpsRepository;
use crate::infrastructure::weather_client::OpenWeatherClient;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Create upstream clients (infrastructure layer)
    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .build()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let repository = Arc::new(GpsRepository::new(
        http.clone(),
        config.gps.base_url,
        config.gps.username,
        config.gps.password,
    ));
    if config.weather.api_key.is_none() {
        tracing::warn!("weather.api_key not set, vehicles will be assessed without weather");
    }
    let weather = Arc::new(CachedWeatherSource::new(
        Arc::new(OpenWeatherClient::new(http, config.weather.base_url, config.weather.api_key)),
        chrono::Duration::seconds(config.weather.ttl_secs),
        clock.clone(),
    ));

    // Create services (application layer)
    let concurrency = config.assessment.concurrency;
    let dev_routes = config.assessment.dev_routes;
    let assessment_service = AssessmentService::new(repository, weather, clock, config.assessment);
    let streaming_service = StreamingAssessmentService::new(assessment_service.clone(), concurrency);

    // Create application state
    let state = Arc::new(AppState {
        assessment_service,
        streaming_service,
    });

    // Build router (presentation layer)
    let app = router(state, dev_routes).layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting fleet-risk service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
