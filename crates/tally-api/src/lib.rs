//! JSON HTTP API over the shared ledger
//!
//! Routes are organized into modules:
//! - routes::load: health, status, reload
//! - routes::view: summary, table pages, options, charts
//! - routes::filters: filter, sort and page changes
//! - routes::settings: active configuration

pub mod error;
pub mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tally_config::Config;
use tally_core::Ledger;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<RwLock<Ledger>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, ledger: Arc<RwLock<Ledger>>) -> Self {
        Self {
            ledger,
            config: Arc::new(config),
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::filters::{api_reset_filters, api_set_filter, api_set_page, api_set_sort};
    use routes::load::{api_health, api_reload, api_status};
    use routes::settings::api_settings;
    use routes::view::{api_chart, api_options, api_records, api_view};

    Router::new()
        .route("/api/health", get(api_health))
        .route("/api/status", get(api_status))
        .route("/api/reload", post(api_reload))
        .route("/api/view", get(api_view))
        .route("/api/records", get(api_records))
        .route("/api/options", get(api_options))
        .route("/api/charts/:kind", get(api_chart))
        .route("/api/filters", post(api_set_filter))
        .route("/api/filters/reset", post(api_reset_filters))
        .route("/api/sort", post(api_set_sort))
        .route("/api/page", post(api_set_page))
        .route("/api/settings", get(api_settings))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server and run until Ctrl-C
pub async fn start_server(config: Config, ledger: Arc<RwLock<Ledger>>) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let router = create_router(AppState::new(config, ledger));

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting tally server on http://{}", addr);
    log::info!("  - GET  /api/view, /api/records, /api/options, /api/charts/{{category,monthly}}");
    log::info!("  - POST /api/filters, /api/filters/reset, /api/sort, /api/page, /api/reload");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}
