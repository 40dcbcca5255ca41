//! Notion Attendance Service
//!
//! Creates one attendance page per enrolled student for every class scheduled
//! today in a Notion class database, on demand over HTTP.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod notion;
mod tenancy;
mod workflow;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use notion::NotionClient;
use tenancy::TenantStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TenantStore>,
    pub notion: Arc<NotionClient>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Notion Attendance Service");
    tracing::info!("Tenant store: {:?}", config.store);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (ATTENDANCE_API_PSK). The JSON trigger is open!");
    }
    if config.oauth.client_id.is_none() {
        tracing::info!("OAuth client not configured; /auth routes will report an error");
    }

    let store = tenancy::build_store(&config).await?;
    let notion = Arc::new(NotionClient::new(&config)?);

    let state = AppState {
        store,
        notion,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.config.api_psk.clone();

    // Machine-facing trigger
    let api_routes = Router::new()
        .route("/run-attendance", get(api::run_json).post(api::run_json))
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Browser-facing routes
    let page_routes = Router::new()
        .route("/", get(api::run_html))
        .route("/setup", get(api::setup_form).post(api::save_setup))
        .route("/auth", get(api::start_auth))
        .route("/auth/callback", get(api::auth_callback));

    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(page_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::new())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
