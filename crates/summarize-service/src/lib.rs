// ---------------------------------------------------------------------------
// Host analysis HTTP service
// ---------------------------------------------------------------------------
//
// `GET /health`, `POST /summarize` and the sample dataset, backed by either the
// rule engine or a chat completion API.

pub mod config;
pub mod engine;
pub mod error;
mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use config::{AiSettings, ServiceConfig};
pub use engine::Engine;
pub use state::AppState;

/// Build the axum Router (useful for testing).
pub fn build_router(state: Arc<AppState>) -> Router {
    let origins: Vec<HeaderValue> = state
        .allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    let body_limit = state.body_limit;
    Router::new()
        .route("/health", get(routes::health))
        .route("/summarize", post(routes::summarize))
        .route("/hosts_dataset.json", get(routes::sample_dataset))
        .layer(cors)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the service and block until shutdown (Ctrl+C).
pub async fn serve(config: ServiceConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(&config)?);
    info!(
        bind = %config.bind,
        mode = %state.engine.mode(),
        model = %config.ai.model,
        "starting host summarizer service"
    );

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("service shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
