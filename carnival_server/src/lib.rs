pub mod config;
pub mod replicate;
pub mod routes;

use axum::Router;
use axum::routing::{get, post};
use carnival::InferenceService;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub use crate::config::{ModelRef, ReplicateConfig, ServerConfig};
pub use crate::replicate::ReplicateClient;
pub use crate::routes::AppState;

/// All routes, backed by `service`. Separate from `start_server` so it can be
/// mounted elsewhere.
pub fn router(service: Arc<dyn InferenceService>, grid_size: u32) -> Router {
    let state = AppState { service, grid_size };
    Router::new()
        .route("/api/predict", post(routes::predict))
        .route("/coordinates", post(routes::coordinates))
        .route("/healthz", get(routes::healthz))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `cfg.bind_addr` and serves the router on a background task.
pub async fn start_server(
    cfg: ServerConfig,
    service: Arc<dyn InferenceService>,
) -> anyhow::Result<tokio::task::JoinHandle<()>> {
    let app = router(service.clone(), cfg.grid_size);
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    let local_addr = listener.local_addr()?;

    if cfg.replicate.api_token.is_none() {
        warn!("REPLICATE_API_TOKEN is unset; inference calls will fail");
    }
    info!(
        addr = %local_addr,
        service = service.name(),
        mnist = %cfg.replicate.mnist_model,
        latent = %cfg.replicate.latent_model,
        axis_order = %cfg.replicate.axis_order,
        "Carnival server listening on http://{local_addr}"
    );

    let server = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            error!(error = %err, "server stopped");
        }
    });

    Ok(server)
}
