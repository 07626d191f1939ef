//! Router construction and the serve loop.

use crate::backend::{QueryBackend, RemoteBackend};
use crate::config::ServerConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::handlers::{query_handler_get, query_handler_post};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Shared state for request handlers
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn QueryBackend>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(backend: Arc<dyn QueryBackend>, config: ServerConfig) -> Self {
        Self {
            backend,
            config: Arc::new(config),
        }
    }
}

/// Build the endpoint router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/sparql", get(query_handler_get).post(query_handler_post))
        .with_state(state)
}

/// Run the server until the listener fails
pub async fn run(config: ServerConfig) -> ServiceResult<()> {
    let backend = RemoteBackend::new(
        config.backend.endpoint.clone(),
        Duration::from_secs(config.backend.timeout_secs),
    )
    .map_err(|e| ServiceError::configuration(format!("failed to build backend client: {e}")))?;

    let address = format!("{}:{}", config.server.host, config.server.port);
    info!(%address, backend = %config.backend.endpoint, "starting triplecast endpoint");

    let state = AppState::new(Arc::new(backend), config);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| ServiceError::configuration(format!("failed to bind {address}: {e}")))?;

    axum::serve(listener, build_router(state))
        .await
        .map_err(|e| ServiceError::internal(format!("server error: {e}")))
}
