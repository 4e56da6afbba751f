//! REST API endpoints.
//!
//! Axum-based HTTP API over the scouting store. Every read endpoint builds a
//! fresh [`Snapshot`] and recomputes its view; nothing derived is cached.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::models::TeamId;
use crate::storage::{ScoutStore, Snapshot, StorageError};
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Run a store operation on the blocking pool.
pub async fn with_store<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&ScoutStore) -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    let store = state.store.clone();
    let result = tokio::task::spawn_blocking(move || op(&store))
        .await
        .map_err(|e| ApiError::Internal(format!("Store task failed: {}", e)))?;
    Ok(result?)
}

/// Read the current snapshot from the store.
pub async fn load_snapshot(state: &AppState) -> Result<Snapshot, ApiError> {
    with_store(state, |store| store.snapshot()).await
}

/// Parse a team path or query parameter.
pub fn parse_team(raw: &str) -> Result<TeamId, ApiError> {
    TeamId::normalize(raw).ok_or_else(|| ApiError::BadRequest("Empty team number".to_string()))
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods([Method::GET, Method::PUT]);
    if origin == "*" {
        return layer.allow_origin(Any).allow_headers(Any);
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => layer
            .allow_origin(AllowOrigin::exact(value))
            .allow_headers(Any),
        Err(_) => {
            warn!("Invalid CORS origin {:?}; allowing any origin", origin);
            layer.allow_origin(Any).allow_headers(Any)
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .merge(routes::analytics::routes())
        .merge(routes::teams::routes())
        .merge(routes::matches::routes())
        .merge(routes::lists::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
