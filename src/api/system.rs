use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub cached_queries: u64,
    pub version: &'static str,
    pub uptime: u64,
}

/// `GET /api/health`
///
/// Reports database connectivity and the number of cached query pages.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let database = state.store().ping().await.is_ok();
    let cached_queries = if database {
        state.store().count_cache_entries().await.unwrap_or(0)
    } else {
        0
    };

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::success(HealthResponse {
            status: if database { "ok" } else { "degraded" },
            database,
            cached_queries,
            version: env!("CARGO_PKG_VERSION"),
            uptime: state.start_time.elapsed().as_secs(),
        })),
    )
        .into_response()
}
