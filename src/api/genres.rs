use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::validation::validate_media_type;
use super::{ApiError, ApiResponse, AppState, GenreDto, SyncGenresResponse};

#[derive(Debug, Deserialize)]
pub struct GenreQuery {
    pub media_type: Option<String>,
}

impl GenreQuery {
    fn media_type_value(&self) -> Option<Value> {
        self.media_type.clone().map(Value::String)
    }
}

/// `GET /api/v1/genres?media_type=movie|tv`
pub async fn list_genres(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GenreQuery>,
) -> Result<Json<ApiResponse<Vec<GenreDto>>>, ApiError> {
    let kind = validate_media_type(query.media_type_value().as_ref())?;

    let genres = state
        .genre_service()
        .list(kind)
        .await?
        .into_iter()
        .map(GenreDto::from)
        .collect();

    Ok(Json(ApiResponse::success(genres)))
}

/// `POST /api/v1/genres/sync?media_type=movie|tv`
pub async fn sync_genres(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GenreQuery>,
) -> Result<Json<ApiResponse<SyncGenresResponse>>, ApiError> {
    let kind = validate_media_type(query.media_type_value().as_ref())?;

    let synced = state
        .genre_service()
        .sync(kind)
        .await
        .map_err(|e| ApiError::tmdb_error(format!("{e:#}")))?;

    info!(media_type = %kind, synced, "Genre sync requested via API");

    Ok(Json(ApiResponse::success(SyncGenresResponse {
        media_type: kind,
        synced,
    })))
}
