use axum::{
    Json,
    extract::{Query, State},
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use super::validation::validate_search_params;
use super::{ApiError, AppState, SearchResponse};
use crate::search::RawParams;

/// Collects query pairs into a parameter bag. A repeated `genre_ids` (or
/// `genre_ids[]`) key becomes a list; every other key keeps its last value.
#[must_use]
pub fn query_bag(pairs: Vec<(String, String)>) -> RawParams {
    let mut bag = RawParams::new();
    let mut genre_ids: Vec<Value> = Vec::new();

    for (key, value) in pairs {
        match key.as_str() {
            "genre_ids" | "genre_ids[]" => genre_ids.push(Value::String(value)),
            _ => {
                bag.insert(key, Value::String(value));
            }
        }
    }

    match genre_ids.len() {
        0 => {}
        1 => {
            bag.insert("genre_ids".to_string(), genre_ids.remove(0));
        }
        _ => {
            bag.insert("genre_ids".to_string(), Value::Array(genre_ids));
        }
    }

    bag
}

/// `GET /api/v1/media_items`
pub async fn list_media_items(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<SearchResponse>, ApiError> {
    let raw = query_bag(pairs);
    validate_search_params(&raw)?;

    let outcome = state.search_service().search(&raw).await?;

    let lookup = state
        .genre_service()
        .lookup_for(&outcome.items)
        .await
        .unwrap_or_else(|e| {
            warn!(error = %format!("{e:#}"), "Failed to resolve genres, rendering without them");
            HashMap::new()
        });

    Ok(Json(SearchResponse::from_outcome(outcome, &lookup)))
}
