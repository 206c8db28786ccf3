use serde::Serialize;
use std::collections::HashMap;

use crate::domain::{MediaKind, NormalizedItem};
use crate::entities::genres;
use crate::services::{Pagination, SearchOutcome};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreDto {
    pub id: i32,
    pub tmdb_id: i64,
    pub name: String,
    pub media_type: String,
}

impl From<genres::Model> for GenreDto {
    fn from(model: genres::Model) -> Self {
        Self {
            id: model.id,
            tmdb_id: model.tmdb_id,
            name: model.name,
            media_type: model.media_type,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MediaItemDto {
    pub id: i64,
    pub tmdb_id: i64,
    pub media_type: MediaKind,
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub popularity: Option<f64>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
    pub original_language: Option<String>,
    pub adult: bool,
    pub genres: Vec<GenreDto>,
}

impl MediaItemDto {
    /// Renders `item`, keeping only the genres present in `lookup`.
    #[must_use]
    pub fn from_item(
        item: NormalizedItem,
        lookup: &HashMap<(i64, MediaKind), genres::Model>,
    ) -> Self {
        let genres = item
            .genre_ids
            .iter()
            .filter_map(|id| lookup.get(&(*id, item.media_type)))
            .cloned()
            .map(GenreDto::from)
            .collect();

        Self {
            id: item.id,
            tmdb_id: item.id,
            media_type: item.media_type,
            title: item.title,
            release_date: item.release_date,
            overview: item.overview,
            poster_path: item.poster_path,
            popularity: item.popularity,
            vote_average: item.vote_average,
            vote_count: item.vote_count,
            original_language: item.original_language,
            adult: item.adult,
            genres,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub data: Vec<MediaItemDto>,
    pub query_key: String,
    pub cached: bool,
    pub last_updated: Option<String>,
    pub pagination: Pagination,
}

impl SearchResponse {
    #[must_use]
    pub fn from_outcome(
        outcome: SearchOutcome,
        lookup: &HashMap<(i64, MediaKind), genres::Model>,
    ) -> Self {
        Self {
            data: outcome
                .items
                .into_iter()
                .map(|item| MediaItemDto::from_item(item, lookup))
                .collect(),
            query_key: outcome.query_key,
            cached: outcome.cached,
            last_updated: outcome.last_updated.map(|ts| ts.to_rfc3339()),
            pagination: outcome.pagination,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SyncGenresResponse {
    pub media_type: MediaKind,
    pub synced: usize,
}
