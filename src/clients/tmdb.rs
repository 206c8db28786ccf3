//! Client for the upstream content API (TMDB v3).
//!
//! Only the two read-only operations the search core needs are exposed:
//! listing genres for a media kind and the paginated `discover` endpoint.

use async_trait::async_trait;
use reqwest::{Client, header};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::TmdbConfig;
use crate::domain::MediaKind;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("TMDB API error: Code {code}, Body: {body}")]
    Status { code: u16, body: String },

    #[error("TMDB request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to decode TMDB response: {0}")]
    Decode(reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TmdbGenre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct GenreListResponse {
    #[serde(default)]
    genres: Vec<TmdbGenre>,
}

/// Raw `discover` payload. Every field is optional upstream.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DiscoverResponse {
    pub results: Vec<RawItem>,
    pub total_pages: Option<u32>,
    pub total_results: Option<u64>,
}

/// One movie or TV show as the upstream returns it. Movies carry
/// `title`/`release_date`, shows carry `name`/`first_air_date`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawItem {
    pub id: i64,
    pub title: Option<String>,
    pub name: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub popularity: Option<f64>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
    pub original_language: Option<String>,
    pub adult: Option<bool>,
    pub genre_ids: Option<Vec<i64>>,
}

/// Read-only view of the upstream catalog.
#[async_trait]
pub trait ContentApi: Send + Sync {
    async fn fetch_genres(&self, kind: MediaKind) -> Result<Vec<TmdbGenre>, ClientError>;

    async fn discover(
        &self,
        kind: MediaKind,
        query: &[(String, String)],
    ) -> Result<DiscoverResponse, ClientError>;
}

#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    access_token: Option<String>,
    language: String,
}

impl TmdbClient {
    #[must_use]
    pub fn with_shared_client(client: Client, config: &TmdbConfig) -> Self {
        let access_token = config
            .access_token
            .clone()
            .filter(|token| !token.trim().is_empty());

        if access_token.is_none() {
            warn!("TMDB access token is not configured; upstream calls will be rejected");
        }

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token,
            language: config.language.clone(),
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{path}", self.base_url);
        let request = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json");

        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!(code = status.as_u16(), body = %body, "TMDB API error");
        Err(ClientError::Status {
            code: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl ContentApi for TmdbClient {
    async fn fetch_genres(&self, kind: MediaKind) -> Result<Vec<TmdbGenre>, ClientError> {
        debug!(media_type = %kind, "Fetching TMDB genre list");

        let response = self
            .get(&format!("genre/{kind}/list"))
            .query(&[("language", self.language.as_str())])
            .send()
            .await?;

        let body: GenreListResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(ClientError::Decode)?;
        Ok(body.genres)
    }

    async fn discover(
        &self,
        kind: MediaKind,
        query: &[(String, String)],
    ) -> Result<DiscoverResponse, ClientError> {
        debug!(media_type = %kind, ?query, "Discovering TMDB titles");

        let response = self
            .get(&format!("discover/{kind}"))
            .query(query)
            .send()
            .await?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(ClientError::Decode)
    }
}
