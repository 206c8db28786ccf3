//! Translation between normalized search requests and the upstream
//! `discover` vocabulary.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::clients::tmdb::{ClientError, ContentApi, RawItem};
use crate::domain::{MAX_PAGE, MediaKind, NormalizedItem, NormalizedSearchRequest, SearchPage};
use crate::search::SearchError;

pub struct UpstreamSearchClient {
    api: Arc<dyn ContentApi>,
}

impl UpstreamSearchClient {
    #[must_use]
    pub const fn new(api: Arc<dyn ContentApi>) -> Self {
        Self { api }
    }

    /// Fetches one page of results for `req`.
    ///
    /// No retries: a non-success status fails the current request.
    pub async fn search(&self, req: &NormalizedSearchRequest) -> Result<SearchPage, SearchError> {
        validate_sort(req)?;

        let kind = req.media_kind;
        let query = build_query_params(req);
        let start = Instant::now();

        let result = self.api.discover(kind, &query).await;

        let outcome = if result.is_ok() { "success" } else { "error" };
        let labels = [("media_type", kind.as_str()), ("outcome", outcome)];
        metrics::counter!("search_upstream_requests_total", &labels).increment(1);
        metrics::histogram!("search_upstream_duration_seconds", &labels)
            .record(start.elapsed().as_secs_f64());

        let response = result.map_err(|e| {
            warn!(media_type = %kind, error = %e, "Upstream discover failed");
            match e {
                ClientError::Status { code, .. } => SearchError::Upstream { status: code },
                ClientError::Request(e) | ClientError::Decode(e) => {
                    SearchError::Transport(e.to_string())
                }
            }
        })?;

        let items: Vec<NormalizedItem> = response
            .results
            .into_iter()
            .map(|raw| normalize_item(raw, kind))
            .collect();

        debug!(
            media_type = %kind,
            items = items.len(),
            total_pages = ?response.total_pages,
            "Upstream discover succeeded"
        );

        Ok(SearchPage {
            items,
            total_pages: response.total_pages.unwrap_or(1).min(MAX_PAGE),
            total_results: response.total_results.unwrap_or(0),
        })
    }
}

/// Rejects sort tokens outside the kind's vocabulary.
pub fn validate_sort(req: &NormalizedSearchRequest) -> Result<(), SearchError> {
    if req.media_kind.allows_sort(&req.sort_token) {
        return Ok(());
    }

    Err(SearchError::InvalidSortToken {
        media_type: req.media_kind,
        value: req.sort_token.clone(),
        allowed: req.media_kind.sort_options(),
    })
}

/// Upstream query parameters for `req`. The page is clamped to `1..=500`.
#[must_use]
pub fn build_query_params(req: &NormalizedSearchRequest) -> Vec<(String, String)> {
    let date_field = req.media_kind.date_field();
    let mut query = Vec::new();

    if let Some(start) = req.start_date {
        query.push((format!("{date_field}.gte"), start.format("%Y-%m-%d").to_string()));
    }
    if let Some(end) = req.end_date {
        query.push((format!("{date_field}.lte"), end.format("%Y-%m-%d").to_string()));
    }

    if !req.genre_ids.is_empty() {
        let genres = req
            .genre_ids
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        query.push(("with_genres".to_string(), genres));
    }

    if let Some(min) = req.min_rating {
        query.push(("vote_average.gte".to_string(), min.to_string()));
    }
    if let Some(max) = req.max_rating {
        query.push(("vote_average.lte".to_string(), max.to_string()));
    }

    query.push(("sort_by".to_string(), req.sort_token.clone()));
    query.push(("page".to_string(), req.upstream_page().to_string()));

    query
}

fn normalize_item(raw: RawItem, kind: MediaKind) -> NormalizedItem {
    let (title, release_date) = match kind {
        MediaKind::Movie => (raw.title, raw.release_date),
        MediaKind::Tv => (raw.name, raw.first_air_date),
    };

    NormalizedItem {
        id: raw.id,
        media_type: kind,
        title,
        release_date,
        overview: raw.overview,
        poster_path: raw.poster_path,
        popularity: raw.popularity,
        vote_average: raw.vote_average,
        vote_count: raw.vote_count,
        original_language: raw.original_language,
        adult: raw.adult.unwrap_or(false),
        genre_ids: raw.genre_ids.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_SORT;
    use chrono::NaiveDate;

    fn request(kind: MediaKind) -> NormalizedSearchRequest {
        NormalizedSearchRequest {
            media_kind: kind,
            start_date: None,
            end_date: None,
            genre_ids: vec![],
            min_rating: None,
            max_rating: None,
            sort_token: DEFAULT_SORT.to_string(),
            page: 1,
        }
    }

    fn param<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
        query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn movie_date_range_uses_release_date_axis() {
        let req = NormalizedSearchRequest {
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2020, 12, 31),
            ..request(MediaKind::Movie)
        };
        let query = build_query_params(&req);
        assert_eq!(param(&query, "primary_release_date.gte"), Some("2020-01-01"));
        assert_eq!(param(&query, "primary_release_date.lte"), Some("2020-12-31"));
        assert_eq!(param(&query, "first_air_date.gte"), None);
    }

    #[test]
    fn tv_open_ended_ranges_use_air_date_axis() {
        let start_only = NormalizedSearchRequest {
            start_date: NaiveDate::from_ymd_opt(2019, 6, 1),
            ..request(MediaKind::Tv)
        };
        let query = build_query_params(&start_only);
        assert_eq!(param(&query, "first_air_date.gte"), Some("2019-06-01"));
        assert_eq!(param(&query, "first_air_date.lte"), None);

        let end_only = NormalizedSearchRequest {
            end_date: NaiveDate::from_ymd_opt(2019, 6, 1),
            ..request(MediaKind::Tv)
        };
        let query = build_query_params(&end_only);
        assert_eq!(param(&query, "first_air_date.gte"), None);
        assert_eq!(param(&query, "first_air_date.lte"), Some("2019-06-01"));
    }

    #[test]
    fn unfiltered_request_only_sends_sort_and_page() {
        let query = build_query_params(&request(MediaKind::Movie));
        assert_eq!(
            query,
            vec![
                ("sort_by".to_string(), "popularity.desc".to_string()),
                ("page".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn genres_and_ratings_are_mapped() {
        let req = NormalizedSearchRequest {
            genre_ids: vec![12, 28],
            min_rating: Some(7.5),
            max_rating: Some(9.0),
            ..request(MediaKind::Movie)
        };
        let query = build_query_params(&req);
        assert_eq!(param(&query, "with_genres"), Some("12,28"));
        assert_eq!(param(&query, "vote_average.gte"), Some("7.5"));
        assert_eq!(param(&query, "vote_average.lte"), Some("9"));
    }

    #[test]
    fn page_is_clamped_at_the_boundary() {
        let req = NormalizedSearchRequest {
            page: 1000,
            ..request(MediaKind::Movie)
        };
        assert_eq!(param(&build_query_params(&req), "page"), Some("500"));
        assert_eq!(req.page, 1000);
    }

    #[test]
    fn sort_validation_is_kind_specific() {
        let revenue_tv = NormalizedSearchRequest {
            sort_token: "revenue.desc".to_string(),
            ..request(MediaKind::Tv)
        };
        let err = validate_sort(&revenue_tv).unwrap_err();
        match err {
            SearchError::InvalidSortToken { allowed, .. } => {
                assert_eq!(allowed, MediaKind::Tv.sort_options());
            }
            other => panic!("unexpected error: {other}"),
        }

        let air_date_movie = NormalizedSearchRequest {
            sort_token: "first_air_date.desc".to_string(),
            ..request(MediaKind::Movie)
        };
        assert!(validate_sort(&air_date_movie).is_err());

        let revenue_movie = NormalizedSearchRequest {
            sort_token: "revenue.desc".to_string(),
            ..request(MediaKind::Movie)
        };
        assert!(validate_sort(&revenue_movie).is_ok());
    }

    #[test]
    fn items_are_mapped_by_kind() {
        let raw = RawItem {
            id: 1399,
            title: Some("ignored".to_string()),
            name: Some("Game of Thrones".to_string()),
            release_date: Some("1999-01-01".to_string()),
            first_air_date: Some("2011-04-17".to_string()),
            ..RawItem::default()
        };

        let tv = normalize_item(raw.clone(), MediaKind::Tv);
        assert_eq!(tv.title.as_deref(), Some("Game of Thrones"));
        assert_eq!(tv.release_date.as_deref(), Some("2011-04-17"));
        assert_eq!(tv.media_type, MediaKind::Tv);

        let movie = normalize_item(raw, MediaKind::Movie);
        assert_eq!(movie.title.as_deref(), Some("ignored"));
        assert_eq!(movie.release_date.as_deref(), Some("1999-01-01"));
    }

    #[test]
    fn missing_adult_and_genres_default() {
        let item = normalize_item(
            RawItem {
                id: 1,
                ..RawItem::default()
            },
            MediaKind::Movie,
        );
        assert!(!item.adult);
        assert!(item.genre_ids.is_empty());
    }
}
