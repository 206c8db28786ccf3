//! Domain types for catalog search with strong typing.
//!
//! The search core works exclusively on these types: a raw parameter bag is
//! turned into a [`NormalizedSearchRequest`] once, and every later stage
//! (fingerprinting, staleness, upstream translation) reads from it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sort token used when the request does not name one.
pub const DEFAULT_SORT: &str = "popularity.desc";

/// Highest page the upstream catalog will serve.
pub const MAX_PAGE: u32 = 500;

/// Items per upstream page.
pub const PER_PAGE: u32 = 20;

const MOVIE_SORT_OPTIONS: &[&str] = &[
    "original_title.asc",
    "original_title.desc",
    "popularity.asc",
    "popularity.desc",
    "revenue.asc",
    "revenue.desc",
    "primary_release_date.asc",
    "primary_release_date.desc",
    "title.asc",
    "title.desc",
    "vote_average.asc",
    "vote_average.desc",
    "vote_count.asc",
    "vote_count.desc",
];

const TV_SORT_OPTIONS: &[&str] = &[
    "first_air_date.asc",
    "first_air_date.desc",
    "name.asc",
    "name.desc",
    "original_name.asc",
    "original_name.desc",
    "popularity.asc",
    "popularity.desc",
    "vote_average.asc",
    "vote_average.desc",
    "vote_count.asc",
    "vote_count.desc",
];

/// Kind of catalog entry being searched.
///
/// # Examples
///
/// ```rust
/// use marquee::domain::MediaKind;
///
/// let kind: MediaKind = "tv".parse().unwrap();
/// assert_eq!(kind, MediaKind::Tv);
/// assert_eq!(kind.as_str(), "tv");
/// assert!("anime".parse::<MediaKind>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    pub const ALL: [Self; 2] = [Self::Movie, Self::Tv];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }

    /// Sort tokens the upstream accepts for this kind.
    #[must_use]
    pub const fn sort_options(self) -> &'static [&'static str] {
        match self {
            Self::Movie => MOVIE_SORT_OPTIONS,
            Self::Tv => TV_SORT_OPTIONS,
        }
    }

    #[must_use]
    pub fn allows_sort(self, token: &str) -> bool {
        self.sort_options().contains(&token)
    }

    /// Upstream filter axis used for date ranges.
    #[must_use]
    pub const fn date_field(self) -> &'static str {
        match self {
            Self::Movie => "primary_release_date",
            Self::Tv => "first_air_date",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(Self::Movie),
            "tv" => Ok(Self::Tv),
            other => Err(format!("unsupported media kind '{other}'")),
        }
    }
}

/// Canonical, fully-typed search request.
///
/// Built only by [`crate::search::normalize`]; two values that compare equal
/// describe the same logical query and share one cache row.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSearchRequest {
    pub media_kind: MediaKind,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Sorted ascending, no duplicates. Empty means no genre filter.
    pub genre_ids: Vec<u32>,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
    pub sort_token: String,
    /// Not clamped to [`MAX_PAGE`]; the upstream client clamps outbound calls.
    pub page: u32,
}

impl NormalizedSearchRequest {
    /// True when any of the date, genre or rating filters is present.
    #[must_use]
    pub fn has_filters(&self) -> bool {
        self.start_date.is_some()
            || self.end_date.is_some()
            || !self.genre_ids.is_empty()
            || self.min_rating.is_some()
            || self.max_rating.is_some()
    }

    /// Page actually requested from the upstream.
    #[must_use]
    pub fn upstream_page(&self) -> u32 {
        self.page.clamp(1, MAX_PAGE)
    }
}

/// One catalog entry as stored in the cache payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedItem {
    pub id: i64,
    pub media_type: MediaKind,
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub popularity: Option<f64>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
    pub original_language: Option<String>,
    #[serde(default)]
    pub adult: bool,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

/// One page of normalized results together with upstream pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub items: Vec<NormalizedItem>,
    pub total_pages: u32,
    pub total_results: u64,
}
