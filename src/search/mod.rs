//! Query normalization and cache-key derivation for catalog search.

pub mod fingerprint;
pub mod normalize;

pub use fingerprint::fingerprint;
pub use normalize::{RawParams, normalize};

use crate::domain::MediaKind;
use thiserror::Error;

/// Errors surfaced by the search pipeline.
///
/// Validation variants are raised before any cache or upstream work and are
/// never retryable. Payload corruption and insert races are recovered inside
/// the store and never appear here.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("media_type must be movie or tv")]
    InvalidMediaKind(Option<String>),

    #[error(
        "Invalid sort_by value '{value}' for media_type '{media_type}'. Valid options: {}",
        allowed.join(", ")
    )]
    InvalidSortToken {
        media_type: MediaKind,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("Invalid date format. Use YYYY-MM-DD")]
    InvalidDateFormat(String),

    #[error("start_date must be less than or equal to end_date")]
    InvalidDateRange,

    #[error("Invalid page: Pages must be between 1 and {max}")]
    InvalidPage { max: u32 },

    #[error("Upstream API error: {status}")]
    Upstream { status: u16 },

    #[error("Upstream request failed: {0}")]
    Transport(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl SearchError {
    /// True for errors caused by the caller's input.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidMediaKind(_)
                | Self::InvalidSortToken { .. }
                | Self::InvalidDateFormat(_)
                | Self::InvalidDateRange
                | Self::InvalidPage { .. }
        )
    }
}

impl From<sea_orm::DbErr> for SearchError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for SearchError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}
