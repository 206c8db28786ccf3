//! Write-through search: serve fresh cached pages, otherwise fetch upstream
//! and persist before responding.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::db::{CacheEntry, StalenessPolicy, Store};
use crate::domain::{MAX_PAGE, NormalizedItem, PER_PAGE};
use crate::search::{RawParams, SearchError, fingerprint, normalize};
use crate::services::discover::{UpstreamSearchClient, validate_sort};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u64,
    pub per_page: u32,
}

/// Result of one search, ready to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub items: Vec<NormalizedItem>,
    pub query_key: String,
    pub cached: bool,
    pub last_updated: Option<DateTime<Utc>>,
    pub pagination: Pagination,
}

pub struct SearchService {
    store: Store,
    upstream: UpstreamSearchClient,
    policy: StalenessPolicy,
}

impl SearchService {
    #[must_use]
    pub const fn new(store: Store, upstream: UpstreamSearchClient, policy: StalenessPolicy) -> Self {
        Self {
            store,
            upstream,
            policy,
        }
    }

    pub async fn search(&self, raw: &RawParams) -> Result<SearchOutcome, SearchError> {
        let req = normalize(raw)?;
        validate_sort(&req)?;

        let query_key = fingerprint(&req);
        let entry = self
            .store
            .get_or_create_cache_entry(&query_key, req.page)
            .await?;

        let reason = if entry.last_refreshed_at.is_none() {
            "miss"
        } else if self.policy.is_stale(&entry, &req) {
            "stale"
        } else {
            let items = entry.read_payload();
            if !items.is_empty() {
                debug!(query_key = %query_key, items = items.len(), "Serving cached results");
                metrics::counter!("search_cache_hits_total").increment(1);
                return Ok(cached_outcome(items, query_key, &entry));
            }
            "empty"
        };

        info!(
            query_key = %query_key,
            media_type = %req.media_kind,
            reason,
            "Cache not usable, fetching upstream"
        );
        metrics::counter!("search_cache_misses_total", "reason" => reason).increment(1);

        let page = self.upstream.search(&req).await?;

        if page.items.is_empty() {
            debug!(query_key = %query_key, "Upstream returned no items, leaving cache untouched");
            return Ok(SearchOutcome {
                items: Vec::new(),
                query_key,
                cached: false,
                last_updated: None,
                pagination: Pagination {
                    page: entry.page,
                    total_pages: page.total_pages,
                    total_results: page.total_results,
                    per_page: PER_PAGE,
                },
            });
        }

        let written = self
            .write_through(&entry, &page.items, page.total_pages, page.total_results)
            .await
            .inspect_err(|e| {
                error!(query_key = %query_key, error = %e, "Failed to store search results");
            })?;

        Ok(SearchOutcome {
            items: page.items,
            query_key,
            cached: false,
            last_updated: written.last_refreshed_at,
            pagination: Pagination {
                page: written.page,
                total_pages: page.total_pages,
                total_results: page.total_results,
                per_page: PER_PAGE,
            },
        })
    }

    /// Re-reads the row before writing so a concurrent refresh is overwritten
    /// with complete data rather than with fields from a stale in-memory copy.
    async fn write_through(
        &self,
        entry: &CacheEntry,
        items: &[NormalizedItem],
        total_pages: u32,
        total_results: u64,
    ) -> Result<CacheEntry, SearchError> {
        let current = self.store.reload_cache_entry(entry).await?;
        let written = self
            .store
            .write_cache_entry(&current, items, total_pages, total_results)
            .await?;
        Ok(written)
    }
}

fn cached_outcome(items: Vec<NormalizedItem>, query_key: String, entry: &CacheEntry) -> SearchOutcome {
    SearchOutcome {
        items,
        query_key,
        cached: true,
        last_updated: entry.last_refreshed_at,
        pagination: Pagination {
            page: entry.page,
            total_pages: entry.total_pages.unwrap_or(0).min(MAX_PAGE),
            total_results: entry.total_results.unwrap_or(0),
            per_page: PER_PAGE,
        },
    }
}
