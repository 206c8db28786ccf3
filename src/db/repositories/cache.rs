use crate::domain::{MAX_PAGE, NormalizedItem, NormalizedSearchRequest};
use crate::entities::{prelude::*, query_result_cache};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, Set, SqlErr,
};
use tracing::{debug, warn};

/// One cached result set, keyed by request fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub id: i32,
    pub fingerprint: String,
    pub page: u32,
    pub payload: Option<String>,
    pub total_pages: Option<u32>,
    pub total_results: Option<u64>,
    /// `None` until the first successful write.
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    /// Deserializes the stored payload. Corrupt or non-list payloads yield an
    /// empty list.
    #[must_use]
    pub fn read_payload(&self) -> Vec<NormalizedItem> {
        let Some(raw) = self.payload.as_deref().filter(|raw| !raw.trim().is_empty()) else {
            return Vec::new();
        };

        match serde_json::from_str::<Vec<NormalizedItem>>(raw) {
            Ok(items) => items,
            Err(e) => {
                warn!(
                    query_key = %self.fingerprint,
                    error = %e,
                    "Discarding malformed cached payload"
                );
                Vec::new()
            }
        }
    }
}

impl From<query_result_cache::Model> for CacheEntry {
    fn from(m: query_result_cache::Model) -> Self {
        let last_refreshed_at = m.last_queried_at.as_deref().and_then(|ts| {
            DateTime::parse_from_rfc3339(ts)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| warn!(query_key = %m.query_key, error = %e, "Unreadable refresh timestamp"))
                .ok()
        });

        Self {
            id: m.id,
            page: u32::try_from(m.page).unwrap_or(1),
            payload: m.results,
            total_pages: m.total_pages.and_then(|p| u32::try_from(p).ok()),
            total_results: m.total_results.and_then(|r| u64::try_from(r).ok()),
            last_refreshed_at,
            fingerprint: m.query_key,
        }
    }
}

/// Freshness horizons for cached result sets.
///
/// Unfiltered queries churn faster upstream (new releases, reordering) and
/// get the shorter horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessPolicy {
    pub broad_ttl: Duration,
    pub filtered_ttl: Duration,
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self {
            broad_ttl: Duration::hours(1),
            filtered_ttl: Duration::hours(24),
        }
    }
}

impl StalenessPolicy {
    #[must_use]
    pub fn horizon(&self, req: &NormalizedSearchRequest) -> Duration {
        if req.has_filters() {
            self.filtered_ttl
        } else {
            self.broad_ttl
        }
    }

    #[must_use]
    pub fn is_stale(&self, entry: &CacheEntry, req: &NormalizedSearchRequest) -> bool {
        self.is_stale_at(entry, req, Utc::now())
    }

    #[must_use]
    pub fn is_stale_at(
        &self,
        entry: &CacheEntry,
        req: &NormalizedSearchRequest,
        now: DateTime<Utc>,
    ) -> bool {
        entry
            .last_refreshed_at
            .is_none_or(|refreshed| now - refreshed > self.horizon(req))
    }
}

pub struct CacheRepository {
    conn: DatabaseConnection,
}

impl CacheRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find(&self, fingerprint: &str) -> Result<Option<CacheEntry>> {
        let row = QueryResultCache::find()
            .filter(query_result_cache::Column::QueryKey.eq(fingerprint))
            .one(&self.conn)
            .await?;

        Ok(row.map(CacheEntry::from))
    }

    /// Returns the row for `fingerprint`, creating an empty one if needed.
    ///
    /// Two workers may race to create the same key. The unique index on
    /// `query_key` lets exactly one insert win; the loser re-reads the row the
    /// winner created, so both callers observe the same entry.
    pub async fn get_or_create(&self, fingerprint: &str, initial_page: u32) -> Result<CacheEntry> {
        if let Some(entry) = self.find(fingerprint).await? {
            return Ok(entry);
        }

        let now = Utc::now().to_rfc3339();
        let active_model = query_result_cache::ActiveModel {
            query_key: Set(fingerprint.to_string()),
            page: Set(i32::try_from(initial_page.max(1)).unwrap_or(i32::MAX)),
            results: Set(None),
            last_queried_at: Set(None),
            total_pages: Set(None),
            total_results: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        match QueryResultCache::insert(active_model).exec(&self.conn).await {
            Ok(_) => debug!(query_key = %fingerprint, "Created cache row"),
            Err(e) if is_duplicate_key(&e) => {
                debug!(query_key = %fingerprint, "Cache row created concurrently, re-reading");
            }
            Err(e) => return Err(e).context("Failed to create cache row"),
        }

        self.find(fingerprint)
            .await?
            .with_context(|| format!("Cache row {fingerprint} missing after insert"))
    }

    /// Fetches the current state of `entry` from the database.
    pub async fn reload(&self, entry: &CacheEntry) -> Result<CacheEntry> {
        QueryResultCache::find_by_id(entry.id)
            .one(&self.conn)
            .await?
            .map(CacheEntry::from)
            .with_context(|| format!("Cache row {} no longer exists", entry.fingerprint))
    }

    /// Replaces payload and pagination and stamps the refresh time, all in one
    /// statement.
    pub async fn write(
        &self,
        entry: &CacheEntry,
        items: &[NormalizedItem],
        total_pages: u32,
        total_results: u64,
    ) -> Result<CacheEntry> {
        let payload = serde_json::to_string(items)?;
        let total_pages = i32::try_from(total_pages.min(MAX_PAGE)).unwrap_or(0);
        let total_results = i64::try_from(total_results).unwrap_or(i64::MAX);
        let now = Utc::now().to_rfc3339();

        let updated = QueryResultCache::update_many()
            .col_expr(query_result_cache::Column::Results, Expr::value(payload))
            .col_expr(query_result_cache::Column::TotalPages, Expr::value(total_pages))
            .col_expr(
                query_result_cache::Column::TotalResults,
                Expr::value(total_results),
            )
            .col_expr(
                query_result_cache::Column::LastQueriedAt,
                Expr::value(now.clone()),
            )
            .col_expr(query_result_cache::Column::UpdatedAt, Expr::value(now))
            .filter(query_result_cache::Column::Id.eq(entry.id))
            .exec(&self.conn)
            .await?;

        if updated.rows_affected == 0 {
            anyhow::bail!("Cache row {} no longer exists", entry.fingerprint);
        }

        self.reload(entry).await
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(QueryResultCache::find().count(&self.conn).await?)
    }
}

fn is_duplicate_key(err: &DbErr) -> bool {
    matches!(err, DbErr::RecordNotInserted)
        || matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
