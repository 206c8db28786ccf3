use crate::domain::{MediaKind, NormalizedItem};
use crate::entities::genres;
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::cache::{CacheEntry, StalenessPolicy};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn cache_repo(&self) -> repositories::cache::CacheRepository {
        repositories::cache::CacheRepository::new(self.conn.clone())
    }

    fn genre_repo(&self) -> repositories::genre::GenreRepository {
        repositories::genre::GenreRepository::new(self.conn.clone())
    }

    pub async fn find_cache_entry(&self, fingerprint: &str) -> Result<Option<CacheEntry>> {
        self.cache_repo().find(fingerprint).await
    }

    pub async fn get_or_create_cache_entry(
        &self,
        fingerprint: &str,
        initial_page: u32,
    ) -> Result<CacheEntry> {
        self.cache_repo()
            .get_or_create(fingerprint, initial_page)
            .await
    }

    pub async fn reload_cache_entry(&self, entry: &CacheEntry) -> Result<CacheEntry> {
        self.cache_repo().reload(entry).await
    }

    pub async fn write_cache_entry(
        &self,
        entry: &CacheEntry,
        items: &[NormalizedItem],
        total_pages: u32,
        total_results: u64,
    ) -> Result<CacheEntry> {
        self.cache_repo()
            .write(entry, items, total_pages, total_results)
            .await
    }

    pub async fn count_cache_entries(&self) -> Result<u64> {
        self.cache_repo().count().await
    }

    pub async fn insert_missing_genres(
        &self,
        kind: MediaKind,
        entries: &[(i64, String)],
    ) -> Result<()> {
        self.genre_repo().insert_missing(kind, entries).await
    }

    pub async fn list_genres(&self, kind: MediaKind) -> Result<Vec<genres::Model>> {
        self.genre_repo().list(kind).await
    }

    pub async fn find_genres_by_tmdb_ids(
        &self,
        kind: MediaKind,
        tmdb_ids: &[i64],
    ) -> Result<Vec<genres::Model>> {
        self.genre_repo().find_by_tmdb_ids(kind, tmdb_ids).await
    }
}
