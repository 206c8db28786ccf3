use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clients::tmdb::{ContentApi, TmdbClient};
use crate::config::Config;
use crate::db::Store;
use crate::services::{GenreService, SearchService, UpstreamSearchClient};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// This client should be reused across all HTTP-based services to enable
/// connection pooling and avoid socket exhaustion.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent("Marquee/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub search_service: Arc<SearchService>,

    pub genre_service: Arc<GenreService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(config.tmdb.request_timeout_seconds.into())?;
        let tmdb = Arc::new(TmdbClient::with_shared_client(http_client, &config.tmdb));
        Self::with_content_api(config, tmdb).await
    }

    /// Builds the state around an existing upstream implementation.
    pub async fn with_content_api(
        config: Config,
        content_api: Arc<dyn ContentApi>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let search_service = Arc::new(SearchService::new(
            store.clone(),
            UpstreamSearchClient::new(content_api.clone()),
            config.cache.staleness_policy(),
        ));

        let genre_service = Arc::new(GenreService::new(store.clone(), content_api));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            search_service,
            genre_service,
        })
    }
}
