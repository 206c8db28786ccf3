#![allow(dead_code)]

use async_trait::async_trait;
use marquee::clients::tmdb::{ClientError, ContentApi, DiscoverResponse, RawItem, TmdbGenre};
use marquee::config::Config;
use marquee::domain::MediaKind;
use std::path::PathBuf;
use std::sync::Mutex;

/// A SQLite file under the system temp dir, removed on drop.
pub struct TempDb {
    path: PathBuf,
}

impl TempDb {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("marquee-test-{}.db", uuid::Uuid::new_v4()));
        Self { path }
    }

    pub fn url(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }

    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.general.database_path = self.url();
        config
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// In-memory stand-in for the upstream catalog.
pub struct StubApi {
    discover_result: Mutex<Result<DiscoverResponse, u16>>,
    genres: Vec<TmdbGenre>,
    calls: Mutex<Vec<(MediaKind, Vec<(String, String)>)>>,
}

impl StubApi {
    pub fn returning(response: DiscoverResponse) -> Self {
        Self {
            discover_result: Mutex::new(Ok(response)),
            genres: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            discover_result: Mutex::new(Err(status)),
            genres: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_genres(mut self, genres: &[(i64, &str)]) -> Self {
        self.genres = genres
            .iter()
            .map(|(id, name)| TmdbGenre {
                id: *id,
                name: (*name).to_string(),
            })
            .collect();
        self
    }

    pub fn set_response(&self, response: DiscoverResponse) {
        *self.discover_result.lock().unwrap() = Ok(response);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_query(&self) -> Option<Vec<(String, String)>> {
        self.calls.lock().unwrap().last().map(|(_, q)| q.clone())
    }
}

#[async_trait]
impl ContentApi for StubApi {
    async fn fetch_genres(&self, _kind: MediaKind) -> Result<Vec<TmdbGenre>, ClientError> {
        Ok(self.genres.clone())
    }

    async fn discover(
        &self,
        kind: MediaKind,
        query: &[(String, String)],
    ) -> Result<DiscoverResponse, ClientError> {
        self.calls.lock().unwrap().push((kind, query.to_vec()));

        let result = self.discover_result.lock().unwrap().clone();
        result.map_err(|code| ClientError::Status {
            code,
            body: "stubbed failure".to_string(),
        })
    }
}

pub fn movie(id: i64, title: &str, genre_ids: &[i64]) -> RawItem {
    RawItem {
        id,
        title: Some(title.to_string()),
        release_date: Some("2020-06-15".to_string()),
        overview: Some("An overview".to_string()),
        popularity: Some(12.5),
        vote_average: Some(7.8),
        vote_count: Some(1200),
        original_language: Some("en".to_string()),
        adult: Some(false),
        genre_ids: Some(genre_ids.to_vec()),
        ..RawItem::default()
    }
}

pub fn discover_page(items: Vec<RawItem>, total_pages: u32, total_results: u64) -> DiscoverResponse {
    DiscoverResponse {
        results: items,
        total_pages: Some(total_pages),
        total_results: Some(total_results),
    }
}
