//! Genre catalog: sync from the upstream and name lookup for rendering.
//!
//! The search core only carries upstream genre ids; names are resolved here,
//! at the presentation edge.

use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{error, info};

use crate::clients::tmdb::ContentApi;
use crate::db::Store;
use crate::domain::{MediaKind, NormalizedItem};
use crate::entities::genres;

pub struct GenreService {
    store: Store,
    api: Arc<dyn ContentApi>,
}

impl GenreService {
    #[must_use]
    pub const fn new(store: Store, api: Arc<dyn ContentApi>) -> Self {
        Self { store, api }
    }

    /// Pulls the upstream genre list for `kind` and stores genres not seen
    /// before. Returns the number of genres the upstream reported.
    pub async fn sync(&self, kind: MediaKind) -> Result<usize> {
        let upstream = self
            .api
            .fetch_genres(kind)
            .await
            .with_context(|| format!("Failed to fetch {kind} genres"))?;

        let entries: Vec<(i64, String)> = upstream.into_iter().map(|g| (g.id, g.name)).collect();
        self.store.insert_missing_genres(kind, &entries).await?;

        info!(media_type = %kind, count = entries.len(), "Synced genres from TMDB");
        Ok(entries.len())
    }

    /// Syncs every media kind, logging failures instead of returning them.
    pub async fn sync_all(&self) {
        for kind in MediaKind::ALL {
            if let Err(e) = self.sync(kind).await {
                error!(media_type = %kind, error = %format!("{e:#}"), "Failed to sync genres");
            }
        }
    }

    pub async fn list(&self, kind: MediaKind) -> Result<Vec<genres::Model>> {
        self.store.list_genres(kind).await
    }

    /// Looks up every genre referenced by `items`, one query per media kind.
    pub async fn lookup_for(
        &self,
        items: &[NormalizedItem],
    ) -> Result<HashMap<(i64, MediaKind), genres::Model>> {
        let mut ids_by_kind: BTreeMap<MediaKind, Vec<i64>> = BTreeMap::new();
        for item in items {
            ids_by_kind
                .entry(item.media_type)
                .or_default()
                .extend(item.genre_ids.iter().copied());
        }

        let mut resolved = HashMap::new();
        for (kind, mut ids) in ids_by_kind {
            ids.sort_unstable();
            ids.dedup();

            for genre in self.store.find_genres_by_tmdb_ids(kind, &ids).await? {
                resolved.insert((genre.tmdb_id, kind), genre);
            }
        }

        Ok(resolved)
    }
}
