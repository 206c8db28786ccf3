use crate::domain::MediaKind;
use crate::entities::{genres, prelude::*};
use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

pub struct GenreRepository {
    conn: DatabaseConnection,
}

impl GenreRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts genres that are not known yet for `kind`. Existing rows keep
    /// their name.
    pub async fn insert_missing(&self, kind: MediaKind, entries: &[(i64, String)]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let now = chrono::Utc::now().to_rfc3339();
        let models: Vec<genres::ActiveModel> = entries
            .iter()
            .map(|(tmdb_id, name)| genres::ActiveModel {
                tmdb_id: Set(*tmdb_id),
                media_type: Set(kind.as_str().to_string()),
                name: Set(name.clone()),
                created_at: Set(now.clone()),
                updated_at: Set(now.clone()),
                ..Default::default()
            })
            .collect();

        for chunk in models.chunks(100) {
            Genres::insert_many(chunk.to_vec())
                .on_conflict(
                    OnConflict::columns([genres::Column::TmdbId, genres::Column::MediaType])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&self.conn)
                .await?;
        }

        Ok(())
    }

    pub async fn list(&self, kind: MediaKind) -> Result<Vec<genres::Model>> {
        let rows = Genres::find()
            .filter(genres::Column::MediaType.eq(kind.as_str()))
            .order_by_asc(genres::Column::Name)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn find_by_tmdb_ids(
        &self,
        kind: MediaKind,
        tmdb_ids: &[i64],
    ) -> Result<Vec<genres::Model>> {
        if tmdb_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = Genres::find()
            .filter(genres::Column::MediaType.eq(kind.as_str()))
            .filter(genres::Column::TmdbId.is_in(tmdb_ids.iter().copied()))
            .all(&self.conn)
            .await?;
        Ok(rows)
    }
}
