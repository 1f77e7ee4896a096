//! Playlist repository for PostgreSQL
//!
//! A playlist is always loaded with a single LEFT JOIN against its items, so
//! reading an aggregate costs one round trip no matter how many items it
//! holds. Batch inserts go through one `UNNEST` statement inside a
//! transaction.

use axum::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::utils::{
    sqlstate, violating_key, FOREIGN_KEY_VIOLATION, PLAYLIST_ITEM_COLUMNS,
    PLAYLIST_WITH_ITEMS_COLUMNS, UNIQUE_VIOLATION,
};
use super::{PlaylistStore, StoreError, StoreResult};
use crate::models::{Playlist, PlaylistItem};

/// Row of the playlist/items join; item columns are NULL for an empty playlist
#[derive(Debug, FromRow)]
struct PlaylistJoinRow {
    id: Uuid,
    title: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    item_id: Option<Uuid>,
    item_sequence: Option<f64>,
    item_title: Option<String>,
    item_video_id: Option<String>,
    item_created_at: Option<DateTime<Utc>>,
}

/// Fold joined rows into one aggregate
fn assemble_playlist(rows: Vec<PlaylistJoinRow>) -> Option<Playlist> {
    let mut rows = rows.into_iter();
    let first = rows.next()?;

    let mut playlist = Playlist {
        id: first.id,
        title: first.title.clone(),
        items: Vec::new(),
        created_at: first.created_at,
        updated_at: first.updated_at,
    };

    for row in std::iter::once(first).chain(rows) {
        if let (Some(id), Some(sequence), Some(title), Some(video_id), Some(created_at)) = (
            row.item_id,
            row.item_sequence,
            row.item_title,
            row.item_video_id,
            row.item_created_at,
        ) {
            playlist.items.push(PlaylistItem {
                id,
                playlist_id: playlist.id,
                sequence,
                title,
                video_id,
                created_at,
            });
        }
    }

    Some(playlist)
}

/// Column-wise arrays for an `UNNEST` batch insert
#[derive(Debug, Default)]
struct ItemColumns {
    ids: Vec<Uuid>,
    playlist_ids: Vec<Uuid>,
    sequences: Vec<f64>,
    titles: Vec<String>,
    video_ids: Vec<String>,
    created_ats: Vec<DateTime<Utc>>,
}

impl ItemColumns {
    fn from_items(items: &[PlaylistItem]) -> Self {
        let mut columns = Self::default();
        for item in items {
            columns.ids.push(item.id);
            columns.playlist_ids.push(item.playlist_id);
            columns.sequences.push(item.sequence);
            columns.titles.push(item.title.clone());
            columns.video_ids.push(item.video_id.clone());
            columns.created_ats.push(item.created_at);
        }
        columns
    }

    /// Distinct parents touched by the batch
    fn parent_ids(&self) -> Vec<Uuid> {
        let mut parents = self.playlist_ids.clone();
        parents.sort_unstable();
        parents.dedup();
        parents
    }
}

/// Repository for playlist database operations
#[derive(Clone)]
pub struct PlaylistRepository {
    pool: PgPool,
}

impl PlaylistRepository {
    /// Create a new PlaylistRepository instance
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert items inside an open transaction
    async fn insert_items_in(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        items: &[PlaylistItem],
    ) -> StoreResult<()> {
        let columns = ItemColumns::from_items(items);

        sqlx::query(
            r#"
            INSERT INTO playlist_items (id, playlist_id, sequence, title, video_id, created_at)
            SELECT * FROM UNNEST($1::uuid[], $2::uuid[], $3::float8[], $4::text[], $5::text[], $6::timestamptz[])
            "#,
        )
        .bind(&columns.ids)
        .bind(&columns.playlist_ids)
        .bind(&columns.sequences)
        .bind(&columns.titles)
        .bind(&columns.video_ids)
        .bind(&columns.created_ats)
        .execute(&mut **tx)
        .await
        .map_err(classify_item_insert_error)?;

        sqlx::query("UPDATE playlists SET updated_at = NOW() WHERE id = ANY($1)")
            .bind(columns.parent_ids())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

/// Translate constraint violations from a batch insert into store errors
///
/// The store error names the row PostgreSQL reported; when the detail text
/// carries no key the raw database error is kept.
fn classify_item_insert_error(err: sqlx::Error) -> StoreError {
    let key = violating_key(&err);

    match (sqlstate(&err).as_deref(), key) {
        (Some(FOREIGN_KEY_VIOLATION), Some(playlist_id)) => {
            StoreError::MissingPlaylist(playlist_id)
        }
        (Some(UNIQUE_VIOLATION), Some(item_id)) => StoreError::DuplicateItem(item_id),
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl PlaylistStore for PlaylistRepository {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn find_playlist(&self, playlist_id: Uuid) -> StoreResult<Option<Playlist>> {
        let sql = format!(
            r#"SELECT {} FROM playlists p
            LEFT JOIN playlist_items i ON i.playlist_id = p.id
            WHERE p.id = $1
            ORDER BY i.sequence ASC, i.created_at ASC"#,
            PLAYLIST_WITH_ITEMS_COLUMNS
        );
        let rows = sqlx::query_as::<_, PlaylistJoinRow>(&sql)
            .bind(playlist_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(assemble_playlist(rows))
    }

    #[tracing::instrument(skip(self, playlist), fields(playlist_id = %playlist.id, item_count = playlist.items.len()))]
    async fn insert_playlist(&self, playlist: &Playlist) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO playlists (id, title, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(playlist.id)
        .bind(&playlist.title)
        .bind(playlist.created_at)
        .bind(playlist.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match sqlstate(&e).as_deref() {
            Some(UNIQUE_VIOLATION) => StoreError::DuplicatePlaylist(playlist.id),
            _ => StoreError::Database(e),
        })?;

        if !playlist.items.is_empty() {
            Self::insert_items_in(&mut tx, &playlist.items).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_playlist(&self, playlist_id: Uuid) -> StoreResult<bool> {
        // playlist_items rows go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM playlists WHERE id = $1")
            .bind(playlist_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn find_item(&self, item_id: Uuid) -> StoreResult<Option<PlaylistItem>> {
        let sql = format!(
            "SELECT {} FROM playlist_items WHERE id = $1",
            PLAYLIST_ITEM_COLUMNS
        );
        let item = sqlx::query_as::<_, PlaylistItem>(&sql)
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    #[tracing::instrument(skip(self, items), fields(item_count = items.len()))]
    async fn insert_items(&self, items: &[PlaylistItem]) -> StoreResult<()> {
        if items.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        Self::insert_items_in(&mut tx, items).await?;
        tx.commit().await?;

        Ok(())
    }

    #[tracing::instrument(skip(self, item), fields(item_id = %item.id))]
    async fn update_item(&self, item: &PlaylistItem) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE playlist_items
            SET sequence = $2, title = $3
            WHERE id = $1
            "#,
        )
        .bind(item.id)
        .bind(item.sequence)
        .bind(&item.title)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE playlists SET updated_at = NOW() WHERE id = $1")
            .bind(item.playlist_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_item(&self, item_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM playlist_items WHERE id = $1")
            .bind(item_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
