//! Persistence layer for Streamus
//!
//! [`PlaylistStore`] is the seam between the session layer and storage.
//! Production runs on [`PlaylistRepository`] (PostgreSQL via sqlx); tests and
//! local development can use [`InMemoryPlaylistStore`].
//!
//! Stores work on whole aggregates: loading a playlist always loads its
//! items in the same round trip, and every multi-row write is atomic.

pub mod memory;
pub mod playlist;
pub mod utils;

pub use memory::InMemoryPlaylistStore;
pub use playlist::PlaylistRepository;

use axum::async_trait;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{Playlist, PlaylistItem};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("playlist does not exist: {0}")]
    MissingPlaylist(Uuid),

    #[error("playlist already exists: {0}")]
    DuplicatePlaylist(Uuid),

    #[error("playlist item already exists: {0}")]
    DuplicateItem(Uuid),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(e) => e.into(),
            StoreError::MissingPlaylist(id) => ApiError::not_found("playlist", id),
            StoreError::DuplicatePlaylist(id) => ApiError::conflict("playlist", id),
            StoreError::DuplicateItem(id) => ApiError::conflict("playlist item", id),
        }
    }
}

/// Storage backend for playlist aggregates
#[async_trait]
pub trait PlaylistStore: Send + Sync {
    /// Check that the backend is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Load a playlist together with all of its items, ordered by sequence
    async fn find_playlist(&self, playlist_id: Uuid) -> StoreResult<Option<Playlist>>;

    /// Persist a new playlist and any items it already holds
    async fn insert_playlist(&self, playlist: &Playlist) -> StoreResult<()>;

    /// Delete a playlist and its items. Returns false if it did not exist.
    async fn delete_playlist(&self, playlist_id: Uuid) -> StoreResult<bool>;

    /// Load a single item
    async fn find_item(&self, item_id: Uuid) -> StoreResult<Option<PlaylistItem>>;

    /// Insert a batch of items atomically; every parent must already exist
    async fn insert_items(&self, items: &[PlaylistItem]) -> StoreResult<()>;

    /// Write back the mutable fields of an item. Returns false if it did not exist.
    async fn update_item(&self, item: &PlaylistItem) -> StoreResult<bool>;

    /// Delete a single item. Returns false if it did not exist.
    async fn delete_item(&self, item_id: Uuid) -> StoreResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_store_error_display() {
        let id = Uuid::nil();
        assert_eq!(
            StoreError::MissingPlaylist(id).to_string(),
            format!("playlist does not exist: {}", id)
        );
    }

    #[test]
    fn test_store_error_to_api_error() {
        let api: ApiError = StoreError::MissingPlaylist(Uuid::new_v4()).into();
        assert_eq!(api.status_code(), StatusCode::NOT_FOUND);

        let api: ApiError = StoreError::DuplicateItem(Uuid::new_v4()).into();
        assert_eq!(api.status_code(), StatusCode::CONFLICT);

        let api: ApiError = StoreError::Database(sqlx::Error::PoolTimedOut).into();
        assert_eq!(api.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
