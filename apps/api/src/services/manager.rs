//! Session-scoped managers for playlists and playlist items
//!
//! Managers are thin, cheap handles over a shared [`Session`]. They turn the
//! session's optional results into typed `NotFound` errors and check batch
//! preconditions before anything is written.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use super::session::Session;
use crate::error::{ApiError, ApiResult};
use crate::models::{Playlist, PlaylistItem};

/// Builds managers bound to a session
#[derive(Debug, Clone, Copy, Default)]
pub struct ManagerFactory;

impl ManagerFactory {
    pub fn new() -> Self {
        Self
    }

    /// Manager for playlist aggregates in this session
    pub fn playlist_manager(&self, session: &Arc<Session>) -> PlaylistManager {
        PlaylistManager {
            session: Arc::clone(session),
        }
    }

    /// Manager for playlist items in this session
    pub fn playlist_item_manager(&self, session: &Arc<Session>) -> PlaylistItemManager {
        PlaylistItemManager {
            session: Arc::clone(session),
        }
    }
}

/// Loads and stores playlist aggregates
#[derive(Debug, Clone)]
pub struct PlaylistManager {
    session: Arc<Session>,
}

impl PlaylistManager {
    /// Find a playlist by id
    pub async fn find(&self, playlist_id: Uuid) -> ApiResult<Option<Playlist>> {
        self.session.load_playlist(playlist_id).await
    }

    /// Get a playlist by id, failing with `NotFound` if it does not exist
    pub async fn get(&self, playlist_id: Uuid) -> ApiResult<Playlist> {
        self.find(playlist_id)
            .await?
            .ok_or_else(|| ApiError::not_found("playlist", playlist_id))
    }

    /// Persist a new playlist together with any items it holds
    #[instrument(skip(self, playlist), fields(playlist_id = %playlist.id))]
    pub async fn save(&self, playlist: &Playlist) -> ApiResult<()> {
        self.session.persist_playlist(playlist).await?;
        tracing::info!(item_count = playlist.items.len(), "Playlist saved");
        Ok(())
    }

    /// Delete a playlist and cascade to its items
    #[instrument(skip(self))]
    pub async fn delete(&self, playlist_id: Uuid) -> ApiResult<()> {
        if !self.session.remove_playlist(playlist_id).await? {
            return Err(ApiError::not_found("playlist", playlist_id));
        }
        tracing::info!("Playlist deleted");
        Ok(())
    }
}

/// Loads and stores playlist items
#[derive(Debug, Clone)]
pub struct PlaylistItemManager {
    session: Arc<Session>,
}

impl PlaylistItemManager {
    /// Find an item by id
    pub async fn find(&self, item_id: Uuid) -> ApiResult<Option<PlaylistItem>> {
        self.session.load_item(item_id).await
    }

    /// Get an item by id, failing with `NotFound` if it does not exist
    pub async fn get(&self, item_id: Uuid) -> ApiResult<PlaylistItem> {
        self.find(item_id)
            .await?
            .ok_or_else(|| ApiError::not_found("playlist item", item_id))
    }

    /// Persist one new item into its playlist
    pub async fn save(&self, item: &PlaylistItem) -> ApiResult<()> {
        self.save_many(std::slice::from_ref(item)).await
    }

    /// Persist a batch of new items in one write
    ///
    /// Every parent playlist must exist; the check walks the distinct parents
    /// once, so its cost does not grow with the size of their collections.
    #[instrument(skip(self, items), fields(session_id = %self.session.id(), item_count = items.len()))]
    pub async fn save_many(&self, items: &[PlaylistItem]) -> ApiResult<()> {
        if items.is_empty() {
            return Ok(());
        }

        let mut parents = HashSet::new();
        for item in items {
            if parents.insert(item.playlist_id)
                && self.session.load_playlist(item.playlist_id).await?.is_none()
            {
                return Err(ApiError::not_found("playlist", item.playlist_id));
            }
        }

        self.session.persist_items(items).await?;
        tracing::debug!(playlist_count = parents.len(), "Playlist items saved");
        Ok(())
    }

    /// Write back a modified item
    #[instrument(skip(self, item), fields(item_id = %item.id))]
    pub async fn update(&self, item: &PlaylistItem) -> ApiResult<()> {
        if !self.session.write_item(item).await? {
            return Err(ApiError::not_found("playlist item", item.id));
        }
        Ok(())
    }

    /// Delete an item from its playlist
    #[instrument(skip(self))]
    pub async fn delete(&self, item_id: Uuid) -> ApiResult<()> {
        if !self.session.remove_item(item_id).await? {
            return Err(ApiError::not_found("playlist item", item_id));
        }
        Ok(())
    }
}
