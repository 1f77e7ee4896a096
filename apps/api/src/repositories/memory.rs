//! In-memory playlist store
//!
//! Holds whole aggregates in a [`DashMap`] plus an item-to-playlist index so
//! single items can be found without scanning every playlist. Batch writes
//! are validated in full before anything is applied, which gives them the
//! same all-or-nothing behaviour as the PostgreSQL transaction.

use std::collections::HashSet;

use axum::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use super::{PlaylistStore, StoreError, StoreResult};
use crate::models::{Playlist, PlaylistItem};

/// Store backed by process memory
#[derive(Debug, Default)]
pub struct InMemoryPlaylistStore {
    playlists: DashMap<Uuid, Playlist>,
    item_owners: DashMap<Uuid, Uuid>,
}

impl InMemoryPlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored playlists
    pub fn playlist_count(&self) -> usize {
        self.playlists.len()
    }

    /// Number of stored items across all playlists
    pub fn item_count(&self) -> usize {
        self.item_owners.len()
    }

    fn owner_of(&self, item_id: Uuid) -> Option<Uuid> {
        self.item_owners.get(&item_id).map(|owner| *owner)
    }

    /// Reject a batch that references unknown playlists or reuses an id
    fn check_batch(&self, items: &[PlaylistItem]) -> StoreResult<()> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in items {
            if !self.playlists.contains_key(&item.playlist_id) {
                return Err(StoreError::MissingPlaylist(item.playlist_id));
            }
            if self.item_owners.contains_key(&item.id) || !seen.insert(item.id) {
                return Err(StoreError::DuplicateItem(item.id));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PlaylistStore for InMemoryPlaylistStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn find_playlist(&self, playlist_id: Uuid) -> StoreResult<Option<Playlist>> {
        Ok(self.playlists.get(&playlist_id).map(|p| p.clone()))
    }

    async fn insert_playlist(&self, playlist: &Playlist) -> StoreResult<()> {
        if self.playlists.contains_key(&playlist.id) {
            return Err(StoreError::DuplicatePlaylist(playlist.id));
        }

        let mut seen = HashSet::with_capacity(playlist.items.len());
        for item in &playlist.items {
            if self.item_owners.contains_key(&item.id) || !seen.insert(item.id) {
                return Err(StoreError::DuplicateItem(item.id));
            }
        }

        for item in &playlist.items {
            self.item_owners.insert(item.id, playlist.id);
        }
        let mut stored = playlist.clone();
        stored.reorder();
        self.playlists.insert(playlist.id, stored);

        Ok(())
    }

    async fn delete_playlist(&self, playlist_id: Uuid) -> StoreResult<bool> {
        let Some((_, playlist)) = self.playlists.remove(&playlist_id) else {
            return Ok(false);
        };

        for item in &playlist.items {
            self.item_owners.remove(&item.id);
        }

        Ok(true)
    }

    async fn find_item(&self, item_id: Uuid) -> StoreResult<Option<PlaylistItem>> {
        let Some(owner) = self.owner_of(item_id) else {
            return Ok(None);
        };

        Ok(self
            .playlists
            .get(&owner)
            .and_then(|playlist| playlist.item(item_id).cloned()))
    }

    async fn insert_items(&self, items: &[PlaylistItem]) -> StoreResult<()> {
        self.check_batch(items)?;

        let mut start = 0;
        while start < items.len() {
            let parent = items[start].playlist_id;
            let end = items[start..]
                .iter()
                .position(|item| item.playlist_id != parent)
                .map_or(items.len(), |offset| start + offset);
            let run = &items[start..end];

            // Indexed under the parent's entry guard so a concurrent
            // delete_playlist sees either none or all of the run.
            match self.playlists.get_mut(&parent) {
                Some(mut playlist) => {
                    for item in run {
                        self.item_owners.insert(item.id, parent);
                    }
                    playlist.add_items(run.iter().cloned());
                }
                None => {
                    tracing::warn!(
                        playlist_id = %parent,
                        item_count = run.len(),
                        "Playlist deleted during batch insert, items dropped"
                    );
                }
            }

            start = end;
        }

        Ok(())
    }

    async fn update_item(&self, item: &PlaylistItem) -> StoreResult<bool> {
        let Some(owner) = self.owner_of(item.id) else {
            return Ok(false);
        };
        let Some(mut playlist) = self.playlists.get_mut(&owner) else {
            return Ok(false);
        };

        let Some(stored) = playlist.item_mut(item.id) else {
            return Ok(false);
        };
        stored.sequence = item.sequence;
        stored.title = item.title.clone();

        playlist.reorder();
        playlist.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete_item(&self, item_id: Uuid) -> StoreResult<bool> {
        let Some((_, owner)) = self.item_owners.remove(&item_id) else {
            return Ok(false);
        };

        Ok(self
            .playlists
            .get_mut(&owner)
            .and_then(|mut playlist| playlist.remove_item(item_id))
            .is_some())
    }
}
