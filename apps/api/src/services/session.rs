//! Unit of work over a [`PlaylistStore`]
//!
//! A [`Session`] keeps an identity map of every playlist aggregate it has
//! loaded. Reads after the first come from the map, and every write goes to
//! the store first and is then applied to the mapped aggregate, so all
//! managers sharing a session observe the same state for an entity.
//!
//! Items are never cached on their own: loading an item loads its parent
//! aggregate with one join query and hands out the copy held inside the
//! parent's collection.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::models::{Playlist, PlaylistItem};
use crate::repositories::PlaylistStore;

/// Session-scoped unit of work with an identity map of playlist aggregates
pub struct Session {
    id: Uuid,
    store: Arc<dyn PlaylistStore>,
    playlists: DashMap<Uuid, Playlist>,
    item_owners: DashMap<Uuid, Uuid>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("loaded_playlists", &self.playlists.len())
            .finish()
    }
}

impl Session {
    /// Open a new session over a store
    pub fn new(store: Arc<dyn PlaylistStore>) -> Self {
        let id = Uuid::new_v4();
        tracing::trace!(session_id = %id, "Session opened");
        Self {
            id,
            store,
            playlists: DashMap::new(),
            item_owners: DashMap::new(),
        }
    }

    /// Identifier used to correlate log lines from one unit of work
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The store this session writes through to
    pub fn store(&self) -> &Arc<dyn PlaylistStore> {
        &self.store
    }

    /// Whether a playlist is currently held in the identity map
    pub fn is_loaded(&self, playlist_id: Uuid) -> bool {
        self.playlists.contains_key(&playlist_id)
    }

    /// Drop every cached aggregate; the next read goes to the store
    pub fn clear(&self) {
        self.playlists.clear();
        self.item_owners.clear();
    }

    fn register(&self, playlist: Playlist) {
        for item in &playlist.items {
            self.item_owners.insert(item.id, playlist.id);
        }
        self.playlists.insert(playlist.id, playlist);
    }

    fn evict(&self, playlist_id: Uuid) {
        if let Some((_, playlist)) = self.playlists.remove(&playlist_id) {
            for item in &playlist.items {
                self.item_owners.remove(&item.id);
            }
        }
    }

    /// Load a playlist aggregate, from the identity map when already loaded
    pub async fn load_playlist(&self, playlist_id: Uuid) -> ApiResult<Option<Playlist>> {
        if let Some(playlist) = self.playlists.get(&playlist_id) {
            return Ok(Some(playlist.clone()));
        }

        let Some(playlist) = self.store.find_playlist(playlist_id).await? else {
            return Ok(None);
        };

        tracing::debug!(
            session_id = %self.id,
            playlist_id = %playlist_id,
            item_count = playlist.items.len(),
            "Playlist loaded into session"
        );
        self.register(playlist.clone());
        Ok(Some(playlist))
    }

    /// Load an item as held in its parent's collection
    ///
    /// An item written by another session after the parent was mapped here is
    /// merged into the mapped collection.
    pub async fn load_item(&self, item_id: Uuid) -> ApiResult<Option<PlaylistItem>> {
        if let Some(owner) = self.item_owners.get(&item_id).map(|owner| *owner) {
            let mapped = self
                .playlists
                .get(&owner)
                .and_then(|playlist| playlist.item(item_id).cloned());
            if mapped.is_some() {
                return Ok(mapped);
            }
        }

        let Some(stored) = self.store.find_item(item_id).await? else {
            return Ok(None);
        };
        let owner = stored.playlist_id;

        if !self.is_loaded(owner) {
            self.load_playlist(owner).await?;
        }

        let Some(mut playlist) = self.playlists.get_mut(&owner) else {
            return Ok(None);
        };
        if !playlist.contains_item(item_id) {
            tracing::debug!(
                session_id = %self.id,
                item_id = %item_id,
                "Merging item written outside this session"
            );
            playlist.add_items(std::iter::once(stored));
        }
        self.item_owners.insert(item_id, owner);

        let item = playlist.item(item_id).cloned();
        Ok(item)
    }

    /// Persist a new playlist (and any items it holds) and map it
    pub async fn persist_playlist(&self, playlist: &Playlist) -> ApiResult<()> {
        self.store.insert_playlist(playlist).await?;
        let mut mapped = playlist.clone();
        mapped.reorder();
        self.register(mapped);
        Ok(())
    }

    /// Delete a playlist with its items. Returns false if it did not exist.
    pub async fn remove_playlist(&self, playlist_id: Uuid) -> ApiResult<bool> {
        let removed = self.store.delete_playlist(playlist_id).await?;
        self.evict(playlist_id);
        Ok(removed)
    }

    /// Persist new items and cascade them into their loaded parents
    pub async fn persist_items(&self, items: &[PlaylistItem]) -> ApiResult<()> {
        self.store.insert_items(items).await?;

        let mut by_parent: HashMap<Uuid, Vec<PlaylistItem>> = HashMap::new();
        for item in items {
            by_parent
                .entry(item.playlist_id)
                .or_default()
                .push(item.clone());
        }

        for (parent, children) in by_parent {
            let Some(mut playlist) = self.playlists.get_mut(&parent) else {
                continue;
            };
            for child in &children {
                self.item_owners.insert(child.id, parent);
            }
            playlist.add_items(children);
        }

        Ok(())
    }

    /// Write back an item's mutable fields. Returns false if it did not exist.
    pub async fn write_item(&self, item: &PlaylistItem) -> ApiResult<bool> {
        if !self.store.update_item(item).await? {
            return Ok(false);
        }

        if let Some(mut playlist) = self.playlists.get_mut(&item.playlist_id) {
            if let Some(mapped) = playlist.item_mut(item.id) {
                mapped.sequence = item.sequence;
                mapped.title = item.title.clone();
            }
            playlist.reorder();
        }

        Ok(true)
    }

    /// Delete an item and drop it from its parent. Returns false if it did not exist.
    pub async fn remove_item(&self, item_id: Uuid) -> ApiResult<bool> {
        let removed = self.store.delete_item(item_id).await?;

        if let Some((_, owner)) = self.item_owners.remove(&item_id) {
            if let Some(mut playlist) = self.playlists.get_mut(&owner) {
                playlist.remove_item(item_id);
            }
        }

        Ok(removed)
    }
}
