//! Test fixtures for API integration tests
//!
//! Builders for playlist item DTOs. When a fixture is given a nil playlist
//! id it creates a fresh playlist through the session first, so every DTO it
//! returns points at a playlist that exists.

#![allow(dead_code)]

use std::sync::Arc;

use streamus_api::models::{Playlist, PlaylistItemDto};
use streamus_api::{ManagerFactory, Session};
use uuid::Uuid;

/// Video id used by generated items
pub const TEST_VIDEO_ID: &str = "dQw4w9WgXcQ";

/// Persist a new empty playlist in the session and return its id
pub async fn create_playlist(session: &Arc<Session>, title: &str) -> Uuid {
    let playlist = Playlist::new(title);
    ManagerFactory::new()
        .playlist_manager(session)
        .save(&playlist)
        .await
        .expect("failed to save fixture playlist");
    playlist.id
}

/// One unsaved item DTO for `playlist_id`, or for a new playlist when nil
pub async fn create_playlist_item_dto(
    session: &Arc<Session>,
    playlist_id: Uuid,
) -> PlaylistItemDto {
    let playlist_id = resolve_playlist(session, playlist_id).await;
    item_dto(playlist_id, 0)
}

/// `count` unsaved item DTOs sharing one playlist, without explicit sequences
pub async fn create_playlist_items_dto(
    session: &Arc<Session>,
    count: usize,
    playlist_id: Uuid,
) -> Vec<PlaylistItemDto> {
    let playlist_id = resolve_playlist(session, playlist_id).await;
    (0..count).map(|index| item_dto(playlist_id, index)).collect()
}

async fn resolve_playlist(session: &Arc<Session>, playlist_id: Uuid) -> Uuid {
    if playlist_id.is_nil() {
        create_playlist(session, "Fixture playlist").await
    } else {
        playlist_id
    }
}

fn item_dto(playlist_id: Uuid, index: usize) -> PlaylistItemDto {
    PlaylistItemDto {
        playlist_id,
        title: format!("Video {}", index),
        video_id: TEST_VIDEO_ID.to_string(),
        ..Default::default()
    }
}
