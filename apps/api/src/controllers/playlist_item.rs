//! Playlist item controller
//!
//! Translates DTOs into domain items and back. Creating items cascades them
//! into the owning playlist through the session, so the parent's collection
//! reflects the new items as soon as the call returns.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::playlist::SEQUENCE_STEP;
use crate::models::{PatchPlaylistItemDto, PlaylistItem, PlaylistItemDto};
use crate::services::{ManagerFactory, PlaylistItemManager, PlaylistManager, Session};

/// Largest batch accepted by `create_multiple` unless configured otherwise
pub const DEFAULT_BATCH_LIMIT: usize = 5000;

/// Create, patch and delete playlist items within one session
#[derive(Debug, Clone)]
pub struct PlaylistItemController {
    session: Arc<Session>,
    playlists: PlaylistManager,
    items: PlaylistItemManager,
    batch_limit: usize,
}

impl PlaylistItemController {
    pub fn new(session: Arc<Session>, factory: &ManagerFactory) -> Self {
        Self {
            playlists: factory.playlist_manager(&session),
            items: factory.playlist_item_manager(&session),
            session,
            batch_limit: DEFAULT_BATCH_LIMIT,
        }
    }

    /// Override the maximum number of items per batch
    pub fn with_batch_limit(mut self, batch_limit: usize) -> Self {
        self.batch_limit = batch_limit;
        self
    }

    /// Fetch one item
    pub async fn get(&self, item_id: Uuid) -> ApiResult<PlaylistItemDto> {
        let item = self.items.get(item_id).await?;
        Ok(PlaylistItemDto::from(&item))
    }

    /// Create one item and cascade it into its playlist
    #[instrument(skip(self, dto), fields(session_id = %self.session.id(), playlist_id = %dto.playlist_id))]
    pub async fn create(&self, dto: PlaylistItemDto) -> ApiResult<PlaylistItemDto> {
        self.create_multiple(vec![dto])
            .await?
            .pop()
            .ok_or_else(|| ApiError::Internal("batch create returned no item".to_string()))
    }

    /// Create a batch of items, possibly spanning several playlists
    ///
    /// The whole batch is written in one store operation. Items without a
    /// sequence are appended after the current end of their playlist in
    /// request order. Results come back in request order.
    #[instrument(skip(self, dtos), fields(session_id = %self.session.id(), item_count = dtos.len()))]
    pub async fn create_multiple(
        &self,
        dtos: Vec<PlaylistItemDto>,
    ) -> ApiResult<Vec<PlaylistItemDto>> {
        if dtos.is_empty() {
            return Ok(Vec::new());
        }
        if dtos.len() > self.batch_limit {
            return Err(ApiError::ValidationError(format!(
                "batch of {} items exceeds the limit of {}",
                dtos.len(),
                self.batch_limit
            )));
        }

        let mut next_sequences: HashMap<Uuid, f64> = HashMap::new();
        let mut items = Vec::with_capacity(dtos.len());

        for dto in dtos {
            dto.validate()?;

            let next = match next_sequences.get(&dto.playlist_id) {
                Some(next) => *next,
                None => self.playlists.get(dto.playlist_id).await?.next_sequence(),
            };
            let sequence = dto.sequence.unwrap_or(next);
            next_sequences.insert(dto.playlist_id, next.max(sequence + SEQUENCE_STEP));

            items.push(PlaylistItem::new(
                dto.playlist_id,
                sequence,
                dto.title,
                dto.video_id,
            ));
        }

        self.items.save_many(&items).await?;

        tracing::info!(
            item_count = items.len(),
            playlist_count = next_sequences.len(),
            "Playlist items created"
        );

        Ok(items.iter().map(PlaylistItemDto::from).collect())
    }

    /// Apply the present fields of a partial update
    #[instrument(skip(self, patch), fields(session_id = %self.session.id()))]
    pub async fn patch(
        &self,
        item_id: Uuid,
        patch: PatchPlaylistItemDto,
    ) -> ApiResult<PlaylistItemDto> {
        patch.validate()?;

        let mut item = self.items.get(item_id).await?;
        item.apply_patch(&patch);
        self.items.update(&item).await?;

        tracing::debug!(sequence = item.sequence, "Playlist item patched");
        Ok(PlaylistItemDto::from(&item))
    }

    /// Delete an item from its playlist
    #[instrument(skip(self), fields(session_id = %self.session.id()))]
    pub async fn delete(&self, item_id: Uuid) -> ApiResult<()> {
        self.items.delete(item_id).await?;
        tracing::info!("Playlist item deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Playlist;
    use crate::repositories::InMemoryPlaylistStore;
    use assert_matches::assert_matches;

    async fn controller_with_playlist() -> (PlaylistItemController, Uuid) {
        let session = Arc::new(Session::new(Arc::new(InMemoryPlaylistStore::new())));
        let factory = ManagerFactory::new();
        let playlist = Playlist::new("Test");
        factory.playlist_manager(&session).save(&playlist).await.unwrap();
        (PlaylistItemController::new(session, &factory), playlist.id)
    }

    fn dto(playlist_id: Uuid, sequence: Option<f64>) -> PlaylistItemDto {
        PlaylistItemDto {
            playlist_id,
            sequence,
            title: "Song".to_string(),
            video_id: "vid".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_assigns_new_id() {
        let (controller, playlist_id) = controller_with_playlist().await;
        let mut request = dto(playlist_id, None);
        request.id = Uuid::new_v4();

        let created = controller.create(request.clone()).await.unwrap();
        assert_ne!(created.id, request.id);
        assert_ne!(created.id, Uuid::nil());
    }

    #[tokio::test]
    async fn test_missing_sequences_are_appended_in_order() {
        let (controller, playlist_id) = controller_with_playlist().await;

        let created = controller
            .create_multiple(vec![
                dto(playlist_id, None),
                dto(playlist_id, Some(50_000.0)),
                dto(playlist_id, None),
            ])
            .await
            .unwrap();

        let sequences: Vec<f64> = created.iter().filter_map(|d| d.sequence).collect();
        assert_eq!(sequences, vec![0.0, 50_000.0, 50_000.0 + SEQUENCE_STEP]);
    }

    #[tokio::test]
    async fn test_batch_limit_enforced() {
        let (controller, playlist_id) = controller_with_playlist().await;
        let controller = controller.with_batch_limit(2);

        let result = controller
            .create_multiple(vec![dto(playlist_id, None); 3])
            .await;
        assert_matches!(result, Err(ApiError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_invalid_dto_writes_nothing() {
        let (controller, playlist_id) = controller_with_playlist().await;
        let mut bad = dto(playlist_id, None);
        bad.video_id = String::new();

        let result = controller
            .create_multiple(vec![dto(playlist_id, None), bad])
            .await;
        assert_matches!(result, Err(ApiError::ValidationError(_)));

        let playlist = controller.playlists.get(playlist_id).await.unwrap();
        assert!(playlist.items.is_empty());
    }

    #[tokio::test]
    async fn test_create_into_unknown_playlist() {
        let (controller, _) = controller_with_playlist().await;

        let result = controller.create(dto(Uuid::new_v4(), None)).await;
        assert_matches!(result, Err(ApiError::NotFound { resource_type: "playlist", .. }));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let (controller, _) = controller_with_playlist().await;
        assert!(controller.create_multiple(Vec::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_patch_title_keeps_sequence() {
        let (controller, playlist_id) = controller_with_playlist().await;
        let created = controller.create(dto(playlist_id, Some(3.0))).await.unwrap();

        let patched = controller
            .patch(
                created.id,
                PatchPlaylistItemDto {
                    sequence: None,
                    title: Some("Renamed".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(patched.title, "Renamed");
        assert_eq!(patched.sequence, Some(3.0));
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let (controller, playlist_id) = controller_with_playlist().await;
        let created = controller.create(dto(playlist_id, None)).await.unwrap();

        controller.delete(created.id).await.unwrap();
        assert_matches!(
            controller.delete(created.id).await,
            Err(ApiError::NotFound { .. })
        );
    }
}
