//! Playlist controller

use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::models::{CreatePlaylistDto, Playlist, PlaylistDto};
use crate::services::{ManagerFactory, PlaylistManager, Session};

/// Create, read and delete playlists within one session
#[derive(Debug, Clone)]
pub struct PlaylistController {
    session: Arc<Session>,
    playlists: PlaylistManager,
}

impl PlaylistController {
    pub fn new(session: Arc<Session>, factory: &ManagerFactory) -> Self {
        Self {
            playlists: factory.playlist_manager(&session),
            session,
        }
    }

    #[instrument(skip(self, dto), fields(session_id = %self.session.id()))]
    pub async fn create(&self, dto: CreatePlaylistDto) -> ApiResult<PlaylistDto> {
        dto.validate()?;

        let playlist = Playlist::new(dto.title);
        self.playlists.save(&playlist).await?;

        Ok(PlaylistDto::from(&playlist))
    }

    pub async fn get(&self, playlist_id: Uuid) -> ApiResult<PlaylistDto> {
        let playlist = self.playlists.get(playlist_id).await?;
        Ok(PlaylistDto::from(&playlist))
    }

    /// Delete a playlist together with all of its items
    #[instrument(skip(self), fields(session_id = %self.session.id()))]
    pub async fn delete(&self, playlist_id: Uuid) -> ApiResult<()> {
        self.playlists.delete(playlist_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::repositories::InMemoryPlaylistStore;

    fn controller() -> PlaylistController {
        let session = Arc::new(Session::new(Arc::new(InMemoryPlaylistStore::new())));
        PlaylistController::new(session, &ManagerFactory::new())
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let controller = controller();

        let created = controller
            .create(CreatePlaylistDto {
                title: "Focus".to_string(),
            })
            .await
            .unwrap();
        let fetched = controller.get(created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert!(fetched.items.is_empty());
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let controller = controller();
        let created = controller
            .create(CreatePlaylistDto {
                title: "Gone".to_string(),
            })
            .await
            .unwrap();

        controller.delete(created.id).await.unwrap();
        assert!(matches!(
            controller.get(created.id).await,
            Err(ApiError::NotFound { .. })
        ));
    }
}
