//! Playlist and playlist item HTTP route handlers
//!
//! - `POST   /playlists` - Create an empty playlist
//! - `GET    /playlists/:id` - Playlist with its items
//! - `DELETE /playlists/:id` - Delete a playlist and its items
//! - `POST   /playlist-items` - Create one item
//! - `POST   /playlist-items/batch` - Create many items in one write
//! - `GET    /playlist-items/:id` - Fetch one item
//! - `PATCH  /playlist-items/:id` - Partially update an item
//! - `DELETE /playlist-items/:id` - Delete an item
//!
//! Each request runs in its own [`Session`].

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::controllers::{PlaylistController, PlaylistItemController, DEFAULT_BATCH_LIMIT};
use crate::error::ApiResult;
use crate::models::{CreatePlaylistDto, PatchPlaylistItemDto, PlaylistItemDto};
use crate::repositories::PlaylistStore;
use crate::services::{ManagerFactory, Session};

/// Shared application state for playlist handlers
#[derive(Clone)]
pub struct PlaylistState {
    /// Backing store shared by every request's session
    pub store: Arc<dyn PlaylistStore>,
    pub factory: ManagerFactory,
    /// Maximum items accepted by the batch endpoint
    pub batch_limit: usize,
}

impl PlaylistState {
    pub fn new(store: Arc<dyn PlaylistStore>) -> Self {
        Self {
            store,
            factory: ManagerFactory::new(),
            batch_limit: DEFAULT_BATCH_LIMIT,
        }
    }

    pub fn with_batch_limit(mut self, batch_limit: usize) -> Self {
        self.batch_limit = batch_limit;
        self
    }

    fn open_session(&self) -> Arc<Session> {
        Arc::new(Session::new(Arc::clone(&self.store)))
    }

    fn playlist_controller(&self) -> PlaylistController {
        PlaylistController::new(self.open_session(), &self.factory)
    }

    fn item_controller(&self) -> PlaylistItemController {
        PlaylistItemController::new(self.open_session(), &self.factory)
            .with_batch_limit(self.batch_limit)
    }
}

/// Create router for `/playlists`
pub fn playlist_router(state: PlaylistState) -> Router {
    Router::new()
        .route("/", post(create_playlist))
        .route("/:id", get(get_playlist).delete(delete_playlist))
        .with_state(state)
}

/// Create router for `/playlist-items`
pub fn playlist_item_router(state: PlaylistState) -> Router {
    Router::new()
        .route("/", post(create_item))
        .route("/batch", post(create_items))
        .route("/:id", get(get_item).patch(patch_item).delete(delete_item))
        .with_state(state)
}

// ========== Playlist Handlers ==========

async fn create_playlist(
    State(state): State<PlaylistState>,
    body: Result<Json<CreatePlaylistDto>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(dto) = body?;
    let created = state.playlist_controller().create(dto).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_playlist(
    State(state): State<PlaylistState>,
    Path(playlist_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let playlist = state.playlist_controller().get(playlist_id).await?;
    Ok(Json(playlist))
}

async fn delete_playlist(
    State(state): State<PlaylistState>,
    Path(playlist_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.playlist_controller().delete(playlist_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ========== Playlist Item Handlers ==========

async fn create_item(
    State(state): State<PlaylistState>,
    body: Result<Json<PlaylistItemDto>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(dto) = body?;
    let created = state.item_controller().create(dto).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn create_items(
    State(state): State<PlaylistState>,
    body: Result<Json<Vec<PlaylistItemDto>>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(dtos) = body?;
    let created = state.item_controller().create_multiple(dtos).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_item(
    State(state): State<PlaylistState>,
    Path(item_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let item = state.item_controller().get(item_id).await?;
    Ok(Json(item))
}

async fn patch_item(
    State(state): State<PlaylistState>,
    Path(item_id): Path<Uuid>,
    body: Result<Json<PatchPlaylistItemDto>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(patch) = body?;
    let item = state.item_controller().patch(item_id, patch).await?;
    Ok(Json(item))
}

async fn delete_item(
    State(state): State<PlaylistState>,
    Path(item_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.item_controller().delete(item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
