//! HTTP route handlers for the Streamus API
//!
//! - Playlist and playlist item endpoints
//! - Health check and status endpoints

pub mod health;
pub mod playlists;

pub use health::{health_router, HealthState};
pub use playlists::{playlist_item_router, playlist_router, PlaylistState};

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::repositories::PlaylistStore;

/// Build the application router without transport layers (CORS, tracing)
pub fn app_router(store: Arc<dyn PlaylistStore>, batch_limit: usize) -> Router {
    let playlist_state = PlaylistState::new(Arc::clone(&store)).with_batch_limit(batch_limit);

    Router::new()
        .route("/", get(root))
        .nest("/health", health_router(HealthState::new(store)))
        .nest("/playlists", playlist_router(playlist_state.clone()))
        .nest("/playlist-items", playlist_item_router(playlist_state))
}

async fn root() -> &'static str {
    "Streamus playlist API"
}
