//! Controllers for the Streamus API
//!
//! Controllers take and return DTOs and delegate persistence to the
//! managers of a single [`Session`](crate::services::Session). The HTTP
//! routes open one session per request; tests can drive a controller
//! directly and inspect the same session through the managers.

pub mod playlist;
pub mod playlist_item;

pub use playlist::PlaylistController;
pub use playlist_item::{PlaylistItemController, DEFAULT_BATCH_LIMIT};
