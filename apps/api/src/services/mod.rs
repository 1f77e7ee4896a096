//! Unit-of-work and manager layer for Streamus
//!
//! This module contains:
//! - The session (identity map + write-through to the store)
//! - Playlist and playlist item managers bound to a session
//! - Store health checks

pub mod health;
pub mod manager;
pub mod session;

pub use health::HealthService;
pub use manager::{ManagerFactory, PlaylistItemManager, PlaylistManager};
pub use session::Session;
