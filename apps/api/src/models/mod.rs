//! Domain models and DTOs for Streamus
//!
//! This module contains the playlist aggregate, its items, and the
//! data-transfer objects exchanged at the HTTP boundary.

pub mod playlist;

pub use playlist::{
    CreatePlaylistDto, PatchPlaylistItemDto, Playlist, PlaylistDto, PlaylistItem,
    PlaylistItemDto, PlaylistValidationError,
};
