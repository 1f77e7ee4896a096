//! Playlist models for Streamus
//!
//! A [`Playlist`] is an aggregate root that owns its [`PlaylistItem`]s.
//! Items are kept ordered by their floating-point `sequence`, which lets a
//! client move an item between two neighbours without renumbering the rest
//! of the collection.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Gap left between consecutive items appended without an explicit sequence
pub const SEQUENCE_STEP: f64 = 10_000.0;

/// Maximum length of a playlist or item title
pub const MAX_TITLE_LENGTH: usize = 255;

/// Validation errors for incoming playlist data
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlaylistValidationError {
    #[error("sequence must be a finite number (got {0})")]
    NonFiniteSequence(f64),

    #[error("video id must not be empty")]
    EmptyVideoId,

    #[error("title exceeds maximum length of {MAX_TITLE_LENGTH} (got {0})")]
    TitleTooLong(usize),
}

/// Playlist aggregate with its items loaded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Playlist {
    /// Unique playlist identifier
    pub id: Uuid,

    /// Playlist title
    pub title: String,

    /// Items ordered by ascending sequence
    pub items: Vec<PlaylistItem>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Playlist {
    /// Create an empty playlist with a fresh identifier
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sequence for an item appended after every existing item
    pub fn next_sequence(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.sequence)
            .fold(None, |max: Option<f64>, seq| {
                Some(max.map_or(seq, |m| m.max(seq)))
            })
            .map_or(0.0, |max| max + SEQUENCE_STEP)
    }

    /// Look up an item in this playlist's collection
    pub fn item(&self, item_id: Uuid) -> Option<&PlaylistItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Mutable lookup of an item in this playlist's collection
    pub fn item_mut(&mut self, item_id: Uuid) -> Option<&mut PlaylistItem> {
        self.items.iter_mut().find(|item| item.id == item_id)
    }

    /// Whether the collection holds an item with this id
    pub fn contains_item(&self, item_id: Uuid) -> bool {
        self.item(item_id).is_some()
    }

    /// Add items to the collection and restore sequence order
    ///
    /// Items whose id is already present are skipped so each id appears
    /// exactly once.
    pub fn add_items(&mut self, items: impl IntoIterator<Item = PlaylistItem>) {
        let mut known: HashSet<Uuid> = self.items.iter().map(|item| item.id).collect();
        for item in items {
            if known.insert(item.id) {
                self.items.push(item);
            }
        }
        self.reorder();
        self.updated_at = Utc::now();
    }

    /// Remove an item from the collection, returning it if it was present
    pub fn remove_item(&mut self, item_id: Uuid) -> Option<PlaylistItem> {
        let index = self.items.iter().position(|item| item.id == item_id)?;
        self.updated_at = Utc::now();
        Some(self.items.remove(index))
    }

    /// Sort items by sequence; ties keep insertion order
    pub fn reorder(&mut self) {
        self.items.sort_by(|a, b| a.sequence.total_cmp(&b.sequence));
    }
}

/// Playlist item record from the playlist_items table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct PlaylistItem {
    /// Unique item identifier
    pub id: Uuid,

    /// Playlist this item belongs to
    pub playlist_id: Uuid,

    /// Ordering key within the playlist
    pub sequence: f64,

    /// Display title
    pub title: String,

    /// Identifier of the video this item plays
    pub video_id: String,

    /// When the item was added
    pub created_at: DateTime<Utc>,
}

impl PlaylistItem {
    /// Create an item with a fresh identifier
    pub fn new(
        playlist_id: Uuid,
        sequence: f64,
        title: impl Into<String>,
        video_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            playlist_id,
            sequence,
            title: title.into(),
            video_id: video_id.into(),
            created_at: Utc::now(),
        }
    }

    /// Apply the fields present in a partial update
    pub fn apply_patch(&mut self, patch: &PatchPlaylistItemDto) {
        if let Some(sequence) = patch.sequence {
            self.sequence = sequence;
        }
        if let Some(ref title) = patch.title {
            self.title = title.clone();
        }
    }
}

// ========== DTOs ==========

/// Playlist item as exchanged at the API boundary
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemDto {
    /// Ignored on create; the server assigns a fresh id
    #[serde(default)]
    pub id: Uuid,

    pub playlist_id: Uuid,

    /// When absent on create the item is appended after the last one
    #[serde(default)]
    pub sequence: Option<f64>,

    #[serde(default)]
    pub title: String,

    pub video_id: String,
}

impl PlaylistItemDto {
    /// Validate an incoming item before it is persisted
    pub fn validate(&self) -> Result<(), PlaylistValidationError> {
        if let Some(sequence) = self.sequence {
            validate_sequence(sequence)?;
        }
        if self.video_id.trim().is_empty() {
            return Err(PlaylistValidationError::EmptyVideoId);
        }
        validate_title(&self.title)
    }
}

impl From<&PlaylistItem> for PlaylistItemDto {
    fn from(item: &PlaylistItem) -> Self {
        Self {
            id: item.id,
            playlist_id: item.playlist_id,
            sequence: Some(item.sequence),
            title: item.title.clone(),
            video_id: item.video_id.clone(),
        }
    }
}

/// Partial update for a playlist item; only present fields are applied
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchPlaylistItemDto {
    #[serde(default)]
    pub sequence: Option<f64>,

    #[serde(default)]
    pub title: Option<String>,
}

impl PatchPlaylistItemDto {
    pub fn validate(&self) -> Result<(), PlaylistValidationError> {
        if let Some(sequence) = self.sequence {
            validate_sequence(sequence)?;
        }
        match self.title {
            Some(ref title) => validate_title(title),
            None => Ok(()),
        }
    }
}

/// Playlist creation input
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlaylistDto {
    pub title: String,
}

impl CreatePlaylistDto {
    pub fn validate(&self) -> Result<(), PlaylistValidationError> {
        validate_title(&self.title)
    }
}

/// Playlist with its items as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDto {
    pub id: Uuid,
    pub title: String,
    pub items: Vec<PlaylistItemDto>,
}

impl From<&Playlist> for PlaylistDto {
    fn from(playlist: &Playlist) -> Self {
        Self {
            id: playlist.id,
            title: playlist.title.clone(),
            items: playlist.items.iter().map(PlaylistItemDto::from).collect(),
        }
    }
}

fn validate_sequence(sequence: f64) -> Result<(), PlaylistValidationError> {
    if sequence.is_finite() {
        Ok(())
    } else {
        Err(PlaylistValidationError::NonFiniteSequence(sequence))
    }
}

fn validate_title(title: &str) -> Result<(), PlaylistValidationError> {
    let len = title.chars().count();
    if len > MAX_TITLE_LENGTH {
        return Err(PlaylistValidationError::TitleTooLong(len));
    }
    Ok(())
}
