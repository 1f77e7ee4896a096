//! Streamus API library
//!
//! This module exposes the core API components for use in integration tests
//! and as a library.

pub mod config;
pub mod controllers;
pub mod error;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use repositories::{InMemoryPlaylistStore, PlaylistRepository, PlaylistStore};
pub use services::{ManagerFactory, Session};
