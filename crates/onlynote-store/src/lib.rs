// SPDX-License-Identifier: AGPL-3.0-or-later
//! OnlyNote Store - note persistence
//!
//! Provides:
//! - A local-storage style key-value store (in memory or JSON on disk)
//! - The note session: new, save, save-as and open with extension checks
//! - Light/dark theme persistence
//! - A debounced autosaver running on tokio

use thiserror::Error;

pub mod autosave;
pub mod kv;
pub mod session;
pub mod theme;

pub use autosave::{Autosaver, SaveStatus, DEFAULT_DEBOUNCE};
pub use kv::{FileStore, KeyValueStore, MemoryStore, CONTENT_KEY, FILENAME_KEY, THEME_KEY};
pub use session::Session;
pub use theme::Theme;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("\"{name}\" is not an OnlyNote file (expected .on, .txt or .html)")]
    UnsupportedExtension { name: String },

    #[error("\"{name}\" is not a plain file name")]
    InvalidFileName { name: String },

    #[error("The note has no file name yet; use save-as first")]
    MissingFileName,
}

pub type Result<T> = std::result::Result<T, StoreError>;
