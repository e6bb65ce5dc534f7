// SPDX-License-Identifier: AGPL-3.0-or-later
//! The note being edited and its file operations

use onlynote_core::{Document, ExportFormat};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::kv::{KeyValueStore, CONTENT_KEY, FILENAME_KEY};
use crate::{Result, StoreError};

/// Editor markup plus the file it was last saved to or opened from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub content: String,
    pub file_name: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            file_name: None,
        }
    }

    /// Start a blank, unnamed note
    pub fn new_file(&mut self) {
        self.content.clear();
        self.file_name = None;
    }

    /// Parsed view of the current content
    pub fn document(&self) -> Document {
        Document::from_markup(self.content.as_str())
    }

    /// Trim a user-entered name and give it the `.on` extension.
    ///
    /// An empty name means the user backed out, so `None` is returned. Names
    /// that would leave the save directory are rejected.
    pub fn normalize_file_name(name: &str) -> Result<Option<String>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(StoreError::InvalidFileName {
                name: name.to_string(),
            });
        }
        let suffix = format!(".{}", ExportFormat::Native.extension());
        if name.ends_with(&suffix) {
            Ok(Some(name.to_string()))
        } else {
            Ok(Some(format!("{name}{suffix}")))
        }
    }

    /// Adopt `name` and save into `dir`. `None` when the name was empty.
    pub fn save_as(&mut self, dir: &Path, name: &str) -> Result<Option<PathBuf>> {
        let Some(name) = Self::normalize_file_name(name)? else {
            debug!("save-as aborted: empty file name");
            return Ok(None);
        };
        self.file_name = Some(name);
        self.save(dir).map(Some)
    }

    /// Save under the current file name
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let name = self.file_name.as_deref().ok_or(StoreError::MissingFileName)?;
        let path = dir.join(name);
        fs::write(&path, &self.content)?;
        info!(path = %path.display(), bytes = self.content.len(), "saved note");
        Ok(path)
    }

    /// Load a `.on`, `.txt` or `.html` file as the current note
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let openable = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ExportFormat::from_extension)
            .is_some_and(|format| format.can_open());
        if !openable {
            return Err(StoreError::UnsupportedExtension { name });
        }

        self.content = fs::read_to_string(path)?;
        self.file_name = Some(name);
        info!(path = %path.display(), "opened note");
        Ok(())
    }

    /// Write content and file name to the store
    pub fn autosave(&self, store: &dyn KeyValueStore) -> Result<()> {
        store.set(CONTENT_KEY, &self.content)?;
        match &self.file_name {
            Some(name) => store.set(FILENAME_KEY, name)?,
            None => store.remove(FILENAME_KEY)?,
        }
        Ok(())
    }

    /// Read back what [`autosave`](Self::autosave) wrote
    pub fn restore(store: &dyn KeyValueStore) -> Result<Self> {
        Ok(Self {
            content: store.get(CONTENT_KEY)?.unwrap_or_default(),
            file_name: store.get(FILENAME_KEY)?,
        })
    }
}
