// SPDX-License-Identifier: AGPL-3.0-or-later
//! Light/dark theme preference

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::kv::{KeyValueStore, THEME_KEY};
use crate::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub const fn toggled(&self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Caption of the toggle control, naming the mode it switches to
    pub const fn toggle_label(&self) -> &'static str {
        match self {
            Self::Light => "Dark Mode",
            Self::Dark => "Light Mode",
        }
    }

    /// Stored preference; anything other than `"dark"` is light
    pub fn load(store: &dyn KeyValueStore) -> Result<Self> {
        Ok(match store.get(THEME_KEY)?.as_deref() {
            Some("dark") => Self::Dark,
            _ => Self::Light,
        })
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        store.set(THEME_KEY, self.as_str())
    }

    /// Flip the stored theme and return the new one
    pub fn toggle(store: &dyn KeyValueStore) -> Result<Self> {
        let theme = Self::load(store)?.toggled();
        theme.save(store)?;
        info!(theme = theme.as_str(), "theme switched");
        Ok(theme)
    }
}
