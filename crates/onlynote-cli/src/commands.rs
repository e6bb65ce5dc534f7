// SPDX-License-Identifier: AGPL-3.0-or-later
//! Command implementations

use anyhow::{Context, Result};
use chrono::Utc;
use onlynote_core::{
    escape_text, ExportConfig, ExportError, ExportFormat, ExporterExt, ExporterRegistry,
};
use onlynote_store::{Autosaver, KeyValueStore, Session, StoreError, Theme};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;

use crate::config::Config;

/// Where an export ended up
#[derive(Debug, PartialEq, Eq)]
pub enum ExportTarget {
    File(PathBuf),
    Stdout,
}

/// Shared state for one invocation
pub struct App {
    pub config: Config,
    pub store: Arc<dyn KeyValueStore>,
    registry: ExporterRegistry,
}

impl App {
    pub fn new(config: Config, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            config,
            store,
            registry: ExporterRegistry::with_defaults(),
        }
    }

    fn export_config(&self) -> ExportConfig {
        ExportConfig {
            style: self.config.style.clone(),
            created: Some(Utc::now()),
            ..ExportConfig::default()
        }
    }

    /// Export `input` (or the autosaved note) as `format`.
    ///
    /// `output` of `-` writes to `out`; no output means `document.<ext>` in
    /// the current directory.
    pub fn export(
        &self,
        input: Option<&Path>,
        format: ExportFormat,
        output: Option<&Path>,
        out: &mut dyn Write,
    ) -> Result<ExportTarget> {
        let session = match input {
            Some(path) => {
                let mut session = Session::new();
                session.open(path)?;
                session
            }
            None => Session::restore(self.store.as_ref())?,
        };
        let doc = session.document();
        let config = self.export_config();

        if output == Some(Path::new("-")) {
            self.registry
                .get(format)
                .ok_or(ExportError::UnsupportedFormat(format))?
                .export_writer(&doc, &mut &mut *out, &config)?;
            return Ok(ExportTarget::Stdout);
        }

        let path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(format.default_file_name()));
        let bytes = self.registry.export(&doc, format, &config)?;
        fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), format = format.label(), "exported note");
        Ok(ExportTarget::File(path))
    }

    /// Open a note file and make it the current note
    pub fn open(&self, path: &Path) -> Result<Session> {
        let mut session = Session::new();
        session.open(path)?;
        session.autosave(self.store.as_ref())?;
        Ok(session)
    }

    /// Clear the current note
    pub fn new_note(&self) -> Result<()> {
        let mut session = Session::restore(self.store.as_ref())?;
        session.new_file();
        session.autosave(self.store.as_ref())?;
        Ok(())
    }

    /// Save the current note to disk. `None` when the user gave an empty name.
    pub fn save(&self, name: Option<&str>, dir: &Path) -> Result<Option<PathBuf>> {
        let mut session = Session::restore(self.store.as_ref())?;

        let saved = match (name, session.file_name.is_some()) {
            (Some(name), _) => session.save_as(dir, name)?,
            (None, true) => Some(session.save(dir)?),
            (None, false) => session.save_as(dir, &ExportFormat::Native.default_file_name())?,
        };

        session.autosave(self.store.as_ref())?;
        Ok(saved)
    }

    /// Append each input line to the current note as its own line block,
    /// autosaving as lines arrive.
    pub async fn write_lines<R>(&self, reader: R) -> Result<Session>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut session = Session::restore(self.store.as_ref())?;
        let saver = Autosaver::spawn(Arc::clone(&self.store), self.config.debounce());

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await.context("reading input")? {
            session.content.push_str(&line_block(&line));
            saver.notify(&session);
        }

        saver.shutdown().await;
        Ok(session)
    }

    pub fn theme(&self, action: ThemeAction) -> Result<Theme> {
        let store = self.store.as_ref();
        let theme = match action {
            ThemeAction::Show => Theme::load(store)?,
            ThemeAction::Toggle => Theme::toggle(store)?,
            ThemeAction::Light => {
                Theme::Light.save(store)?;
                Theme::Light
            }
            ThemeAction::Dark => {
                Theme::Dark.save(store)?;
                Theme::Dark
            }
        };
        Ok(theme)
    }

    /// Human-readable summary of the current note
    pub fn status(&self) -> Result<String> {
        let session = Session::restore(self.store.as_ref())?;
        let theme = Theme::load(self.store.as_ref())?;
        let doc = session.document();

        Ok(format!(
            "file:  {}\nwords: {}\nchars: {}\ntheme: {} (toggle: {})",
            session.file_name.as_deref().unwrap_or("untitled"),
            doc.word_count(),
            doc.char_count(),
            theme.as_str(),
            theme.toggle_label()
        ))
    }

    /// JSON dump of the parsed tree of a note file
    pub fn tree(&self, path: &Path) -> Result<String> {
        let markup =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let doc = onlynote_core::Document::from_markup(markup);
        Ok(serde_json::to_string_pretty(&doc.root)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ThemeAction {
    Show,
    Toggle,
    Light,
    Dark,
}

/// Editor markup for one typed line; an empty line is an empty block
fn line_block(line: &str) -> String {
    if line.is_empty() {
        "<div><br></div>".to_string()
    } else {
        format!("<div>{}</div>", escape_text(line))
    }
}

/// True for errors the user should see as a plain rejection
pub fn is_rejection(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::UnsupportedExtension { .. } | StoreError::InvalidFileName { .. })
    )
}
