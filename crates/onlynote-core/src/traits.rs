// SPDX-License-Identifier: AGPL-3.0-or-later
//! Exporter trait, output formats and the exporter registry

use crate::style::StyleConfig;
use crate::tree::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use tracing::debug;

/// Error type for exporting
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Unsupported export format: {0:?}")]
    UnsupportedFormat(ExportFormat),

    #[error("Packaging error: {0}")]
    Package(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// Output formats a note can be written as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Raw editor markup, OnlyNote's own `.on` files
    Native,
    PlainText,
    Html,
    Odt,
}

impl ExportFormat {
    /// File extension for this format
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Native => "on",
            Self::PlainText => "txt",
            Self::Html => "html",
            Self::Odt => "odt",
        }
    }

    /// Short display name
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Native => "OnlyNote",
            Self::PlainText => "TXT",
            Self::Html => "HTML",
            Self::Odt => "ODT",
        }
    }

    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Native | Self::PlainText => "text/plain",
            Self::Html => "text/html",
            Self::Odt => "application/vnd.oasis.opendocument.text",
        }
    }

    /// Formats that can be opened back into the editor
    pub const fn can_open(&self) -> bool {
        matches!(self, Self::Native | Self::PlainText | Self::Html)
    }

    /// Look up a format by file extension (case-insensitive, leading dot optional)
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }

    /// File name offered when exporting without an explicit name
    pub fn default_file_name(&self) -> String {
        format!("document.{}", self.extension())
    }

    pub const ALL: [Self; 4] = [Self::Native, Self::PlainText, Self::Html, Self::Odt];
}

/// Configuration for exporting
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Size and color resolution for the ODT style pass
    pub style: StyleConfig,
    /// Document title for HTML and ODT metadata
    pub title: String,
    /// Creation date recorded in ODT metadata
    pub created: Option<DateTime<Utc>>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            style: StyleConfig::default(),
            title: "Exported Document".to_string(),
            created: None,
        }
    }
}

/// Exporter trait: convert a note to a target format
pub trait Exporter: Send + Sync {
    /// The format this exporter produces
    fn format(&self) -> ExportFormat;

    /// Export a document to bytes
    fn export(&self, doc: &Document, config: &ExportConfig) -> Result<Vec<u8>>;
}

/// Extension trait for streaming operations (not dyn-compatible itself,
/// but implemented for `dyn Exporter`)
pub trait ExporterExt: Exporter {
    /// Export to a writer
    fn export_writer<W: Write>(
        &self,
        doc: &Document,
        writer: &mut W,
        config: &ExportConfig,
    ) -> Result<()> {
        let output = self.export(doc, config)?;
        writer.write_all(&output)?;
        Ok(())
    }
}

impl<T: Exporter + ?Sized> ExporterExt for T {}

/// Registry of exporters
pub struct ExporterRegistry {
    exporters: HashMap<ExportFormat, Box<dyn Exporter>>,
}

impl ExporterRegistry {
    pub fn new() -> Self {
        Self {
            exporters: HashMap::new(),
        }
    }

    /// Registry with every built-in exporter
    pub fn with_defaults() -> Self {
        use crate::formats::{HtmlExporter, NativeExporter, OdtExporter, TextExporter};

        let mut registry = Self::new();
        registry.register(Box::new(NativeExporter::new()));
        registry.register(Box::new(TextExporter::new()));
        registry.register(Box::new(HtmlExporter::new()));
        registry.register(Box::new(OdtExporter::new()));
        registry
    }

    pub fn register(&mut self, exporter: Box<dyn Exporter>) {
        self.exporters.insert(exporter.format(), exporter);
    }

    pub fn get(&self, format: ExportFormat) -> Option<&dyn Exporter> {
        self.exporters.get(&format).map(|e| e.as_ref())
    }

    /// Export a document with the exporter registered for `format`
    pub fn export(
        &self,
        doc: &Document,
        format: ExportFormat,
        config: &ExportConfig,
    ) -> Result<Vec<u8>> {
        let exporter = self
            .get(format)
            .ok_or(ExportError::UnsupportedFormat(format))?;
        let bytes = exporter.export(doc, config)?;
        debug!(format = format.label(), bytes = bytes.len(), "exported note");
        Ok(bytes)
    }
}

impl Default for ExporterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
