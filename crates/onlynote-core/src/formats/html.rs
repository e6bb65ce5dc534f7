// SPDX-License-Identifier: AGPL-3.0-or-later
//! Standalone HTML page exporter

use crate::escape::escape_text;
use crate::traits::{ExportConfig, ExportFormat, Exporter, Result};
use crate::tree::Document;

/// Wraps the editor markup in a complete HTML page
pub struct HtmlExporter;

impl HtmlExporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter for HtmlExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Html
    }

    fn export(&self, doc: &Document, config: &ExportConfig) -> Result<Vec<u8>> {
        let page = format!(
            "\n<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
            escape_text(&config.title),
            doc.markup
        );
        Ok(page.into_bytes())
    }
}
