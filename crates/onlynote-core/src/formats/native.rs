// SPDX-License-Identifier: AGPL-3.0-or-later
//! Native `.on` exporter: the editor markup, byte for byte

use crate::traits::{ExportConfig, ExportFormat, Exporter, Result};
use crate::tree::Document;

pub struct NativeExporter;

impl NativeExporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NativeExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter for NativeExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Native
    }

    fn export(&self, doc: &Document, _config: &ExportConfig) -> Result<Vec<u8>> {
        Ok(doc.markup.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_saved_verbatim() {
        let markup = "<div><b>kept</b> &amp; <!-- as is --></div>";
        let doc = Document::from_markup(markup);
        let bytes = NativeExporter::new()
            .export(&doc, &ExportConfig::default())
            .unwrap();
        assert_eq!(bytes, markup.as_bytes());
    }
}
