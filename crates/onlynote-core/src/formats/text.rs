// SPDX-License-Identifier: AGPL-3.0-or-later
//! Plain text exporter
//!
//! Produces the rendered text of a note: line breaks become newlines and
//! adjacent blocks are separated by exactly one newline.

use crate::traits::{ExportConfig, ExportFormat, Exporter, Result};
use crate::tree::{Document, StyledNode, TagKind};

/// Plain text exporter
pub struct TextExporter;

impl TextExporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter for TextExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::PlainText
    }

    fn export(&self, doc: &Document, _config: &ExportConfig) -> Result<Vec<u8>> {
        Ok(rendered_text(&doc.root).into_bytes())
    }
}

/// Rendered text of a tree
pub fn rendered_text(root: &StyledNode) -> String {
    let mut writer = TextWriter::default();
    writer.visit(root);
    writer.output
}

#[derive(Default)]
struct TextWriter {
    output: String,
    /// A block just closed; the next content starts on a new line
    pending_break: bool,
}

impl TextWriter {
    fn visit(&mut self, node: &StyledNode) {
        match node {
            StyledNode::Text { content } => {
                if !content.is_empty() {
                    self.flush_break();
                    self.output.push_str(content);
                }
            }
            StyledNode::Element {
                tag: TagKind::LineBreak,
                ..
            } => {
                self.flush_break();
                self.output.push('\n');
            }
            StyledNode::Element { tag, children, .. } => {
                if tag.is_block() {
                    if !self.output.is_empty() && !self.output.ends_with('\n') {
                        self.output.push('\n');
                    }
                    self.pending_break = false;
                }
                for child in children {
                    self.visit(child);
                }
                if tag.is_block() {
                    self.pending_break = true;
                }
            }
        }
    }

    fn flush_break(&mut self) {
        if self.pending_break && !self.output.is_empty() && !self.output.ends_with('\n') {
            self.output.push('\n');
        }
        self.pending_break = false;
    }
}
