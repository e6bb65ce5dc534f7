// SPDX-License-Identifier: AGPL-3.0-or-later
//! OnlyNote Core - Styled note tree and exporters
//!
//! This crate provides:
//! - A styled document tree parsed from editor markup
//! - The style model: resolved properties, per-element overrides, color and
//!   size normalization
//! - The style-aware ODT exporter with deduplicated automatic styles
//! - Exporters for `.on`, `.txt`, `.html` and `.odt`

pub mod escape;
pub mod formats;
pub mod markup;
pub mod package;
pub mod style;
pub mod traits;
pub mod tree;

pub use escape::escape_text;
pub use formats::{export_markup, ExportResult};
pub use markup::parse_markup;
pub use style::{normalize_color, StyleConfig, StyleProperties, StyleRegistry};
pub use traits::{
    ExportConfig, ExportError, ExportFormat, Exporter, ExporterExt, ExporterRegistry, Result,
};
pub use tree::{Document, StyledNode, TagKind};
