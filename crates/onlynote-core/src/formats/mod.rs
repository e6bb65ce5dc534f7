// SPDX-License-Identifier: AGPL-3.0-or-later
//! Exporters for each output format

pub mod html;
pub mod native;
pub mod odt;
pub mod text;

// PDF goes through the host print pipeline and has no exporter here.

pub use html::HtmlExporter;
pub use native::NativeExporter;
pub use odt::{export_markup, ExportResult, OdtExporter};
pub use text::TextExporter;
