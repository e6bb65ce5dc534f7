// SPDX-License-Identifier: AGPL-3.0-or-later
#![no_main]

use libfuzzer_sys::fuzz_target;
use onlynote_core::{export_markup, Document, ExportConfig, ExportFormat, ExporterRegistry};

fuzz_target!(|data: &[u8]| {
    let Ok(markup) = std::str::from_utf8(data) else {
        return;
    };

    let doc = Document::from_markup(markup);
    let config = ExportConfig::default();

    let result = export_markup(&doc.root, &config.style);
    let defined = result.style_definitions.matches("<style:style ").count();
    let referenced = result.markup_body.matches("text:style-name=").count();
    assert!(defined <= referenced);

    let registry = ExporterRegistry::with_defaults();
    for format in ExportFormat::ALL {
        let _ = registry.export(&doc, format, &config);
    }
});
