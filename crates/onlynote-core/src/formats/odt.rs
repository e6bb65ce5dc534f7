// SPDX-License-Identifier: AGPL-3.0-or-later
//! ODT exporter
//!
//! The style pass walks the styled tree once, threading the inherited
//! [`StyleProperties`] down the recursion. Text runs with non-default
//! properties are wrapped in spans that reference automatic styles; each
//! distinct property combination gets exactly one style, named `Style0`,
//! `Style1`, ... in the order it is first met. The registry lives only for
//! the duration of one call.

use tracing::debug;

use crate::escape::{escape_text, escape_text_into};
use crate::package::PackageWriter;
use crate::style::{StyleConfig, StyleOverride, StyleProperties, StyleRegistry};
use crate::traits::{ExportConfig, ExportFormat, Exporter, Result};
use crate::tree::{Document, StyledNode, TagKind};

const EMPTY_PARAGRAPH: &str = "<text:p/>";
const PARAGRAPH_OPEN: &str = "<text:p>";
const PARAGRAPH_CLOSE: &str = "</text:p>";
const LINE_BREAK: &str = "<text:line-break/>";

const NAMESPACES: &str = r#"xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:style="urn:oasis:names:tc:opendocument:xmlns:style:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" xmlns:fo="urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:meta="urn:oasis:names:tc:opendocument:xmlns:meta:1.0""#;

/// The two fragments of a style pass, spliced into `content.xml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    /// `<text:p>` paragraphs for `<office:text>`
    pub markup_body: String,
    /// `<style:style>` definitions for `<office:automatic-styles>`
    pub style_definitions: String,
}

/// Convert a styled tree into ODF text markup with deduplicated styles.
///
/// Total and deterministic: any finite tree produces output, and the same
/// tree always produces the same bytes.
///
/// Limitations: a block nested in another block (`<div><div>x</div></div>`)
/// yields nested `<text:p>`, and top-level inline content next to a block
/// stays outside any paragraph. Both are outside the ODF schema, which some
/// consumers reject.
pub fn export_markup(root: &StyledNode, config: &StyleConfig) -> ExportResult {
    let mut pass = StylePass {
        config,
        registry: StyleRegistry::new(),
        wrote_paragraph: false,
    };

    let mut body = String::new();
    pass.visit(root, &StyleProperties::default(), &mut body);

    let markup_body = if !root.has_text() {
        EMPTY_PARAGRAPH.to_string()
    } else if !pass.wrote_paragraph {
        format!("{PARAGRAPH_OPEN}{body}{PARAGRAPH_CLOSE}")
    } else {
        body
    };

    let style_definitions: String = pass
        .registry
        .definitions()
        .map(|(name, props)| style_definition(name, props))
        .collect();

    debug!(
        styles = pass.registry.len(),
        body_len = markup_body.len(),
        "style pass finished"
    );

    ExportResult {
        markup_body,
        style_definitions,
    }
}

struct StylePass<'a> {
    config: &'a StyleConfig,
    registry: StyleRegistry,
    wrote_paragraph: bool,
}

impl StylePass<'_> {
    fn visit(&mut self, node: &StyledNode, inherited: &StyleProperties, out: &mut String) {
        match node {
            StyledNode::Text { content } => {
                if content.is_empty() {
                    return;
                }
                if inherited.is_default() {
                    escape_text_into(out, content);
                } else {
                    let name = self.registry.intern(inherited);
                    out.push_str("<text:span text:style-name=\"");
                    out.push_str(name);
                    out.push_str("\">");
                    escape_text_into(out, content);
                    out.push_str("</text:span>");
                }
            }

            StyledNode::Element {
                tag: TagKind::LineBreak,
                ..
            } => out.push_str(LINE_BREAK),

            StyledNode::Element {
                tag,
                attributes,
                children,
            } => {
                let own = StyleOverride::for_element(*tag, attributes, self.config);
                let merged = own.apply(inherited);

                if tag.is_block() {
                    out.push_str(PARAGRAPH_OPEN);
                    for child in children {
                        self.visit(child, &merged, out);
                    }
                    out.push_str(PARAGRAPH_CLOSE);
                    self.wrote_paragraph = true;
                } else {
                    for child in children {
                        self.visit(child, &merged, out);
                    }
                }
            }
        }
    }
}

fn style_definition(name: &str, props: &StyleProperties) -> String {
    let mut attrs = String::new();
    if props.bold {
        attrs.push_str(r#" fo:font-weight="bold""#);
    }
    if props.italic {
        attrs.push_str(r#" fo:font-style="italic""#);
    }
    if props.underline {
        attrs.push_str(
            r#" style:text-underline-style="solid" style:text-underline-width="auto" style:text-underline-color="font-color""#,
        );
    }
    if let Some(pt) = props.font_size_pt {
        attrs.push_str(&format!(r#" fo:font-size="{pt}pt""#));
    }
    if let Some(color) = &props.color_hex {
        attrs.push_str(&format!(r#" fo:color="{color}""#));
    }

    format!(
        r#"<style:style style:name="{name}" style:family="text"><style:text-properties{attrs}/></style:style>"#
    )
}

fn content_xml(result: &ExportResult) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content {NAMESPACES} office:version="1.3"><office:automatic-styles>{}</office:automatic-styles><office:body><office:text>{}</office:text></office:body></office:document-content>
"#,
        result.style_definitions, result.markup_body
    )
}

fn styles_xml() -> String {
    format!(
        r##"<?xml version="1.0" encoding="UTF-8"?>
<office:document-styles {NAMESPACES} office:version="1.3"><office:styles><style:default-style style:family="paragraph"><style:text-properties fo:font-size="12pt" fo:color="#000000"/></style:default-style><style:style style:name="Standard" style:family="paragraph" style:class="text"/></office:styles></office:document-styles>
"##
    )
}

fn meta_xml(config: &ExportConfig) -> String {
    let mut meta = format!(
        "<meta:generator>OnlyNote/{}</meta:generator><dc:title>{}</dc:title>",
        env!("CARGO_PKG_VERSION"),
        escape_text(&config.title)
    );
    if let Some(created) = config.created {
        let stamp = created.format("%Y-%m-%dT%H:%M:%S");
        meta.push_str(&format!(
            "<meta:creation-date>{stamp}</meta:creation-date><dc:date>{stamp}</dc:date>"
        ));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-meta {NAMESPACES} office:version="1.3"><office:meta>{meta}</office:meta></office:document-meta>
"#
    )
}

/// OpenDocument text exporter
pub struct OdtExporter;

impl OdtExporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OdtExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter for OdtExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Odt
    }

    fn export(&self, doc: &Document, config: &ExportConfig) -> Result<Vec<u8>> {
        let result = export_markup(&doc.root, &config.style);

        let mut writer = PackageWriter::new();
        writer.set_mimetype(ExportFormat::Odt.mime_type())?;
        writer.add_file("content.xml", content_xml(&result).as_bytes())?;
        writer.add_file("styles.xml", styles_xml().as_bytes())?;
        writer.add_file("meta.xml", meta_xml(config).as_bytes())?;
        writer.finish_to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Read};

    fn export(markup: &str) -> ExportResult {
        export_markup(&Document::from_markup(markup).root, &StyleConfig::default())
    }

    fn text(s: &str) -> StyledNode {
        StyledNode::text(s)
    }

    fn el(tag: TagKind, children: Vec<StyledNode>) -> StyledNode {
        StyledNode::element(tag, children)
    }

    #[test]
    fn test_empty_tree() {
        let result = export_markup(&StyledNode::root(Vec::new()), &StyleConfig::default());
        assert_eq!(result.markup_body, "<text:p/>");
        assert_eq!(result.style_definitions, "");
    }

    #[test]
    fn test_tree_without_text_is_empty_paragraph() {
        let result = export("<div><br></div><div></div>");
        assert_eq!(result.markup_body, "<text:p/>");
        assert_eq!(result.style_definitions, "");
    }

    #[test]
    fn test_single_bold_text() {
        let root = StyledNode::root(vec![el(TagKind::Bold, vec![text("Hi")])]);
        let result = export_markup(&root, &StyleConfig::default());

        assert_eq!(
            result.markup_body,
            r#"<text:p><text:span text:style-name="Style0">Hi</text:span></text:p>"#
        );
        assert_eq!(
            result.style_definitions,
            r#"<style:style style:name="Style0" style:family="text"><style:text-properties fo:font-weight="bold"/></style:style>"#
        );
    }

    #[test]
    fn test_nested_bold_italic_merge_into_one_style() {
        let root = StyledNode::root(vec![el(
            TagKind::Bold,
            vec![el(TagKind::Italic, vec![text("both")])],
        )]);
        let result = export_markup(&root, &StyleConfig::default());

        assert_eq!(result.style_definitions.matches("<style:style ").count(), 1);
        assert!(result
            .style_definitions
            .contains(r#"fo:font-weight="bold" fo:font-style="italic""#));
        assert_eq!(
            result.markup_body,
            r#"<text:p><text:span text:style-name="Style0">both</text:span></text:p>"#
        );
    }

    #[test]
    fn test_repeated_style_is_shared() {
        let result = export("<div><b>one</b></div><div><b>two</b> plain <b>three</b></div>");

        assert_eq!(result.style_definitions.matches("<style:style ").count(), 1);
        assert_eq!(
            result
                .markup_body
                .matches(r#"text:style-name="Style0""#)
                .count(),
            3
        );
        assert_eq!(
            result.markup_body,
            concat!(
                r#"<text:p><text:span text:style-name="Style0">one</text:span></text:p>"#,
                r#"<text:p><text:span text:style-name="Style0">two</text:span> plain "#,
                r#"<text:span text:style-name="Style0">three</text:span></text:p>"#,
            )
        );
    }

    #[test]
    fn test_styles_numbered_in_first_encounter_order() {
        let result = export("<i>a</i><b>b</b><i>c</i><u>d</u>");
        assert_eq!(
            result.markup_body,
            concat!(
                r#"<text:p><text:span text:style-name="Style0">a</text:span>"#,
                r#"<text:span text:style-name="Style1">b</text:span>"#,
                r#"<text:span text:style-name="Style0">c</text:span>"#,
                r#"<text:span text:style-name="Style2">d</text:span></text:p>"#,
            )
        );
        let names: Vec<&str> = result
            .style_definitions
            .match_indices("style:name=\"Style")
            .map(|(i, _)| &result.style_definitions[i + 12..i + 18])
            .collect();
        assert_eq!(names, vec!["Style0", "Style1", "Style2"]);
    }

    #[test]
    fn test_font_size_and_color() {
        let result = export(r#"<div><span style="font-size: 20px; color: red">big</span></div>"#);
        assert!(result
            .style_definitions
            .contains(r##"fo:font-size="15pt" fo:color="#ff0000""##));
    }

    #[test]
    fn test_baseline_size_and_black_emit_plain_text() {
        let result = export(
            r#"<div><span style="font-size: 16px">a</span><font color="black">b</font><font color="rgb(0,0,0)">c</font></div>"#,
        );
        assert_eq!(result.markup_body, "<text:p>abc</text:p>");
        assert_eq!(result.style_definitions, "");
    }

    #[test]
    fn test_black_child_keeps_inherited_color() {
        let result = export(r##"<font color="red">a<font color="#000000">b</font></font>"##);
        assert_eq!(
            result.markup_body,
            concat!(
                r#"<text:p><text:span text:style-name="Style0">a</text:span>"#,
                r#"<text:span text:style-name="Style0">b</text:span></text:p>"#,
            )
        );
        assert_eq!(result.style_definitions.matches("<style:style ").count(), 1);
    }

    #[test]
    fn test_baseline_child_keeps_inherited_size() {
        let result = export(
            r#"<div><span style="font-size: 20px">a<span style="font-size: 16px">b</span></span></div>"#,
        );
        assert_eq!(
            result.markup_body,
            concat!(
                r#"<text:p><text:span text:style-name="Style0">a</text:span>"#,
                r#"<text:span text:style-name="Style0">b</text:span></text:p>"#,
            )
        );
        assert!(result.style_definitions.contains(r#"fo:font-size="15pt""#));
    }

    #[test]
    fn test_unsupported_color_is_dropped() {
        let result = export(r#"<span style="color: hsl(10, 50%, 50%)">x</span>"#);
        assert_eq!(result.markup_body, "<text:p>x</text:p>");
        assert_eq!(result.style_definitions, "");
    }

    #[test]
    fn test_reserved_characters_escaped() {
        let result = export("<div>a &lt; b &amp;&amp; c &gt; d</div>");
        assert_eq!(result.markup_body, "<text:p>a &lt; b &amp;&amp; c &gt; d</text:p>");

        let root = StyledNode::root(vec![el(TagKind::Bold, vec![text("<&>")])]);
        let result = export_markup(&root, &StyleConfig::default());
        assert!(result.markup_body.contains(">&lt;&amp;&gt;</text:span>"));
    }

    #[test]
    fn test_line_break_does_not_descend() {
        let br = el(TagKind::LineBreak, vec![text("hidden")]);
        let root = StyledNode::root(vec![el(TagKind::Block, vec![text("a"), br, text("b")])]);
        let result = export_markup(&root, &StyleConfig::default());
        assert_eq!(result.markup_body, "<text:p>a<text:line-break/>b</text:p>");
    }

    #[test]
    fn test_unknown_tag_contributes_children_only() {
        let root = StyledNode::root(vec![el(TagKind::Other, vec![text("x")])
            .with_attribute("style", "font-weight: bold; color: red")]);
        let result = export_markup(&root, &StyleConfig::default());
        assert_eq!(result.markup_body, "<text:p>x</text:p>");
        assert_eq!(result.style_definitions, "");
    }

    #[test]
    fn test_inline_run_wrapped_once() {
        let result = export("one <i>two</i> three");
        assert_eq!(
            result.markup_body,
            r#"<text:p>one <text:span text:style-name="Style0">two</text:span> three</text:p>"#
        );
    }

    #[test]
    fn test_nested_blocks_nest_paragraphs() {
        let result = export("<div><div>x</div></div>");
        assert_eq!(result.markup_body, "<text:p><text:p>x</text:p></text:p>");
    }

    #[test]
    fn test_mixed_content_is_not_rewrapped() {
        let result = export("lead<div>block</div>");
        assert_eq!(result.markup_body, "lead<text:p>block</text:p>");
    }

    #[test]
    fn test_exporting_twice_is_identical() {
        let markup = r#"<div><b>a</b><span style="font-size: 24px">b</span></div><i>c</i>"#;
        assert_eq!(export(markup), export(markup));
    }

    #[test]
    fn test_odt_package_contents() {
        let doc = Document::from_markup("<div><b>Hi</b> there</div>");
        let config = ExportConfig {
            title: "Notes & more".to_string(),
            created: Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()),
            ..ExportConfig::default()
        };
        let bytes = OdtExporter::new().export(&doc, &config).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        assert_eq!(archive.by_index(0).unwrap().name(), "mimetype");

        let mut content = String::new();
        archive
            .by_name("content.xml")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert!(content.contains(
            r#"<office:automatic-styles><style:style style:name="Style0" style:family="text">"#
        ));
        assert!(content.contains(
            r#"<office:text><text:p><text:span text:style-name="Style0">Hi</text:span> there</text:p></office:text>"#
        ));

        let mut meta = String::new();
        archive
            .by_name("meta.xml")
            .unwrap()
            .read_to_string(&mut meta)
            .unwrap();
        assert!(meta.contains("<dc:title>Notes &amp; more</dc:title>"));
        assert!(meta.contains("<meta:creation-date>2024-03-01T12:30:00</meta:creation-date>"));

        assert!(archive.by_name("styles.xml").is_ok());
        assert!(archive.by_name("META-INF/manifest.xml").is_ok());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn container_tag_strategy() -> impl Strategy<Value = TagKind> {
        prop_oneof![
            Just(TagKind::Block),
            Just(TagKind::Bold),
            Just(TagKind::Italic),
            Just(TagKind::Underline),
            Just(TagKind::Font),
            Just(TagKind::Inline),
            Just(TagKind::Other),
        ]
    }

    fn style_attr_strategy() -> impl Strategy<Value = Option<&'static str>> {
        proptest::option::of(prop_oneof![
            Just("font-size: 20px"),
            Just("font-size: 16px"),
            Just("color: red"),
            Just("color: black"),
            Just("color: rgb(0, 0, 255)"),
            Just("font-weight: normal"),
        ])
    }

    fn leaf_strategy() -> impl Strategy<Value = StyledNode> {
        prop_oneof![
            "[a-z <>&]{0,8}".prop_map(|s| StyledNode::text(s)),
            Just(StyledNode::element(TagKind::LineBreak, Vec::new())),
        ]
    }

    fn tree_strategy() -> impl Strategy<Value = StyledNode> {
        let node = leaf_strategy().prop_recursive(4, 48, 4, |inner| {
            (
                container_tag_strategy(),
                prop::collection::vec(inner, 0..4),
                style_attr_strategy(),
            )
                .prop_map(|(tag, children, style)| {
                    let node = StyledNode::element(tag, children);
                    match style {
                        Some(style) => node.with_attribute("style", style),
                        None => node,
                    }
                })
        });
        prop::collection::vec(node, 0..4).prop_map(StyledNode::root)
    }

    fn defined_names(defs: &str) -> Vec<String> {
        defs.split("<style:style style:name=\"")
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
            .map(str::to_string)
            .collect()
    }

    fn referenced_names(body: &str) -> BTreeSet<String> {
        body.split("text:style-name=\"")
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
            .map(str::to_string)
            .collect()
    }

    proptest! {
        // Property: same tree, same bytes
        #[test]
        fn prop_export_deterministic(tree in tree_strategy()) {
            let config = StyleConfig::default();
            prop_assert_eq!(export_markup(&tree, &config), export_markup(&tree, &config));
        }

        // Property: every definition is unique, sequentially named and referenced
        #[test]
        fn prop_styles_defined_once_and_used(tree in tree_strategy()) {
            let result = export_markup(&tree, &StyleConfig::default());
            let defined = defined_names(&result.style_definitions);
            let expected: Vec<String> = (0..defined.len()).map(|i| format!("Style{i}")).collect();
            prop_assert_eq!(&defined, &expected);

            let referenced = referenced_names(&result.markup_body);
            let defined: BTreeSet<String> = defined.into_iter().collect();
            prop_assert_eq!(referenced, defined);
        }

        // Property: text never leaks raw markup characters
        #[test]
        fn prop_text_escaped(content in "[a-z<>& ]{1,24}") {
            let tree = StyledNode::root(vec![StyledNode::text(content.clone())]);
            let result = export_markup(&tree, &StyleConfig::default());
            let escaped = content
                .replace('&', "&amp;")
                .replace('<', "&lt;")
                .replace('>', "&gt;");
            prop_assert_eq!(result.markup_body, format!("<text:p>{escaped}</text:p>"));
        }

        // Property: k identical styled runs share one definition
        #[test]
        fn prop_identical_runs_share_style(k in 1usize..12) {
            let runs = (0..k)
                .map(|i| StyledNode::element(
                    TagKind::Block,
                    vec![StyledNode::element(TagKind::Underline, vec![StyledNode::text(format!("r{i}"))])],
                ))
                .collect();
            let result = export_markup(&StyledNode::root(runs), &StyleConfig::default());
            prop_assert_eq!(result.style_definitions.matches("<style:style ").count(), 1);
            prop_assert_eq!(result.markup_body.matches("text:style-name=\"Style0\"").count(), k);
        }
    }
}
