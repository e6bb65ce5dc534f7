// SPDX-License-Identifier: AGPL-3.0-or-later
//! Styled document tree
//!
//! The tree mirrors the markup a content-editable surface produces. Tag names
//! are collapsed into a closed set of kinds; everything the exporters need to
//! know about an element is its kind plus its attributes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use unicode_segmentation::UnicodeSegmentation;

use crate::markup::parse_markup;

/// Semantic kind of an element, derived from its tag name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    /// Paragraph-like element that gets its own paragraph in the output
    Block,
    /// Hard line break; never has children
    LineBreak,
    Bold,
    Italic,
    Underline,
    /// `<font>`, carries presentational color and size attributes
    Font,
    /// Generic inline element (span, link, ...)
    Inline,
    /// Anything not recognised. Contributes only its children.
    Other,
}

impl TagKind {
    /// Map an HTML tag name to its kind (case-insensitive)
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "blockquote" | "pre"
            | "address" | "section" | "article" | "header" | "footer" => Self::Block,
            "br" => Self::LineBreak,
            "b" | "strong" => Self::Bold,
            "i" | "em" => Self::Italic,
            "u" | "ins" => Self::Underline,
            "font" => Self::Font,
            "span" | "a" | "small" | "sub" | "sup" | "mark" | "code" | "s" | "strike" => {
                Self::Inline
            }
            _ => Self::Other,
        }
    }

    pub const fn is_block(&self) -> bool {
        matches!(self, Self::Block)
    }
}

/// A node of the styled document tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StyledNode {
    Text {
        content: String,
    },
    Element {
        tag: TagKind,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        attributes: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<StyledNode>,
    },
}

impl StyledNode {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    pub fn element(tag: TagKind, children: Vec<StyledNode>) -> Self {
        Self::Element {
            tag,
            attributes: BTreeMap::new(),
            children,
        }
    }

    /// Root container holding a note's top-level nodes
    pub fn root(children: Vec<StyledNode>) -> Self {
        Self::element(TagKind::Other, children)
    }

    /// Builder-style attribute setter; a no-op on text nodes
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Element { attributes, .. } = &mut self {
            attributes.insert(name.into(), value.into());
        }
        self
    }

    pub fn children(&self) -> &[StyledNode] {
        match self {
            Self::Text { .. } => &[],
            Self::Element { children, .. } => children,
        }
    }

    /// Whether any text node in this subtree has non-empty content
    pub fn has_text(&self) -> bool {
        match self {
            Self::Text { content } => !content.is_empty(),
            Self::Element { children, .. } => children.iter().any(StyledNode::has_text),
        }
    }

    /// Count words in this subtree
    pub fn word_count(&self) -> usize {
        match self {
            Self::Text { content } => content.unicode_words().count(),
            Self::Element { children, .. } => children.iter().map(|c| c.word_count()).sum(),
        }
    }

    /// Count user-perceived characters in this subtree
    pub fn char_count(&self) -> usize {
        match self {
            Self::Text { content } => content.graphemes(true).count(),
            Self::Element { children, .. } => children.iter().map(|c| c.char_count()).sum(),
        }
    }
}

/// A note: the raw editor markup plus its parsed tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Editor markup exactly as saved (`.on` payload)
    pub markup: String,
    pub root: StyledNode,
}

impl Document {
    /// Parse editor markup into a document
    pub fn from_markup(markup: impl Into<String>) -> Self {
        let markup = markup.into();
        let root = parse_markup(&markup);
        Self { markup, root }
    }

    /// An empty note
    pub fn empty() -> Self {
        Self {
            markup: String::new(),
            root: StyledNode::root(Vec::new()),
        }
    }

    pub fn word_count(&self) -> usize {
        self.root.word_count()
    }

    pub fn char_count(&self) -> usize {
        self.root.char_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_kind_mapping() {
        assert_eq!(TagKind::from_name("DIV"), TagKind::Block);
        assert_eq!(TagKind::from_name("h3"), TagKind::Block);
        assert_eq!(TagKind::from_name("br"), TagKind::LineBreak);
        assert_eq!(TagKind::from_name("strong"), TagKind::Bold);
        assert_eq!(TagKind::from_name("em"), TagKind::Italic);
        assert_eq!(TagKind::from_name("u"), TagKind::Underline);
        assert_eq!(TagKind::from_name("font"), TagKind::Font);
        assert_eq!(TagKind::from_name("span"), TagKind::Inline);
    }

    #[test]
    fn test_unknown_tag_is_other() {
        assert_eq!(TagKind::from_name("marquee"), TagKind::Other);
        assert_eq!(TagKind::from_name(""), TagKind::Other);
    }

    #[test]
    fn test_has_text_ignores_empty_nodes() {
        let tree = StyledNode::root(vec![
            StyledNode::element(TagKind::Block, vec![StyledNode::text("")]),
            StyledNode::element(TagKind::LineBreak, Vec::new()),
        ]);
        assert!(!tree.has_text());

        let tree = StyledNode::root(vec![StyledNode::element(
            TagKind::Bold,
            vec![StyledNode::text("x")],
        )]);
        assert!(tree.has_text());
    }

    #[test]
    fn test_word_and_char_count() {
        let doc = Document::from_markup("<div>Hello <b>world</b></div><div>again</div>");
        assert_eq!(doc.word_count(), 3);
        assert_eq!(doc.char_count(), "Hello worldagain".len());
    }

    #[test]
    fn test_with_attribute_on_text_is_noop() {
        let node = StyledNode::text("a").with_attribute("style", "color: red");
        assert_eq!(node, StyledNode::text("a"));
    }

    #[test]
    fn test_tree_serde_shape() {
        let node = StyledNode::element(TagKind::Bold, vec![StyledNode::text("Hi")]);
        let json = serde_json::to_string(&node).expect("serialize");
        assert_eq!(
            json,
            r#"{"type":"element","tag":"bold","children":[{"type":"text","content":"Hi"}]}"#
        );
        let back: StyledNode = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, node);
    }
}
