// SPDX-License-Identifier: AGPL-3.0-or-later
//! Editor markup parser using html5ever
//!
//! Notes are saved as the HTML fragment the editing surface produced. The
//! fragment is run through a full HTML5 parser so that whatever the browser
//! (or a hand-edited `.on` file) emitted gets the same error recovery a
//! browser would apply, then the `<body>` subtree is converted into
//! [`StyledNode`]s.

use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use tracing::debug;

use crate::tree::{StyledNode, TagKind};

/// Parse an editor markup fragment. Never fails.
pub fn parse_markup(input: &str) -> StyledNode {
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(input);

    let children = find_body(&dom.document)
        .map(|body| convert_children(&body))
        .unwrap_or_default();

    debug!(
        input_len = input.len(),
        top_level_nodes = children.len(),
        "parsed editor markup"
    );

    StyledNode::root(children)
}

fn find_body(handle: &Handle) -> Option<Handle> {
    for child in handle.children.borrow().iter() {
        if let NodeData::Element { name, .. } = &child.data {
            if &*name.local == "body" {
                return Some(child.clone());
            }
        }
        if let Some(body) = find_body(child) {
            return Some(body);
        }
    }
    None
}

fn convert_children(handle: &Handle) -> Vec<StyledNode> {
    handle
        .children
        .borrow()
        .iter()
        .filter_map(convert_node)
        .collect()
}

fn convert_node(handle: &Handle) -> Option<StyledNode> {
    match &handle.data {
        NodeData::Text { contents } => Some(StyledNode::text(contents.borrow().to_string())),

        NodeData::Element { name, attrs, .. } => {
            let attributes = attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect();

            Some(StyledNode::Element {
                tag: TagKind::from_name(&name.local),
                attributes,
                children: convert_children(handle),
            })
        }

        // Comments, doctypes and processing instructions carry no content
        _ => None,
    }
}
