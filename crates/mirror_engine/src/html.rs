//! scraper DOM to [`DocumentNode`] trees.

use ego_tree::NodeRef;
use mirror_core::DocumentNode;
use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Parse an HTML fragment (an article `content` field) into a body container
/// whose children are the fragment's top-level nodes.
pub fn parse_fragment(html: &str) -> DocumentNode {
    let fragment = Html::parse_fragment(html);
    element_to_node(fragment.root_element())
}

/// Convert an element and its subtree.
pub fn element_to_node(element: ElementRef) -> DocumentNode {
    let value = element.value();
    let mut node = DocumentNode::element(value.name(), value.attrs());

    for child in element.children() {
        if let Some(converted) = convert_child(child) {
            node.push_child(converted);
        }
    }

    if node.is_element("noscript") {
        inflate_raw_noscript(&mut node);
    }
    node
}

fn convert_child(child: NodeRef<'_, Node>) -> Option<DocumentNode> {
    match child.value() {
        Node::Text(text) => Some(DocumentNode::text(&**text)),
        Node::Element(_) => ElementRef::wrap(child).map(element_to_node),
        _ => None,
    }
}

/// With scripting enabled the parser keeps `<noscript>` content as raw text.
/// Re-parse it so the lazy-load fallback `<img>` becomes a real element.
fn inflate_raw_noscript(node: &mut DocumentNode) {
    let raw = node.text_content();
    if node.children.iter().all(|c| c.tag == mirror_core::Tag::Text) && raw.contains('<') {
        node.children = parse_fragment(&raw).children;
    }
}
