//! Links, emphasis and code containers flattened into troff inline text.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::dom::{Element, Node};
use crate::filter::FilteredTree;

static CITATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.+\]").expect("citation pattern compiles"));

/// The filtered tree with every inline rule applied.
///
/// Links, `<b>`, `<i>` and code containers are text nodes from here on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineTree(pub(crate) Element);

impl InlineTree {
    pub fn root(&self) -> &Element {
        &self.0
    }
}

pub fn rewrite_inline(tree: FilteredTree) -> InlineTree {
    let root = rewrite_children(tree.0);
    debug!(children = root.children.len(), "rewrote inline markup");
    InlineTree(root)
}

/// Text a hyperlink leaves behind: its flattened text, or nothing for a
/// citation marker such as `[3]`.
pub fn link_text(link: &Element) -> String {
    let text = link.text();
    if CITATION_RE.is_match(&text) {
        String::new()
    } else {
        text
    }
}

fn rewrite_children(mut element: Element) -> Element {
    element.children = element
        .children
        .into_iter()
        .filter_map(rewrite_node)
        .collect();
    element
}

/// Rewrites one node; `None` means it leaves nothing behind.
fn rewrite_node(node: Node) -> Option<Node> {
    let element = match node {
        Node::Element(element) => element,
        text => return Some(text),
    };
    let rewritten = match element.name.as_str() {
        "a" => {
            let text = link_text(&element);
            if text.is_empty() {
                return None;
            }
            Node::Text(text)
        }
        "b" => Node::Text(emphasis(rewrite_children(element), 'B')),
        "i" => Node::Text(emphasis(rewrite_children(element), 'I')),
        "div" if element.has_class("mw-code") => {
            Node::Text(code_block(&rewrite_children(element)))
        }
        // LaTeX equations have no groff rendering; leave them alone.
        "img" if element.has_class("tex") => Node::Element(element),
        _ => Node::Element(rewrite_children(element)),
    };
    Some(rewritten)
}

fn emphasis(element: Element, font: char) -> String {
    format!("\\f{font}{}\\fR", element.text())
}

fn code_block(container: &Element) -> String {
    format!(
        ".PP\n.nf\n.RF\n{}\n.RE\n.fi\n.PP\n",
        container.text().trim()
    )
}
