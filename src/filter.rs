//! Removal of web-only subtrees from the content root.

use tracing::debug;

use crate::dom::{Element, Node};

/// Subtrees dropped outright, as `(tag, class)` pairs, in removal order.
const REMOVED_BLOCKS: &[(&str, &str)] = &[
    ("div", "toc"),
    ("div", "thumb"),
    ("table", "metadata"),
    ("table", "vertical-navbox"),
    ("span", "mw-editsection"),
];

/// Elements whose text would leak stylesheet or script source into the page.
const REMOVED_TAGS: &[&str] = &["style", "script"];

/// `id` of the marker inside the References heading.
pub const REFERENCES_ID: &str = "References";

/// The content root with navigation, images and trailing references gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredTree(pub(crate) Element);

impl FilteredTree {
    pub fn root(&self) -> &Element {
        &self.0
    }
}

pub fn filter_nodes(mut content: Element) -> FilteredTree {
    for (tag, class) in REMOVED_BLOCKS {
        let removed = remove_matching(&mut content, &|element| {
            element.is(tag) && element.has_class(class)
        });
        if removed > 0 {
            debug!(tag, class, removed, "removed subtrees");
        }
    }
    remove_matching(&mut content, &|element| {
        REMOVED_TAGS.contains(&element.name.as_str())
    });
    if !remove_references(&mut content) {
        debug!("no references section found");
    }
    FilteredTree(content)
}

fn remove_matching(element: &mut Element, pred: &dyn Fn(&Element) -> bool) -> usize {
    let before = element.children.len();
    element
        .children
        .retain(|child| !child.as_element().is_some_and(pred));
    let mut removed = before - element.children.len();
    for child in element.children.iter_mut().filter_map(Node::as_element_mut) {
        removed += remove_matching(child, pred);
    }
    removed
}

/// Cuts everything from the References heading to the end of its parent.
///
/// The heading container is the marker's parent. A marker sitting directly
/// under the content root stands in for its own container, so the root
/// itself is never removed.
fn remove_references(content: &mut Element) -> bool {
    let mut path = Vec::new();
    if !find_path(content, &|element| element.id() == Some(REFERENCES_ID), &mut path) {
        return false;
    }
    if path.len() > 1 {
        path.pop();
    }
    let Some((&cut, parents)) = path.split_last() else {
        return false;
    };
    let mut parent = content;
    for &index in parents {
        parent = match parent.children.get_mut(index) {
            Some(Node::Element(element)) => element,
            _ => return false,
        };
    }
    let removed = parent.children.len() - cut;
    parent.children.truncate(cut);
    debug!(removed, "removed references section");
    true
}

/// Child indices leading from `element` to the first descendant matching
/// `pred` in document order.
fn find_path(element: &Element, pred: &dyn Fn(&Element) -> bool, path: &mut Vec<usize>) -> bool {
    for (index, child) in element.children.iter().enumerate() {
        if let Node::Element(child) = child {
            path.push(index);
            if pred(child) || find_path(child, pred, path) {
                return true;
            }
            path.pop();
        }
    }
    false
}
