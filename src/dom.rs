//! Owned document tree built from html5ever's reference-counted DOM.
//!
//! The rewrite stages never see `markup5ever_rcdom` handles. Parsing copies
//! the elements and text we care about into plain values, so every later
//! stage can take the tree by value and hand back a new one.

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::{Result, WikimanError};

/// `id` of the element holding the article body.
pub const CONTENT_ROOT_ID: &str = "mw-content-text";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// A parsed article page: its `<title>` and its content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: Option<String>,
    pub content: Element,
}

impl Node {
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    /// True for text nodes made only of whitespace.
    pub fn is_blank(&self) -> bool {
        matches!(self, Node::Text(text) if text.trim().is_empty())
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|name| name == class))
    }

    /// Concatenated text of every descendant text node.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }

    /// First element in document order, this one included, matching `pred`.
    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        if pred(self) {
            return Some(self);
        }
        self.children
            .iter()
            .filter_map(Node::as_element)
            .find_map(|child| child.find(pred))
    }

    fn into_found(self, pred: &dyn Fn(&Element) -> bool) -> Option<Element> {
        if pred(&self) {
            return Some(self);
        }
        self.children.into_iter().find_map(|child| match child {
            Node::Element(element) => element.into_found(pred),
            Node::Text(_) => None,
        })
    }
}

pub fn parse_html(html: &str) -> Element {
    let parse_options = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let dom = parse_document(RcDom::default(), parse_options).one(html);
    let mut document = Element::new("#document");
    document.children = convert_children(&dom.document);
    document
}

/// Parses `html` and splits out the page title and content root.
///
/// A page without a content root is rejected; everything else about the
/// markup is accepted as-is.
pub fn parse_page(html: &str) -> Result<Page> {
    let document = parse_html(html);
    let title = document
        .find(&|element| element.is("title"))
        .map(Element::text);
    let content = document
        .into_found(&is_content_root)
        .ok_or(WikimanError::MissingContentRoot)?;
    Ok(Page { title, content })
}

fn is_content_root(element: &Element) -> bool {
    element.is("div") && element.id() == Some(CONTENT_ROOT_ID)
}

fn convert_children(handle: &Handle) -> Vec<Node> {
    handle
        .children
        .borrow()
        .iter()
        .filter_map(convert_node)
        .collect()
}

fn convert_node(handle: &Handle) -> Option<Node> {
    match handle.data {
        NodeData::Text { ref contents } => Some(Node::Text(contents.borrow().to_string())),
        NodeData::Element {
            ref name,
            ref attrs,
            ..
        } => {
            let attrs = attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect();
            Some(Node::Element(Element {
                name: name.local.to_string(),
                attrs,
                children: convert_children(handle),
            }))
        }
        NodeData::Document
        | NodeData::Doctype { .. }
        | NodeData::Comment { .. }
        | NodeData::ProcessingInstruction { .. } => None,
    }
}
