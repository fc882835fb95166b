//! Block-level rendering: paragraphs, section headings, lists and tables.
//!
//! Rendering is a single bottom-up walk over the inline-rewritten tree. Each
//! element yields its troff text, built from the text its children already
//! produced, so nothing is ever rendered twice.

use tracing::debug;

use crate::dom::{Element, Node};
use crate::inline::InlineTree;

/// Flattened troff body text, before blank-line collapsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body(pub(crate) String);

impl Body {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn rewrite_blocks(tree: InlineTree) -> Body {
    let body = render_children(&tree.0);
    debug!(bytes = body.len(), "rendered block structure");
    Body(body)
}

fn render_children(element: &Element) -> String {
    let mut out = String::new();
    for child in &element.children {
        render_node(child, &mut out);
    }
    out
}

fn render_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(text),
        Node::Element(element) => match element.name.as_str() {
            "p" => paragraph(element, out),
            "h2" => heading(element, out),
            "dl" => out.push_str(&description_list(element)),
            "ul" => out.push_str(&unordered_list(element)),
            "table" => out.push_str(&table(element)),
            _ => out.push_str(&render_children(element)),
        },
    }
}

fn paragraph(element: &Element, out: &mut String) {
    // Removed edit links and thumbnails leave empty husks behind.
    if element.children.is_empty() {
        return;
    }
    out.push_str(".PP\n");
    out.push_str(render_children(element).trim());
    out.push_str("\n.PP\n");
}

fn heading(element: &Element, out: &mut String) {
    let label = heading_label(element);
    let text = label.trim();
    if text.is_empty() {
        return;
    }
    out.push_str(".SH ");
    out.push_str(&upper_preserving_escapes(text));
    out.push('\n');
}

/// The headline text of an `<h2>`. When the heading opens with an element,
/// such as the `mw-headline` span, the label is everything inside it and the
/// span's siblings are skipped. A heading that opens with text is its own
/// label.
fn heading_label(element: &Element) -> String {
    match element.children.iter().find(|child| !child.is_blank()) {
        Some(Node::Element(headline)) => render_children(headline),
        Some(Node::Text(_)) => render_children(element),
        None => String::new(),
    }
}

/// Uppercases `text` without touching the font name after a `\f` escape.
fn upper_preserving_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' && chars.peek() == Some(&'f') {
            out.push(ch);
            out.extend(chars.next());
            out.extend(chars.next());
        } else {
            out.extend(ch.to_uppercase());
        }
    }
    out
}

fn description_list(element: &Element) -> String {
    let mut text = String::new();
    for child in element.children.iter().filter_map(Node::as_element) {
        if child.is("dt") {
            text.push_str(".TP\n");
            text.push_str(&render_children(child));
            text.push('\n');
        } else if child.is("dd") {
            text.push_str(&render_children(child));
            text.push('\n');
        }
    }
    text.trim().to_string()
}

fn unordered_list(element: &Element) -> String {
    let mut text = String::new();
    for item in element
        .children
        .iter()
        .filter_map(Node::as_element)
        .filter(|child| child.is("li"))
    {
        text.push('\t');
        text.push_str(&render_children(item));
        text.push('\n');
    }
    text
}

/// Renders a table as a boxed `tbl` block.
///
/// The column count comes from the first row with any content and is never
/// revisited, so later rows with a different cell count come out ragged.
fn table(element: &Element) -> String {
    let mut rows = Vec::new();
    collect_rows(element, &mut rows);

    let mut text = String::from(".TS\nallbox;\n");
    let mut columns = None;
    for row in rows {
        if columns.is_none() && !row.children.is_empty() {
            let count = column_count(row);
            text.push_str(&"l ".repeat(count));
            text.push_str(".\n");
            columns = Some(count);
        }
        let cells = cells(row)
            .map(|cell| render_children(cell).trim().to_string())
            .collect::<Vec<_>>();
        text.push_str(cells.join("\t").trim());
        text.push('\n');
    }
    text.push_str(".TE\n");
    text
}

/// Rows of this table in document order, through `thead`/`tbody`/`tfoot`,
/// excluding rows of nested tables.
fn collect_rows<'a>(element: &'a Element, rows: &mut Vec<&'a Element>) {
    for child in element.children.iter().filter_map(Node::as_element) {
        if child.is("tr") {
            rows.push(child);
        } else if !child.is("table") {
            collect_rows(child, rows);
        }
    }
}

fn cells(row: &Element) -> impl Iterator<Item = &Element> {
    row.children
        .iter()
        .filter_map(Node::as_element)
        .filter(|child| child.is("td") || child.is("th"))
}

fn column_count(row: &Element) -> usize {
    let cells = cells(row).collect::<Vec<_>>();
    match cells.first().and_then(|cell| cell.attr("colspan")) {
        Some(span) => leading_integer(span),
        None => cells.len(),
    }
}

/// Leading decimal digits of `value`, or zero when there are none.
fn leading_integer(value: &str) -> usize {
    let digits = value
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>();
    digits.parse().unwrap_or(0)
}
