#![forbid(unsafe_code)]
//! Wikiman renders Wikipedia articles as roff manpages.
//!
//! The conversion is a fixed pipeline of stages, each consuming the previous
//! stage's output type:
//!
//! 1. [`filter_nodes`] drops navigation, images and the References section.
//! 2. [`rewrite_inline`] turns links and emphasis into inline escapes.
//! 3. [`rewrite_blocks`] renders paragraphs, headings, lists and tables.
//! 4. [`normalize`] collapses blank lines.
//! 5. [`assemble`] adds the `.TH`, NAME and DESCRIPTION framing.
//!
//! # Example
//!
//! ```no_run
//! let html = std::fs::read_to_string("Rust_(programming_language).html")?;
//! let options = wikiman::ManpageOptions::new("Rust_(programming_language)", 1);
//! let roff = wikiman::convert_html_to_roff(&html, &options)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod block;
mod cache;
mod config;
mod dom;
mod fetch;
mod filter;
mod inline;

use std::error::Error;
use std::fmt;
use std::io;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

pub use crate::block::{Body, rewrite_blocks};
pub use crate::cache::{cache_path, write_artifact};
pub use crate::config::{
    BUILTIN_SCHEMA, Config, validate_config_with_schema, validate_config_with_schema_str,
};
pub use crate::dom::{CONTENT_ROOT_ID, Element, Node, Page, parse_html, parse_page};
pub use crate::fetch::{article_slug, article_url, fetch_html};
pub use crate::filter::{FilteredTree, REFERENCES_ID, filter_nodes};
pub use crate::inline::{InlineTree, link_text, rewrite_inline};

/// Byline printed after the title in the NAME section.
pub const BYLINE: &str = "From Wikipedia, the free encyclopedia";

static NEWLINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n+").expect("newline pattern compiles"));

#[derive(Debug, Clone)]
pub struct ManpageOptions {
    /// Article name, used for the title when the page has none.
    pub article: String,
    pub section: u8,
}

impl ManpageOptions {
    pub fn new(article: impl Into<String>, section: u8) -> Self {
        Self {
            article: article.into(),
            section,
        }
    }
}

#[derive(Debug)]
pub enum WikimanError {
    MissingContentRoot,
    NotFound(String),
    Fetch(String),
    Config(String),
    Yaml(String),
    Schema(String),
    Io(io::Error),
}

impl fmt::Display for WikimanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WikimanError::MissingContentRoot => {
                write!(f, "page has no article content (#{CONTENT_ROOT_ID})")
            }
            WikimanError::NotFound(url) => write!(f, "article not found: {url}"),
            WikimanError::Fetch(msg) => write!(f, "fetch error: {msg}"),
            WikimanError::Config(msg) => write!(f, "config error: {msg}"),
            WikimanError::Yaml(msg) => write!(f, "yaml parse error: {msg}"),
            WikimanError::Schema(msg) => write!(f, "schema validation error: {msg}"),
            WikimanError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl Error for WikimanError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WikimanError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for WikimanError {
    fn from(err: io::Error) -> Self {
        WikimanError::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, WikimanError>;

/// Body text with every run of newlines collapsed to one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedBody(String);

impl NormalizedBody {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn normalize(body: Body) -> NormalizedBody {
    NormalizedBody(collapse_newlines(body.as_str()))
}

pub fn collapse_newlines(text: &str) -> String {
    NEWLINES_RE.replace_all(text, "\n").into_owned()
}

/// Display title from a page `<title>` such as `"Rust - Wikipedia"`.
pub fn display_title(page_title: &str) -> String {
    page_title
        .split('-')
        .next()
        .unwrap_or(page_title)
        .trim()
        .to_string()
}

pub fn assemble(title: &str, body: &NormalizedBody, section: u8) -> String {
    let mut out = format!(
        ".TH \"{}\" {section}\n.SH NAME\n{title} \\- {BYLINE}\n.SH DESCRIPTION\n",
        title.to_uppercase().replace('"', "\\(dq"),
    );
    out.push_str(body.as_str());
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Runs the whole pipeline over an already parsed page.
pub fn convert_page(page: Page, options: &ManpageOptions) -> String {
    let title = page
        .title
        .as_deref()
        .map(display_title)
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| options.article.replace('_', " "));
    debug!(%title, "converting page");

    let filtered = filter_nodes(page.content);
    let inlined = rewrite_inline(filtered);
    let body = normalize(rewrite_blocks(inlined));
    assemble(&title, &body, options.section)
}

pub fn convert_html_to_roff(html: &str, options: &ManpageOptions) -> Result<String> {
    let page = parse_page(html)?;
    Ok(convert_page(page, options))
}
