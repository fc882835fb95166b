//! Retrieval of article HTML from Wikipedia.

use std::time::Duration;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use tracing::info;

use crate::{Result, WikimanError};

/// Characters escaped in the `/wiki/<slug>` path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const USER_AGENT: &str = concat!("wikiman/", env!("CARGO_PKG_VERSION"));

const TIMEOUT: Duration = Duration::from_secs(30);

/// Article name as Wikipedia spells it in URLs: spaces become underscores.
pub fn article_slug(name: &str) -> String {
    name.trim().replace(' ', "_")
}

pub fn article_url(language: &str, slug: &str) -> String {
    format!(
        "https://{language}.wikipedia.org/wiki/{}",
        utf8_percent_encode(slug, PATH_SEGMENT)
    )
}

pub fn fetch_html(url: &str) -> Result<String> {
    info!(url, "fetching article");
    let agent = ureq::AgentBuilder::new()
        .user_agent(USER_AGENT)
        .timeout(TIMEOUT)
        .build();
    match agent.get(url).call() {
        Ok(response) => Ok(response.into_string()?),
        Err(ureq::Error::Status(404, _)) => Err(WikimanError::NotFound(url.to_string())),
        Err(ureq::Error::Status(code, _)) => {
            Err(WikimanError::Fetch(format!("{url}: HTTP status {code}")))
        }
        Err(err) => Err(WikimanError::Fetch(err.to_string())),
    }
}
