//! Page scrapers for the watched news section.
//!
//! Scraping follows a two-phase pattern:
//!
//! 1. **Indexing**: list `(title, url)` pairs from the section page
//! 2. **Fetching**: download one article page and extract its paragraph text
//!
//! Both phases go through [`fetch_html`], which sends a browser-like user
//! agent and treats any non-2xx status as an error.

pub mod semafor;

use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

/// User agent sent with every page request; some sites reject the default.
pub const USER_AGENT: &str = "Mozilla/5.0";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Build the HTTP client used for section and article pages.
pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

/// GET a page and return its body, failing on non-2xx responses.
#[instrument(level = "debug", skip(client))]
pub async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let resp = client.get(url).send().await?.error_for_status()?;
    let body = resp.text().await?;
    debug!(bytes = body.len(), "Fetched page");
    Ok(body)
}

/// Collapse whitespace runs across an element's text nodes.
pub(crate) fn normalized_text<'a>(fragments: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for word in fragments.flat_map(str::split_whitespace) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
