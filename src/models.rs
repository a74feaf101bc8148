//! Data models shared across the pipeline.
//!
//! - [`Article`]: a `(title, url)` pair discovered on the section listing
//! - [`CycleReport`]: what a single scrape cycle did, for logging
//!
//! Neither type is persisted; the only durable state is the seen-URL file
//! managed by [`crate::store`].

use std::fmt;

/// An article teaser discovered on the section listing.
///
/// `url` is always absolute, resolved against the section page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Visible anchor text of the teaser heading.
    pub title: String,
    /// Absolute article URL.
    pub url: String,
}

impl Article {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }

    /// Slack message announcing a positive classification.
    pub fn alert_text(&self) -> String {
        format!("Semafor M&A Alert\n{}\n{}", self.title, self.url)
    }
}

impl fmt::Display for Article {
    /// Human-readable notice printed when a new article shows up.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}\n", self.title, self.url)
    }
}

/// Summary of one scrape cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Articles returned by the listing, after in-page dedup.
    pub listed: usize,
    /// URLs whose new-article notice was printed, in listing order.
    pub announced: Vec<String>,
    /// URLs not seen in any earlier cycle, in listing order.
    pub new_urls: Vec<String>,
    /// Alerts actually delivered to the webhook.
    pub alerts_sent: usize,
    /// Articles whose page could not be fetched and were left for next cycle.
    pub skipped: usize,
    /// Whether the seen-URL file was rewritten.
    pub persisted: bool,
}
