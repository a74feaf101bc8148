//! Semafor section and article scraper.
//!
//! The section page lists teasers as `h2`/`h3` headings wrapping a link.
//! Article pages keep their body inside an `<article>` element; when that is
//! missing the whole page is searched for paragraphs.

use super::{FetchError, fetch_html, normalized_text};
use crate::models::Article;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

/// Business section watched when no `--section-url` is given.
pub const BUSINESS_URL: &str = "https://www.semafor.com/section/business";

static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h2, h3").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static ARTICLE: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Index the section page.
///
/// # Errors
///
/// Fails if the page cannot be fetched or answers with a non-2xx status.
#[instrument(level = "info", skip_all, fields(section = %section_url))]
pub async fn index_articles(
    client: &reqwest::Client,
    section_url: &Url,
) -> Result<Vec<Article>, FetchError> {
    let html = fetch_html(client, section_url.as_str()).await?;
    let articles = parse_listing(&html, section_url);
    info!(count = articles.len(), "Indexed section articles");
    Ok(articles)
}

/// Fetch one article page and return its paragraph text.
///
/// Returns an empty string when the page has no paragraphs.
#[instrument(level = "info", skip(client))]
pub async fn fetch_article_text(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let html = fetch_html(client, url).await?;
    let text = parse_article_text(&html);
    info!(bytes = text.len(), "Parsed article text");
    Ok(text)
}

/// Extract `(title, url)` pairs from the section HTML, in document order.
///
/// Only the first linked anchor of each heading counts. Anchors with an
/// empty `href` or no visible text are ignored; URLs repeat across teasers,
/// so the first occurrence wins.
pub fn parse_listing(html: &str, base: &Url) -> Vec<Article> {
    let document = Html::parse_document(html);

    document
        .select(&HEADING)
        .filter_map(|heading| heading.select(&LINK).next())
        .filter_map(|link| {
            let href = link.value().attr("href")?.trim();
            let title = normalized_text(link.text());
            if href.is_empty() || title.is_empty() {
                return None;
            }
            match base.join(href) {
                Ok(resolved) => Some(Article::new(title, resolved.to_string())),
                Err(e) => {
                    debug!(%href, error = %e, "Skipping unresolvable link");
                    None
                }
            }
        })
        .unique_by(|article| article.url.clone())
        .collect()
}

/// Join the text of every paragraph under the article container.
pub fn parse_article_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let container: ElementRef<'_> = document
        .select(&ARTICLE)
        .next()
        .unwrap_or_else(|| document.root_element());

    container
        .select(&PARAGRAPH)
        .map(|p| normalized_text(p.text()))
        .join("\n")
}
