//! One scrape cycle: list → dedup → fetch → classify → alert → persist.
//!
//! The cycle is strictly sequential. Listing and seen-set I/O failures abort
//! it; per-article fetch failures follow [`ArticleErrorPolicy`];
//! classification and alert failures never escape their modules.

use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::alert::SlackAlerter;
use crate::api::{AskAsync, ChatCompletionClient};
use crate::classifier::{self, Classifier};
use crate::config::Config;
use crate::models::{Article, CycleReport};
use crate::scrapers::semafor::{fetch_article_text, index_articles};
use crate::scrapers::{FetchError, http_client};
use crate::store::{SeenUrlStore, StoreError};

/// What to do when one article page cannot be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ArticleErrorPolicy {
    /// Abandon the cycle without persisting anything.
    #[default]
    Abort,
    /// Leave that article for the next cycle and carry on.
    ///
    /// The new-article notice is held back until the page has been fetched,
    /// so a retried article is announced once.
    Skip,
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to list section articles: {0}")]
    Listing(#[source] FetchError),
    #[error("failed to fetch article {url}: {source}")]
    Article { url: String, source: FetchError },
}

/// Runs scrape cycles against one section page.
#[derive(Debug)]
pub struct Scraper<A> {
    section_url: Url,
    store: SeenUrlStore,
    http: reqwest::Client,
    classifier: Classifier<A>,
    alerter: SlackAlerter,
    on_article_error: ArticleErrorPolicy,
}

impl Scraper<ChatCompletionClient> {
    /// Wire up the production collaborators.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let ask = ChatCompletionClient::new(
            &config.openai.base_url,
            config.openai.api_key.clone(),
            config.openai.model.clone(),
            classifier::prompt(),
            config.http_timeout,
        )?;

        Ok(Scraper::new(
            config.section_url.clone(),
            SeenUrlStore::new(config.seen_urls_file.clone()),
            http_client(config.http_timeout)?,
            Classifier::new(ask),
            SlackAlerter::new(config.slack_webhook_url.clone())?,
        )
        .with_article_error_policy(config.on_article_error))
    }
}

impl<A> Scraper<A>
where
    A: AskAsync<Response = String>,
{
    pub fn new(
        section_url: Url,
        store: SeenUrlStore,
        http: reqwest::Client,
        classifier: Classifier<A>,
        alerter: SlackAlerter,
    ) -> Self {
        Self {
            section_url,
            store,
            http,
            classifier,
            alerter,
            on_article_error: ArticleErrorPolicy::default(),
        }
    }

    pub fn with_article_error_policy(mut self, policy: ArticleErrorPolicy) -> Self {
        self.on_article_error = policy;
        self
    }

    /// Run one cycle.
    ///
    /// The seen-URL file is rewritten only if at least one new article was
    /// processed, so an idle cycle leaves it untouched.
    ///
    /// # Errors
    ///
    /// Listing failures, seen-set I/O failures and (under
    /// [`ArticleErrorPolicy::Abort`]) article fetch failures. In every error
    /// case nothing from this cycle is persisted.
    #[instrument(level = "info", skip_all, fields(section = %self.section_url))]
    pub async fn scrape(&self) -> Result<CycleReport, ScrapeError> {
        let mut seen = self.store.load().await?;
        let articles = index_articles(&self.http, &self.section_url)
            .await
            .map_err(ScrapeError::Listing)?;

        let mut report = CycleReport {
            listed: articles.len(),
            ..CycleReport::default()
        };

        for article in &articles {
            if seen.contains(&article.url) {
                debug!(url = %article.url, "Already seen");
                continue;
            }
            seen.insert(&article.url);
            let announce_early = self.on_article_error == ArticleErrorPolicy::Abort;
            if announce_early {
                announce(article, &mut report);
            }

            let text = match fetch_article_text(&self.http, &article.url).await {
                Ok(text) => text,
                Err(source) => match self.on_article_error {
                    ArticleErrorPolicy::Abort => {
                        return Err(ScrapeError::Article {
                            url: article.url.clone(),
                            source,
                        });
                    }
                    ArticleErrorPolicy::Skip => {
                        warn!(url = %article.url, error = %source, "Article fetch failed; retrying next cycle");
                        seen.remove(&article.url);
                        report.skipped += 1;
                        continue;
                    }
                },
            };
            if !announce_early {
                announce(article, &mut report);
            }
            report.new_urls.push(article.url.clone());

            if self.classifier.contains_ma_or_scoop(&text).await {
                info!(title = %article.title, url = %article.url, "Article matched M&A/scoop");
                if self.alerter.send_alert(&article.alert_text()).await {
                    report.alerts_sent += 1;
                }
            }
        }

        if !report.new_urls.is_empty() {
            self.store.save(&seen).await?;
            report.persisted = true;
        }

        Ok(report)
    }
}

/// Print the new-article notice and note it in the report.
fn announce(article: &Article, report: &mut CycleReport) {
    println!("{article}");
    info!(title = %article.title, url = %article.url, "New article");
    report.announced.push(article.url.clone());
}
