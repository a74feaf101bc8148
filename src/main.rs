//! # Semafor Deal Alerts
//!
//! Watches a news section page (the Semafor business section by default),
//! classifies every new article with an OpenAI-compatible chat model, and
//! posts a Slack alert when the article mentions a merger, an acquisition,
//! or claims an exclusive scoop.
//!
//! ## Usage
//!
//! ```sh
//! OPENAI_API_KEY=sk-... SLACK_WEBHOOK_URL=https://hooks.slack.com/... semafor_deal_alerts
//! ```
//!
//! ## Architecture
//!
//! Each cycle is a linear pipeline:
//! 1. **Load**: read the seen-URL file
//! 2. **Index**: list `(title, url)` teasers from the section page
//! 3. **Fetch**: download each unseen article and extract its paragraphs
//! 4. **Classify**: ask the model for a one-token true/false verdict
//! 5. **Alert**: post matches to the Slack webhook
//! 6. **Persist**: rewrite the seen-URL file if anything was new
//!
//! Cycles run once at startup and then every `--interval-secs` until Ctrl-C
//! or SIGTERM.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod alert;
mod api;
mod classifier;
mod cli;
mod config;
mod models;
mod pipeline;
mod schedule;
mod scrapers;
mod store;
mod utils;

use cli::Cli;
use config::Config;
use pipeline::Scraper;
use schedule::{run_every, shutdown_signal};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    if let Err(e) = dotenvy::dotenv() {
        debug!(error = %e, "No .env file loaded");
    }

    let args = Cli::parse();
    let config = Config::from_cli(args)?;
    info!(
        section = %config.section_url,
        seen_urls_file = %config.seen_urls_file.display(),
        interval_secs = config.interval.as_secs(),
        policy = ?config.on_article_error,
        "semafor_deal_alerts starting up"
    );
    if config.openai.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; every article will classify as negative");
    }
    if config.slack_webhook_url.is_none() {
        warn!("SLACK_WEBHOOK_URL is not set; matches will not be posted");
    }

    let scraper = Scraper::from_config(&config)?;

    if config.once {
        let report = scraper.scrape().await?;
        info!(?report, "Cycle complete");
        return Ok(());
    }

    let scraper = &scraper;
    let runs = run_every(config.interval, shutdown_signal(), move || async move {
        let started = std::time::Instant::now();
        match scraper.scrape().await {
            Ok(report) => info!(
                listed = report.listed,
                new = report.new_urls.len(),
                alerts = report.alerts_sent,
                skipped = report.skipped,
                persisted = report.persisted,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Cycle complete"
            ),
            Err(e) => error!(error = %e, "Cycle failed"),
        }
    })
    .await;

    info!(runs, "Exiting");
    Ok(())
}
