//! Command-line interface definitions.
//!
//! Every option has a default matching the stock behavior, so running the
//! binary with only `OPENAI_API_KEY` and `SLACK_WEBHOOK_URL` in the
//! environment watches the Semafor business section once a minute.

use clap::Parser;
use std::path::PathBuf;

use crate::api::{DEFAULT_MODEL, OPENAI_BASE_URL};
use crate::pipeline::ArticleErrorPolicy;
use crate::scrapers::semafor::BUSINESS_URL;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Watch forever with secrets from the environment (or .env)
/// semafor_deal_alerts
///
/// # One cycle against a local model server, keeping state elsewhere
/// semafor_deal_alerts --once --openai-base-url http://localhost:8080/v1 \
///     --seen-urls-file /var/lib/deal-alerts/seen_urls.txt
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// API key for the chat-completion endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Slack incoming-webhook URL; alerts are skipped when unset
    #[arg(long, env = "SLACK_WEBHOOK_URL", hide_env_values = true)]
    pub slack_webhook_url: Option<String>,

    /// Section page to watch
    #[arg(long, default_value = BUSINESS_URL)]
    pub section_url: String,

    /// File holding already-processed article URLs
    #[arg(long, default_value = "seen_urls.txt")]
    pub seen_urls_file: PathBuf,

    /// Seconds between scrape cycles
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_secs: u64,

    /// Root of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = OPENAI_BASE_URL)]
    pub openai_base_url: String,

    /// Chat model used for classification
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Timeout in seconds for page fetches and classification calls
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub http_timeout_secs: u64,

    /// What a cycle does when one article page cannot be fetched
    #[arg(long, value_enum, default_value_t = ArticleErrorPolicy::Abort)]
    pub on_article_error: ArticleErrorPolicy,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,
}
