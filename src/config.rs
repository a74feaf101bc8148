//! Validated runtime configuration.
//!
//! [`Config::from_cli`] runs once at startup. Everything downstream takes a
//! `Config` (or pieces of it) instead of reading the environment.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::cli::Cli;
use crate::pipeline::ArticleErrorPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name} {value:?}: {source}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        source: url::ParseError,
    },
    #[error("{name} must use http or https, got {value:?}")]
    UnsupportedScheme { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: Url,
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub section_url: Url,
    pub seen_urls_file: PathBuf,
    pub interval: Duration,
    pub http_timeout: Duration,
    pub openai: OpenAiConfig,
    pub slack_webhook_url: Option<Url>,
    pub on_article_error: ArticleErrorPolicy,
    pub once: bool,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let slack_webhook_url = non_empty(cli.slack_webhook_url)
            .map(|v| parse_http_url("slack webhook URL", &v))
            .transpose()?;

        Ok(Self {
            section_url: parse_http_url("section URL", &cli.section_url)?,
            seen_urls_file: cli.seen_urls_file,
            interval: Duration::from_secs(cli.interval_secs),
            http_timeout: Duration::from_secs(cli.http_timeout_secs),
            openai: OpenAiConfig {
                base_url: parse_http_url("OpenAI base URL", &cli.openai_base_url)?,
                api_key: non_empty(cli.openai_api_key),
                model: cli.model,
            },
            slack_webhook_url,
            on_article_error: cli.on_article_error,
            once: cli.once,
        })
    }
}

/// An exported-but-empty variable counts as unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_http_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::UnsupportedScheme {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["semafor_deal_alerts"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_from_cli_parses_urls_and_durations() {
        let config = Config::from_cli(cli(&[
            "--section-url",
            "https://example.com/section",
            "--slack-webhook-url",
            "https://hooks.example.com/T/B/X",
            "--openai-api-key",
            "sk-test",
            "--interval-secs",
            "90",
        ]))
        .unwrap();

        assert_eq!(config.section_url.as_str(), "https://example.com/section");
        assert_eq!(
            config.slack_webhook_url.as_ref().map(Url::as_str),
            Some("https://hooks.example.com/T/B/X")
        );
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.interval, Duration::from_secs(90));
    }

    #[test]
    fn test_blank_secrets_are_unset() {
        let config = Config::from_cli(cli(&[
            "--slack-webhook-url",
            "  ",
            "--openai-api-key",
            "",
        ]))
        .unwrap();
        assert!(config.slack_webhook_url.is_none());
        assert!(config.openai.api_key.is_none());
    }

    #[test]
    fn test_rejects_malformed_section_url() {
        let err = Config::from_cli(cli(&["--section-url", "not a url"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { name: "section URL", .. }));
    }

    #[test]
    fn test_rejects_non_http_webhook() {
        let err = Config::from_cli(cli(&["--slack-webhook-url", "ftp://example.com/hook"]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedScheme { .. }));
    }
}
