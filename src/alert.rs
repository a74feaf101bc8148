//! Slack incoming-webhook alerts.
//!
//! Delivery is best-effort: [`SlackAlerter::deliver`] reports what happened,
//! [`SlackAlerter::send_alert`] logs any failure and moves on. Nothing is
//! retried.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::utils::truncate_for_log;

/// Webhook posts give up after this long.
pub const ALERT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("webhook error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Outcome of a successful [`SlackAlerter::deliver`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// No webhook configured; nothing was sent.
    Skipped,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

#[derive(Debug, Clone)]
pub struct SlackAlerter {
    webhook: Option<Url>,
    client: reqwest::Client,
}

impl SlackAlerter {
    /// Create an alerter posting to `webhook`.
    ///
    /// # Arguments
    ///
    /// * `webhook` - Incoming-webhook URL; `None` turns every alert into a no-op
    ///
    /// # Returns
    ///
    /// The alerter, or the `reqwest` error if the HTTP client cannot be built.
    /// Posts time out after five seconds.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let alerter = SlackAlerter::new(config.slack_webhook_url.clone())?;
    /// alerter.send_alert(&article.alert_text()).await;
    /// ```
    pub fn new(webhook: Option<Url>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            webhook,
            client: reqwest::Client::builder().timeout(ALERT_TIMEOUT).build()?,
        })
    }

    /// Post `text` to the webhook as `{"text": ...}`.
    pub async fn deliver(&self, text: &str) -> Result<Delivery, AlertError> {
        let Some(webhook) = &self.webhook else {
            return Ok(Delivery::Skipped);
        };

        let res = self
            .client
            .post(webhook.clone())
            .json(&WebhookPayload { text })
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AlertError::Status {
                status,
                body: truncate_for_log(&body, 200),
            });
        }

        Ok(Delivery::Sent)
    }

    /// Deliver `text`, swallowing any failure.
    ///
    /// Returns `true` only when the webhook accepted the message.
    #[instrument(level = "info", skip_all)]
    pub async fn send_alert(&self, text: &str) -> bool {
        match self.deliver(text).await {
            Ok(Delivery::Sent) => {
                info!("Alert sent to Slack");
                true
            }
            Ok(Delivery::Skipped) => {
                debug!("No Slack webhook configured; alert not sent");
                false
            }
            Err(e) => {
                warn!(error = %e, "Slack alert failed; dropping it");
                false
            }
        }
    }
}
