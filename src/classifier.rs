//! M&A / scoop classifier.
//!
//! [`Classifier::classify`] returns the raw outcome, error included.
//! [`Classifier::contains_ma_or_scoop`] is what the pipeline calls: any
//! error there becomes `false`, so a flaky or unconfigured model never
//! stops a cycle.

use crate::api::{AskAsync, ClassifyError, Prompt};
use tracing::{debug, instrument, warn};

/// Fixed instruction sent as the system message.
pub const SYSTEM_PROMPT: &str = "You classify business news. Reply 'true' if the text \
mentions a corporate merger or acquisition (including discussions or rumors) or \
claims to have an exclusive scoop. Otherwise reply 'false'.";

/// One token, deterministic.
pub fn prompt() -> Prompt {
    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        max_tokens: 1,
        temperature: 0.0,
    }
}

/// Map a model reply to a verdict: anything starting with `t` is positive.
pub fn interpret_reply(reply: &str) -> bool {
    reply.trim().to_lowercase().starts_with('t')
}

#[derive(Debug)]
pub struct Classifier<A> {
    ask: A,
}

impl<A> Classifier<A>
where
    A: AskAsync<Response = String>,
{
    pub fn new(ask: A) -> Self {
        Self { ask }
    }

    /// Classify `text`, surfacing any API failure.
    ///
    /// Blank text is negative without contacting the model.
    pub async fn classify(&self, text: &str) -> Result<bool, ClassifyError> {
        if text.trim().is_empty() {
            debug!("Blank article text; skipping model call");
            return Ok(false);
        }
        let reply = self.ask.ask(text).await?;
        Ok(interpret_reply(&reply))
    }

    /// Classify `text`, treating every failure as a negative result.
    #[instrument(level = "info", skip_all, fields(bytes = text.len()))]
    pub async fn contains_ma_or_scoop(&self, text: &str) -> bool {
        match self.classify(text).await {
            Ok(verdict) => {
                debug!(verdict, "Classified article");
                verdict
            }
            Err(e) => {
                warn!(error = %e, "Classification failed; treating as negative");
                false
            }
        }
    }
}
