//! Chat-completion API client.
//!
//! The classifier talks to the language model through the [`AskAsync`]
//! trait, so any backend that turns a prompt into a reply can stand in for
//! the real API. [`ChatCompletionClient`] is the production implementation:
//! it speaks the OpenAI `/chat/completions` wire format with a bearer token.
//!
//! There is no retry here; a failed call is reported once and the caller
//! decides what a failure means.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::utils::truncate_for_log;

/// Default OpenAI API root; `/chat/completions` is appended.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Model used when `--model` is not given.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("response contained no choices")]
    NoChoices,
}

/// Trait for async LLM interaction.
pub trait AskAsync {
    /// The type of response returned by the LLM.
    type Response;

    /// Send `text` as the user turn and return the model's reply.
    ///
    /// # Arguments
    ///
    /// * `text` - Article body sent as the user message
    ///
    /// # Returns
    ///
    /// The model's reply, or a [`ClassifyError`] if no key is configured,
    /// the request failed, the API answered with a non-2xx status, or the
    /// response carried no choices.
    async fn ask(&self, text: &str) -> Result<Self::Response, ClassifyError>;
}

/// Sampling parameters and fixed instruction for one kind of request.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat-completion client.
pub struct ChatCompletionClient {
    endpoint: Url,
    api_key: Option<String>,
    model: String,
    prompt: Prompt,
    client: reqwest::Client,
}

impl ChatCompletionClient {
    /// Build a client rooted at `base_url` (for example `https://api.openai.com/v1`).
    ///
    /// A missing key is not an error here; every call fails with
    /// [`ClassifyError::MissingApiKey`] instead.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root; `/chat/completions` is appended to it
    /// * `api_key` - Bearer token, `None` when unset
    /// * `model` - Model name sent with every request
    /// * `prompt` - System instruction and sampling parameters
    /// * `timeout` - Whole-request timeout for each call
    ///
    /// # Returns
    ///
    /// The client, or the `reqwest` error if the HTTP client cannot be built.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let base = Url::parse(OPENAI_BASE_URL)?;
    /// let client = ChatCompletionClient::new(&base, Some(key), DEFAULT_MODEL, prompt(), Duration::from_secs(30))?;
    /// ```
    pub fn new(
        base_url: &Url,
        api_key: Option<String>,
        model: impl Into<String>,
        prompt: Prompt,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            endpoint: chat_endpoint(base_url),
            api_key,
            model: model.into(),
            prompt,
            client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }
}

impl std::fmt::Debug for ChatCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl AskAsync for ChatCompletionClient {
    type Response = String;

    #[instrument(level = "debug", skip_all, fields(model = %self.model))]
    async fn ask(&self, text: &str) -> Result<Self::Response, ClassifyError> {
        let api_key = self.api_key.as_deref().ok_or(ClassifyError::MissingApiKey)?;
        let body = ChatRequest {
            model: &self.model,
            messages: [
                Message {
                    role: "system",
                    content: &self.prompt.system,
                },
                Message {
                    role: "user",
                    content: text,
                },
            ],
            max_tokens: self.prompt.max_tokens,
            temperature: self.prompt.temperature,
        };

        let t0 = Instant::now();
        let resp = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(
                elapsed_ms = t0.elapsed().as_millis() as u64,
                %status,
                "API call failed"
            );
            return Err(ClassifyError::Status {
                status,
                body: truncate_for_log(&body, 300),
            });
        }

        let parsed: ChatResponse = resp.json().await?;
        let reply = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(ClassifyError::NoChoices)?
            .message
            .content
            .unwrap_or_default();
        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            reply = %truncate_for_log(&reply, 80),
            "API call succeeded"
        );
        Ok(reply)
    }
}

/// `{base}/chat/completions`, tolerating a trailing slash on the base.
fn chat_endpoint(base_url: &Url) -> Url {
    let mut endpoint = base_url.clone();
    let path = format!("{}/chat/completions", base_url.path().trim_end_matches('/'));
    endpoint.set_path(&path);
    endpoint
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn prompt() -> Prompt {
        Prompt {
            system: "Reply true or false.".to_string(),
            max_tokens: 1,
            temperature: 0.0,
        }
    }

    fn client_for(server: &mockito::Server, api_key: Option<&str>) -> ChatCompletionClient {
        let base = Url::parse(&server.url()).unwrap();
        ChatCompletionClient::new(
            &base,
            api_key.map(str::to_string),
            DEFAULT_MODEL,
            prompt(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_chat_endpoint_joins_path() {
        let base = Url::parse("https://api.openai.com/v1").unwrap();
        assert_eq!(
            chat_endpoint(&base).as_str(),
            "https://api.openai.com/v1/chat/completions"
        );
        let base = Url::parse("http://localhost:8080/v1/").unwrap();
        assert_eq!(
            chat_endpoint(&base).as_str(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn test_ask_sends_openai_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-3.5-turbo",
                "max_tokens": 1,
                "temperature": 0.0,
                "messages": [
                    {"role": "system", "content": "Reply true or false."},
                    {"role": "user", "content": "Firm X buys Firm Y"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"true"}}]}"#)
            .create_async()
            .await;

        let reply = client_for(&server, Some("sk-test"))
            .ask("Firm X buys Firm Y")
            .await
            .unwrap();
        assert_eq!(reply, "true");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ask_without_key_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .expect(0)
            .create_async()
            .await;

        let result = client_for(&server, None).ask("anything").await;
        assert!(matches!(result, Err(ClassifyError::MissingApiKey)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ask_reports_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body(r#"{"error":{"message":"Rate limit exceeded"}}"#)
            .create_async()
            .await;

        let err = client_for(&server, Some("sk-test"))
            .ask("text")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn test_ask_rejects_empty_choices() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let result = client_for(&server, Some("sk-test")).ask("text").await;
        assert!(matches!(result, Err(ClassifyError::NoChoices)));
    }

    #[tokio::test]
    async fn test_ask_treats_null_content_as_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
            .create_async()
            .await;

        let reply = client_for(&server, Some("sk-test")).ask("text").await.unwrap();
        assert_eq!(reply, "");
    }
}
