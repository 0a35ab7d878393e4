//! Completion client: one chat-completion POST per receipt.
//!
//! The request carries a single user message holding the filled prompt. The
//! reply's `choices[0].message.content` is expected to be a JSON object of
//! receipt fields; see [`crate::pipeline::postprocess::parse_fields`].
//!
//! There is no retry and no backoff. Every failure comes back as a
//! [`CompletionError`]; the orchestrator then writes a row with empty fields.

use crate::config::ScanConfig;
use crate::error::{CompletionError, ReceiptError};
use crate::pipeline::postprocess::parse_fields;
use crate::record::ParsedReceipt;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::debug;

/// Something that turns a prompt into receipt fields.
pub trait Completer {
    fn complete(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<ParsedReceipt, CompletionError>> + Send;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
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
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// [`Completer`] for OpenAI-style chat-completion endpoints (OpenRouter by
/// default).
#[derive(Clone)]
pub struct ChatCompletionClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    referer: String,
    title: String,
}

impl std::fmt::Debug for ChatCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("referer", &self.referer)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

impl ChatCompletionClient {
    /// Build a client from the scan configuration.
    ///
    /// Fails with [`ReceiptError::MissingApiKey`] when no credential is set.
    pub fn from_config(config: &ScanConfig) -> Result<Self, ReceiptError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ReceiptError::MissingApiKey)?
            .to_string();

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.api_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ReceiptError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key,
            model: config.model_id.clone(),
            referer: config.referer.clone(),
            title: config.title.clone(),
        })
    }
}

impl Completer for ChatCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<ParsedReceipt, CompletionError> {
        let start = Instant::now();
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;
        debug!(
            "Completion: HTTP {} in {:?}, {} bytes",
            status.as_u16(),
            start.elapsed(),
            text.len()
        );

        if !status.is_success() {
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        decode_completion(&text)
    }
}

/// Decode a successful chat-completion body into receipt fields.
///
/// Two JSON parses: the envelope, then `choices[0].message.content`.
pub fn decode_completion(body: &str) -> Result<ParsedReceipt, CompletionError> {
    let envelope: ChatResponse = serde_json::from_str(body)
        .map_err(|e| CompletionError::Decode(format!("response is not a chat completion: {e}")))?;

    let content = envelope
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::Decode("response has no choices".into()))?
        .message
        .content
        .ok_or_else(|| CompletionError::Decode("first choice has no message content".into()))?;

    parse_fields(&content)
}
