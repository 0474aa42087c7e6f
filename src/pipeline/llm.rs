//! Completion call: one prompt in, the model's raw text out.
//!
//! The wire format is the OpenAI-compatible chat-completions API spoken by
//! OpenRouter and most gateways: a single user message, a fixed model, and
//! a bearer credential. Prompt wording lives in [`crate::prompts`] and is
//! assembled in [`crate::pipeline::prompt`]; this module only moves bytes
//! and classifies failures.
//!
//! ## Failure policy
//!
//! One attempt per request, no retries. Non-2xx answers become
//! [`ChatError::Upstream`] carrying the upstream status and body verbatim,
//! so callers see the provider's own explanation. A response without any
//! choice is not an error: it yields an empty string.

use crate::config::ChatConfig;
use crate::error::ChatError;
use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Anything that can turn a prompt into model output.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ChatError>;
}

/// Chat message in the request body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat-completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponseRaw {
    #[serde(default)]
    choices: Vec<ChoiceRaw>,
}

#[derive(Debug, Deserialize)]
struct ChoiceRaw {
    #[serde(default)]
    message: Option<MessageRaw>,
}

#[derive(Debug, Deserialize)]
struct MessageRaw {
    #[serde(default)]
    content: Option<String>,
}

/// Pull the first choice's text out of a completion response body.
///
/// Missing `choices`, an empty array, or a null `content` all give `""`.
pub fn first_choice_content(body: &str) -> Result<String, ChatError> {
    let raw: CompletionResponseRaw = serde_json::from_str(body)
        .map_err(|e| ChatError::Transport(format!("invalid completion response: {e}")))?;
    Ok(raw
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .unwrap_or_default())
}

/// Keep an upstream error body as JSON when it is JSON, else as a string.
fn upstream_body(text: String) -> Value {
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

/// Client for an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct OpenRouterClient {
    http_client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
    timeout_secs: u64,
}

impl OpenRouterClient {
    /// Build a client from the pipeline configuration.
    pub fn new(config: &ChatConfig) -> Result<Self, ChatError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| ChatError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            url: config.completions_url(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            timeout_secs: config.api_timeout_secs,
        })
    }

    /// Full endpoint URL this client posts to.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn classify(&self, e: reqwest::Error) -> ChatError {
        if e.is_timeout() {
            ChatError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            ChatError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenRouterClient {
    async fn complete(&self, prompt: &str) -> Result<String, ChatError> {
        let start = Instant::now();
        let body = CompletionRequest {
            model: &self.model,
            messages: vec![Message::user(prompt)],
        };

        let mut request = self
            .http_client
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Completion request failed");
            self.classify(e)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            warn!(status = %status, body = %text, "Completion endpoint error");
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                body: upstream_body(text),
            });
        }

        let content = first_choice_content(&text)?;
        if content.is_empty() {
            warn!(model = %self.model, "Completion response had no content");
        }

        debug!(
            model = %self.model,
            chars = content.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Chat completion"
        );

        Ok(content)
    }
}
