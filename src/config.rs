//! Configuration for the chat pipeline and its HTTP surface.
//!
//! Everything the pipeline needs from its environment (endpoint, model,
//! credential, limits) lives in [`ChatConfig`] and is handed to
//! [`crate::chat::ChatPipeline`] at construction time. Nothing in the
//! request path reads process environment, so tests can build a config that
//! points at a stub endpoint and run the real pipeline against it.

use crate::error::ChatError;
use std::fmt;

/// Default OpenAI-compatible completion endpoint.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default model identifier sent with every completion request.
pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-001";

/// Default request-body cap for the HTTP endpoint (50 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Configuration for a [`crate::chat::ChatPipeline`].
///
/// Built via [`ChatConfig::builder()`] or using [`ChatConfig::default()`].
///
/// # Example
/// ```rust
/// use docchat::ChatConfig;
///
/// let config = ChatConfig::builder()
///     .model("openai/gpt-4.1-mini")
///     .api_key("sk-or-...")
///     .api_timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.model, "openai/gpt-4.1-mini");
/// ```
#[derive(Clone)]
pub struct ChatConfig {
    /// Base URL of the completion service. The client POSTs to
    /// `{base_url}/chat/completions`.
    pub base_url: String,

    /// Model identifier. Default: `google/gemini-2.0-flash-001`.
    pub model: String,

    /// Bearer credential. When `None` no `Authorization` header is sent.
    pub api_key: Option<String>,

    /// Maximum accepted request-body size in bytes. Default: 50 MiB.
    ///
    /// PDFs arrive base64-encoded inside JSON, so the effective document
    /// budget is roughly three quarters of this value.
    pub max_body_bytes: usize,

    /// Deadline for one completion call, in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// How many follow-up questions to ask for and keep. Default: 3.
    pub followup_count: usize,

    /// Optional cap on the characters kept from each extracted document.
    pub max_document_chars: Option<usize>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            api_timeout_secs: 60,
            followup_count: 3,
            max_document_chars: None,
        }
    }
}

impl fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("max_body_bytes", &self.max_body_bytes)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("followup_count", &self.followup_count)
            .field("max_document_chars", &self.max_document_chars)
            .finish()
    }
}

impl ChatConfig {
    /// Create a new builder for `ChatConfig`.
    pub fn builder() -> ChatConfigBuilder {
        ChatConfigBuilder {
            config: Self::default(),
        }
    }

    /// Full URL of the chat-completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Builder for [`ChatConfig`].
#[derive(Debug)]
pub struct ChatConfigBuilder {
    config: ChatConfig,
}

impl ChatConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.config.api_key = (!key.trim().is_empty()).then_some(key);
        self
    }

    pub fn max_body_bytes(mut self, n: usize) -> Self {
        self.config.max_body_bytes = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn followup_count(mut self, n: usize) -> Self {
        self.config.followup_count = n;
        self
    }

    pub fn max_document_chars(mut self, n: usize) -> Self {
        self.config.max_document_chars = Some(n);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ChatConfig, ChatError> {
        let c = &self.config;
        if !c.base_url.starts_with("http://") && !c.base_url.starts_with("https://") {
            return Err(ChatError::InvalidConfig(format!(
                "base URL must be http(s), got '{}'",
                c.base_url
            )));
        }
        if c.model.trim().is_empty() {
            return Err(ChatError::InvalidConfig("model must not be empty".into()));
        }
        if c.max_body_bytes < 1024 {
            return Err(ChatError::InvalidConfig(format!(
                "max body size must be ≥ 1024 bytes, got {}",
                c.max_body_bytes
            )));
        }
        if c.api_timeout_secs == 0 {
            return Err(ChatError::InvalidConfig("API timeout must be ≥ 1s".into()));
        }
        if !(1..=10).contains(&c.followup_count) {
            return Err(ChatError::InvalidConfig(format!(
                "follow-up count must be 1–10, got {}",
                c.followup_count
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ChatConfig::default();
        assert_eq!(c.model, DEFAULT_MODEL);
        assert_eq!(c.max_body_bytes, 50 * 1024 * 1024);
        assert_eq!(c.followup_count, 3);
        assert!(c.api_key.is_none());
        assert_eq!(
            c.completions_url(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn completions_url_tolerates_trailing_slash() {
        let c = ChatConfig::builder()
            .base_url("http://127.0.0.1:9000/v1/")
            .build()
            .unwrap();
        assert_eq!(c.completions_url(), "http://127.0.0.1:9000/v1/chat/completions");
    }

    #[test]
    fn debug_redacts_key() {
        let c = ChatConfig::builder().api_key("sk-secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn blank_key_is_none() {
        let c = ChatConfig::builder().api_key("   ").build().unwrap();
        assert!(c.api_key.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(ChatConfig::builder().base_url("ftp://x").build().is_err());
        assert!(ChatConfig::builder().model(" ").build().is_err());
        assert!(ChatConfig::builder().max_body_bytes(10).build().is_err());
        assert!(ChatConfig::builder().api_timeout_secs(0).build().is_err());
        assert!(ChatConfig::builder().followup_count(0).build().is_err());
        assert!(ChatConfig::builder().followup_count(11).build().is_err());
    }
}
