//! # docchat
//!
//! Chat with legal PDF documents through an LLM completion endpoint.
//!
//! ## Why this crate?
//!
//! The browser frontend cannot hold an API key and cannot parse PDFs
//! cheaply. This crate sits in between. It accepts base64 PDFs in a JSON
//! body, extracts their text, wraps it in a task prompt (summarise, redact,
//! find clauses, analyse risk, or a free-form question) and forwards a
//! single chat-completion request to an OpenAI-compatible provider such as
//! OpenRouter. The model's answer comes back as `{"content": ...}`.
//!
//! ## Pipeline Overview
//!
//! ```text
//! JSON request
//!  │
//!  ├─ 1. Validate  files present, tool or prompt present
//!  ├─ 2. Decode    strip data-URI prefix, base64 → bytes
//!  ├─ 3. Extract   PDF → text, all files concurrently (spawn_blocking)
//!  ├─ 4. Assemble  documents + tool template (+ follow-up request)
//!  ├─ 5. Complete  one POST to {base_url}/chat/completions
//!  └─ 6. Respond   {content} or {content, followups}
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docchat::{ChatConfig, ChatPipeline, ChatRequest, UploadedFile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ChatConfig::builder()
//!         .api_key(std::env::var("OPENROUTER_API_KEY")?)
//!         .build()?;
//!     let pipeline = ChatPipeline::new(config)?;
//!
//!     let pdf = std::fs::read("lease.pdf")?;
//!     let request = ChatRequest {
//!         tool: Some("Summarize".into()),
//!         file: Some(UploadedFile::new(
//!             "lease.pdf",
//!             docchat::pipeline::input::encode_data_uri("application/pdf", &pdf),
//!         )),
//!         ..Default::default()
//!     };
//!     println!("{}", pipeline.handle(request).await?.content);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docchat` binary (clap + anyhow + tracing-subscriber + dotenvy) |
//!
//! Disable `cli` when embedding the router in another service:
//! ```toml
//! docchat = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod chat;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod request;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use chat::ChatPipeline;
pub use config::{ChatConfig, ChatConfigBuilder};
pub use error::ChatError;
pub use output::ChatOutput;
pub use pipeline::extract::{PdfTextExtractor, TextExtractor};
pub use pipeline::llm::{CompletionBackend, OpenRouterClient};
pub use pipeline::prompt::Mode;
pub use request::{ChatRequest, UploadedFile};
pub use server::{app, serve};
