//! Request orchestration: validate → decode → extract → assemble →
//! complete → follow-ups.
//!
//! [`ChatPipeline`] holds no per-request state. One instance is shared by
//! every HTTP request, and two requests never see each other's data.
//! Every step before follow-up parsing is all-or-nothing: the first failure
//! aborts the request and nothing partial is returned.

use crate::config::ChatConfig;
use crate::error::ChatError;
use crate::output::ChatOutput;
use crate::pipeline::extract::{self, ExtractedDocument, PdfTextExtractor, TextExtractor};
use crate::pipeline::llm::{CompletionBackend, OpenRouterClient};
use crate::pipeline::prompt::{self, Mode};
use crate::pipeline::{followups, input};
use crate::request::ChatRequest;
use futures::future::try_join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// The document-chat pipeline.
pub struct ChatPipeline {
    config: ChatConfig,
    extractor: Arc<dyn TextExtractor>,
    backend: Arc<dyn CompletionBackend>,
}

impl ChatPipeline {
    /// Pipeline with the `pdf-extract` parser and an HTTP completion client
    /// built from `config`.
    pub fn new(config: ChatConfig) -> Result<Self, ChatError> {
        let backend = OpenRouterClient::new(&config)?;
        Ok(Self::with_parts(
            config,
            Arc::new(PdfTextExtractor),
            Arc::new(backend),
        ))
    }

    /// Pipeline with caller-supplied stages. Used by tests and by hosts
    /// that wrap the completion call (caching, rate limiting, ...).
    pub fn with_parts(
        config: ChatConfig,
        extractor: Arc<dyn TextExtractor>,
        backend: Arc<dyn CompletionBackend>,
    ) -> Self {
        Self {
            config,
            extractor,
            backend,
        }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Handle one inbound request.
    ///
    /// # Errors
    /// - [`ChatError::NoFiles`] / [`ChatError::NoInstruction`] /
    ///   [`ChatError::InvalidFileData`] before any parsing or network call
    /// - [`ChatError::Extraction`] if any PDF cannot be parsed
    /// - [`ChatError::Upstream`], [`ChatError::Transport`],
    ///   [`ChatError::Timeout`] from the completion call
    pub async fn handle(&self, request: ChatRequest) -> Result<ChatOutput, ChatError> {
        // ── Step 1: Validate ─────────────────────────────────────────────────
        if request.uploaded_files().next().is_none() {
            return Err(ChatError::NoFiles);
        }
        let mode = request.mode().ok_or(ChatError::NoInstruction)?;

        // Every file is decoded before any is parsed: one bad payload
        // rejects the request without wasting parser time on the rest.
        let files = request
            .uploaded_files()
            .map(|f| {
                input::decode_file_data(&f.filename, &f.file_data)
                    .map(|bytes| (f.filename.clone(), bytes))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.run(files, mode, request.followups).await
    }

    /// Run the pipeline on already-decoded files.
    ///
    /// This is what the CLI uses for local PDFs; `handle` delegates here
    /// after validation and decoding.
    pub async fn ask(
        &self,
        files: Vec<(String, Vec<u8>)>,
        mode: Mode,
        followups: bool,
    ) -> Result<ChatOutput, ChatError> {
        if files.is_empty() {
            return Err(ChatError::NoFiles);
        }
        self.run(files, mode, followups).await
    }

    async fn run(
        &self,
        files: Vec<(String, Vec<u8>)>,
        mode: Mode,
        followups: bool,
    ) -> Result<ChatOutput, ChatError> {
        let total_start = Instant::now();
        info!(
            "Chat request: {} document(s), mode {}, followups {}",
            files.len(),
            mode.label(),
            followups
        );

        // ── Step 2: Extract text from every PDF concurrently ─────────────────
        let extract_start = Instant::now();
        let documents = self.extract_all(files).await?;
        let extract_ms = extract_start.elapsed().as_millis() as u64;

        // ── Step 3: Assemble prompt ──────────────────────────────────────────
        // Passthrough never asks for follow-ups, so there are none to parse.
        let followup_count = (followups && mode != Mode::Passthrough)
            .then_some(self.config.followup_count);
        let prompt = prompt::assemble(&mode, &documents, followup_count);
        debug!("Assembled prompt: {} chars", prompt.len());

        // ── Step 4: Complete ─────────────────────────────────────────────────
        let llm_start = Instant::now();
        let content = self.complete_with_deadline(&prompt).await?;
        let llm_ms = llm_start.elapsed().as_millis() as u64;

        // ── Step 5: Follow-ups ───────────────────────────────────────────────
        let followups = followup_count.map(|n| {
            let items = followups::extract_followups(&content, n);
            if items.is_empty() {
                debug!("No follow-up questions found in completion");
            }
            items
        });

        info!(
            "Chat complete: {} chars out, extract {}ms, llm {}ms, total {}ms",
            content.len(),
            extract_ms,
            llm_ms,
            total_start.elapsed().as_millis()
        );

        Ok(ChatOutput { content, followups })
    }

    /// Extract all documents, preserving input order.
    ///
    /// `try_join_all` polls every extraction at once and resolves to the
    /// first error; the remaining results are dropped.
    async fn extract_all(
        &self,
        files: Vec<(String, Vec<u8>)>,
    ) -> Result<Vec<ExtractedDocument>, ChatError> {
        let max_chars = self.config.max_document_chars;
        try_join_all(files.into_iter().map(|(filename, bytes)| {
            extract::extract_document(Arc::clone(&self.extractor), filename, bytes, max_chars)
        }))
        .await
        .inspect_err(|e| warn!("Extraction failed: {}", e))
    }

    /// One completion call bounded by `api_timeout_secs`, whatever the
    /// backend's own timeout handling.
    async fn complete_with_deadline(&self, prompt: &str) -> Result<String, ChatError> {
        let secs = self.config.api_timeout_secs;
        match tokio::time::timeout(Duration::from_secs(secs), self.backend.complete(prompt)).await
        {
            Ok(result) => result,
            Err(_) => {
                warn!("Completion call exceeded {}s deadline", secs);
                Err(ChatError::Timeout { secs })
            }
        }
    }
}
