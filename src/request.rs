//! Inbound request model.
//!
//! One body shape covers every client the frontend has shipped: the
//! multi-file chat form (`files` + `prompt`) and the toolbar form (`tool`,
//! optional `extra`, single `file`). All fields are optional on the wire;
//! [`crate::chat::ChatPipeline::handle`] decides what is missing.

use crate::pipeline::prompt::Mode;
use serde::{Deserialize, Serialize};

/// One uploaded file as sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Display name; not guaranteed unique.
    pub filename: String,
    /// Base64 PDF content, optionally prefixed `data:<mime>;base64,`.
    pub file_data: String,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, file_data: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            file_data: file_data.into(),
        }
    }
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Multi-file form.
    #[serde(default)]
    pub files: Vec<UploadedFile>,

    /// Single-file form; appended after `files` when both are present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<UploadedFile>,

    /// Toolbar action label, e.g. `"Summarize"` or `"Clause Finder"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,

    /// Clause search term for the clause finder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,

    /// Free-form question. Ignored when `tool` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    /// Ask the model for follow-up questions and return them parsed.
    #[serde(default)]
    pub followups: bool,
}

impl ChatRequest {
    /// All uploaded files in request order.
    pub fn uploaded_files(&self) -> impl Iterator<Item = &UploadedFile> {
        self.files.iter().chain(self.file.iter())
    }

    /// Resolve what the model should do, if anything was asked.
    ///
    /// A non-blank tool wins over a prompt; a blank string counts as absent.
    pub fn mode(&self) -> Option<Mode> {
        if let Some(tool) = non_blank(&self.tool) {
            return Some(Mode::from_tool(tool, non_blank(&self.extra)));
        }
        non_blank(&self.prompt).map(|p| Mode::Instruction(p.to_string()))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
