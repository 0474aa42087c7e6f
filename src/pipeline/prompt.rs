//! Prompt assembly: extracted documents + mode → one completion prompt.
//!
//! Assembly is plain string construction with no I/O, so it is tested
//! exhaustively here. Template wording lives in [`crate::prompts`].

use crate::pipeline::extract::ExtractedDocument;
use crate::prompts;
use tracing::warn;

/// What the model is asked to do with the documents.
///
/// One variant per toolbar action, plus a free-form instruction and the
/// identity fallback used for unrecognised tool labels. Adding a variant
/// forces [`assemble`] to handle it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Summarize,
    Redact,
    ClauseFinder { term: Option<String> },
    ChatWithDocument,
    AnalyzeRisk,
    /// Free-form question typed by the user.
    Instruction(String),
    /// Send the document text unchanged.
    Passthrough,
}

impl Mode {
    /// Map a toolbar label to a mode.
    ///
    /// Labels compare case-insensitively, ignoring spaces, `-` and `_`, so
    /// `"Clause Finder"`, `"clause_finder"` and `"ClauseFinder"` are the same
    /// tool. `extra` is the clause search term; it is ignored by every other
    /// tool. Unknown labels fall back to [`Mode::Passthrough`].
    pub fn from_tool(label: &str, extra: Option<&str>) -> Self {
        let key: String = label
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "summarize" | "summarise" => Mode::Summarize,
            "redact" => Mode::Redact,
            "clausefinder" => Mode::ClauseFinder {
                term: extra
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string),
            },
            "chatwithdocument" => Mode::ChatWithDocument,
            "analyzerisk" | "analyserisk" => Mode::AnalyzeRisk,
            _ => {
                warn!("Unknown tool '{}'; sending document text unchanged", label);
                Mode::Passthrough
            }
        }
    }

    /// Human-readable name used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Summarize => "Summarize",
            Mode::Redact => "Redact",
            Mode::ClauseFinder { .. } => "Clause Finder",
            Mode::ChatWithDocument => "Chat with Document",
            Mode::AnalyzeRisk => "Analyze Risk",
            Mode::Instruction(_) => "Instruction",
            Mode::Passthrough => "Passthrough",
        }
    }
}

/// Build the completion prompt.
///
/// `followups` is the number of follow-up questions to ask for, or `None`
/// to ask for none. The passthrough mode never gets the suffix: it promises
/// the raw text and nothing else.
pub fn assemble(mode: &Mode, documents: &[ExtractedDocument], followups: Option<usize>) -> String {
    // Free-form questions come from the chat panel, which always labels
    // each file; the toolbar templates take a lone document bare.
    let text = match mode {
        Mode::Instruction(_) => document_blocks(documents),
        _ => render_documents(documents),
    };

    let mut prompt = match mode {
        Mode::Summarize => format!("{}\n\n{text}", prompts::SUMMARIZE_PREFIX),
        Mode::Redact => format!("{}\n\n{text}", prompts::REDACT_PREFIX),
        Mode::ClauseFinder { term } => {
            format!("{}\n\n{text}", prompts::clause_finder_intro(term.as_deref()))
        }
        Mode::ChatWithDocument => format!("{}\n\n{text}", prompts::CHAT_WITH_DOCUMENT_PREFIX),
        Mode::AnalyzeRisk => format!("{}\n\n{text}", prompts::ANALYZE_RISK_PREFIX),
        Mode::Instruction(question) => format!(
            "{}\n\n{text}\n\n{}\n{}",
            prompts::INSTRUCTION_PREAMBLE,
            prompts::INSTRUCTION_QUESTION_HEADER,
            question.trim()
        ),
        Mode::Passthrough => return text,
    };

    if let Some(n) = followups {
        prompt.push_str(&prompts::followup_suffix(n));
    }
    prompt
}

/// Lay out the documents for the model.
///
/// A single document is inserted verbatim. Several documents each get a
/// `=== filename ===` header so the model can tell sources apart; blocks are
/// separated by a blank line and keep the input order.
pub fn render_documents(documents: &[ExtractedDocument]) -> String {
    match documents {
        [single] => single.text.clone(),
        many => document_blocks(many),
    }
}

/// One `=== filename ===` block per document, even when there is only one.
pub fn document_blocks(documents: &[ExtractedDocument]) -> String {
    documents
        .iter()
        .map(|d| format!("{}\n{}", prompts::document_header(&d.filename), d.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}
