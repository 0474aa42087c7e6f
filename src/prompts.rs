//! Prompt templates for the legal-document tools.
//!
//! Every string sent to the completion model is defined here, so wording
//! changes touch one file and unit tests can assert on the exact text
//! without a model in the loop. The assembler in
//! [`crate::pipeline::prompt`] only decides *which* template applies and
//! how documents are laid out.

/// Summarize tool. Followed by the document text.
pub const SUMMARIZE_PREFIX: &str = "Summarize the following document:";

/// Redact tool. Followed by the document text.
pub const REDACT_PREFIX: &str = "Redact PII from the following document:";

/// Clause finder, opening words. The optional search term and
/// [`CLAUSE_FINDER_TAIL`] follow.
pub const CLAUSE_FINDER_HEAD: &str = "Find important clauses";

/// Clause finder, closing words before the document text.
pub const CLAUSE_FINDER_TAIL: &str = " in the following document:";

/// Chat-with-document tool. Followed by the document text.
pub const CHAT_WITH_DOCUMENT_PREFIX: &str = "You are chatting with the content of this document:";

/// Risk analysis tool. Followed by the document text.
pub const ANALYZE_RISK_PREFIX: &str = "Analyze the legal risk in this document:";

/// Opening of a free-form question about the uploaded documents.
pub const INSTRUCTION_PREAMBLE: &str = "Here are the contents of the uploaded documents:";

/// Header placed between the documents and a free-form question.
pub const INSTRUCTION_QUESTION_HEADER: &str = "User's question:";

/// Render the clause-finder opening, with the search term when one is given.
pub fn clause_finder_intro(term: Option<&str>) -> String {
    match term {
        Some(t) => format!("{CLAUSE_FINDER_HEAD} related to \"{t}\"{CLAUSE_FINDER_TAIL}"),
        None => format!("{CLAUSE_FINDER_HEAD}{CLAUSE_FINDER_TAIL}"),
    }
}

/// Suffix asking the model for machine-parsable follow-up questions.
///
/// With `count == 3` this is exactly
/// `"\n\nGive a list of 3 parsable JSON follow up questions."`.
pub fn followup_suffix(count: usize) -> String {
    format!("\n\nGive a list of {count} parsable JSON follow up questions.")
}

/// Header line that opens one document block in a multi-document prompt.
pub fn document_header(filename: &str) -> String {
    format!("=== {filename} ===")
}
