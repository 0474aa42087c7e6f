//! Error types for the docchat library.
//!
//! Every failure of a chat request is fatal: a request either produces the
//! full completion or a single [`ChatError`]. There is no partial success
//! for extraction or completion. The one stage allowed to degrade is
//! follow-up parsing, which returns an empty list instead of an error and
//! therefore has no variant here.
//!
//! Each variant knows the HTTP status and the `{error, details}` pair it is
//! reported as, so the HTTP layer and the CLI render failures identically.

use serde_json::Value;
use thiserror::Error;

/// All errors returned by the docchat pipeline.
#[derive(Debug, Error)]
pub enum ChatError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// The request carried neither `files` nor `file`.
    #[error("No files provided")]
    NoFiles,

    /// The request carried neither a tool nor a free-form prompt.
    #[error("No tool or prompt provided")]
    NoInstruction,

    /// The request body could not be deserialised.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The request body exceeded the configured size cap.
    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    /// `file_data` was not decodable base64 (or decoded to nothing).
    #[error("Invalid file data for '{filename}': {detail}")]
    InvalidFileData { filename: String, detail: String },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The PDF parser rejected the document.
    #[error("Failed to parse PDF: {filename}: {detail}")]
    Extraction { filename: String, detail: String },

    // ── Completion errors ─────────────────────────────────────────────────
    /// The completion endpoint answered with a non-2xx status.
    ///
    /// `body` is the upstream error body, parsed as JSON when possible and
    /// kept as a JSON string otherwise.
    #[error("Completion endpoint returned HTTP {status}")]
    Upstream { status: u16, body: Value },

    /// The completion endpoint could not be reached or returned garbage.
    #[error("Completion request failed: {0}")]
    Transport(String),

    /// The completion call exceeded the configured deadline.
    #[error("Completion call timed out after {secs}s")]
    Timeout { secs: u64 },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChatError {
    /// HTTP status code this error is reported with.
    ///
    /// Upstream statuses are proxied as-is; an upstream status that is not a
    /// valid error code falls back to 500.
    pub fn status(&self) -> u16 {
        match self {
            ChatError::NoFiles
            | ChatError::NoInstruction
            | ChatError::InvalidRequest(_)
            | ChatError::InvalidFileData { .. } => 400,
            ChatError::PayloadTooLarge(_) => 413,
            ChatError::Upstream { status, .. } if (400..=599).contains(status) => *status,
            ChatError::Timeout { .. } => 504,
            ChatError::Upstream { .. }
            | ChatError::Extraction { .. }
            | ChatError::Transport(_)
            | ChatError::InvalidConfig(_)
            | ChatError::Internal(_) => 500,
        }
    }

    /// Short, stable label for the `error` field of the response envelope.
    pub fn label(&self) -> &'static str {
        match self {
            ChatError::NoFiles => "No files provided",
            ChatError::NoInstruction => "No tool or prompt provided",
            ChatError::InvalidRequest(_) => "Invalid request",
            ChatError::PayloadTooLarge(_) => "Request body too large",
            ChatError::InvalidFileData { .. } => "Invalid file data",
            ChatError::Extraction { .. }
            | ChatError::Upstream { .. }
            | ChatError::Transport(_)
            | ChatError::Timeout { .. } => "Proxy failed",
            ChatError::InvalidConfig(_) => "Invalid configuration",
            ChatError::Internal(_) => "Internal error",
        }
    }

    /// Value for the `details` field of the response envelope.
    pub fn details(&self) -> Value {
        match self {
            ChatError::NoFiles | ChatError::NoInstruction => Value::Null,
            ChatError::InvalidRequest(msg)
            | ChatError::PayloadTooLarge(msg)
            | ChatError::Transport(msg)
            | ChatError::InvalidConfig(msg)
            | ChatError::Internal(msg) => Value::String(msg.clone()),
            ChatError::InvalidFileData { filename, detail } => {
                Value::String(format!("{filename}: {detail}"))
            }
            ChatError::Extraction { .. } => Value::String(self.to_string()),
            ChatError::Upstream { body, .. } => body.clone(),
            ChatError::Timeout { secs } => {
                Value::String(format!("completion call timed out after {secs}s"))
            }
        }
    }

    /// True for failures caused by the caller's request rather than by
    /// this service or its collaborators.
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), 400 | 413)
    }

    /// The `{error, details}` failure envelope.
    pub fn envelope(&self) -> Value {
        serde_json::json!({
            "error": self.label(),
            "details": self.details(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        assert_eq!(ChatError::NoFiles.status(), 400);
        assert_eq!(ChatError::NoInstruction.status(), 400);
        assert!(ChatError::InvalidRequest("missing field".into()).is_client_error());
        let e = ChatError::InvalidFileData {
            filename: "a.pdf".into(),
            detail: "Invalid byte 33".into(),
        };
        assert_eq!(e.status(), 400);
        assert_eq!(e.details(), Value::String("a.pdf: Invalid byte 33".into()));
    }

    #[test]
    fn upstream_status_is_proxied() {
        let e = ChatError::Upstream {
            status: 429,
            body: serde_json::json!({"error": {"message": "rate limited"}}),
        };
        assert_eq!(e.status(), 429);
        assert_eq!(e.label(), "Proxy failed");
        assert_eq!(e.details()["error"]["message"], "rate limited");
    }

    #[test]
    fn upstream_non_error_status_falls_back_to_500() {
        let e = ChatError::Upstream {
            status: 302,
            body: Value::String("moved".into()),
        };
        assert_eq!(e.status(), 500);
    }

    #[test]
    fn extraction_details_carry_parser_message() {
        let e = ChatError::Extraction {
            filename: "contract.pdf".into(),
            detail: "invalid file trailer".into(),
        };
        assert_eq!(e.status(), 500);
        let details = e.details();
        let details = details.as_str().unwrap();
        assert!(details.contains("contract.pdf"), "got: {details}");
        assert!(details.contains("invalid file trailer"), "got: {details}");
    }

    #[test]
    fn envelope_shape() {
        let env = ChatError::NoFiles.envelope();
        assert_eq!(env["error"], "No files provided");
        assert!(env["details"].is_null());

        let env = ChatError::Timeout { secs: 60 }.envelope();
        assert_eq!(env["error"], "Proxy failed");
        assert!(env["details"].as_str().unwrap().contains("60s"));
    }
}
