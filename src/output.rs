//! Result of a successful chat request.

use serde::{Deserialize, Serialize};

/// Success envelope returned to the caller.
///
/// Serialises as `{"content": ...}` or, when follow-ups were requested,
/// `{"content": ..., "followups": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatOutput {
    /// Raw model output (markdown-flavoured).
    pub content: String,

    /// Parsed follow-up questions. `Some(vec![])` when requested but none
    /// could be parsed; `None` when not requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followups: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn followups_omitted_when_not_requested() {
        let out = ChatOutput {
            content: "[REDACTED]".into(),
            followups: None,
        };
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            serde_json::json!({"content": "[REDACTED]"})
        );
    }

    #[test]
    fn empty_followups_still_serialised() {
        let out = ChatOutput {
            content: "x".into(),
            followups: Some(vec![]),
        };
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            serde_json::json!({"content": "x", "followups": []})
        );
    }
}
