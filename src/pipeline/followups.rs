//! Follow-up extraction: pull suggested questions out of model output.
//!
//! The model is asked (see [`crate::prompts::followup_suffix`]) for "a list
//! of parsable JSON follow up questions". Models comply in different ways:
//! a fenced ```` ```json ```` array, a bare fenced array, or a plain
//! markdown list. Two strategies cover these:
//!
//! 1. **Fenced JSON**: every fenced code block is tried in order; the first
//!    whose body parses as a JSON array wins, whatever its length.
//! 2. **List fallback**: only when no block parsed. Lines starting with
//!    `-`, `*` or `N.` followed by whitespace are collected; with at least `count` of them the
//!    first `count` are returned without their markers.
//!
//! Anything else yields an empty list. This stage never fails.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static RE_FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?si)```[ \t]*(?:json)?[ \t]*\r?\n?(.*?)```").unwrap());

static RE_LIST_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-*]|\d+\.)\s+(\S.*?)\s*$").unwrap());

/// Extract follow-up questions from `content`.
///
/// `count` is both the minimum number of list lines the fallback needs and
/// the number it keeps. A parsed JSON array is returned untruncated.
pub fn extract_followups(content: &str, count: usize) -> Vec<String> {
    if let Some(items) = from_fenced_json(content) {
        return items;
    }
    from_list_lines(content, count).unwrap_or_default()
}

fn from_fenced_json(content: &str) -> Option<Vec<String>> {
    RE_FENCED_BLOCK.captures_iter(content).find_map(|caps| {
        match serde_json::from_str::<Value>(caps[1].trim()) {
            Ok(Value::Array(items)) => Some(items.into_iter().map(item_text).collect()),
            _ => None,
        }
    })
}

fn item_text(item: Value) -> String {
    match item {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn from_list_lines(content: &str, count: usize) -> Option<Vec<String>> {
    let items: Vec<String> = content
        .lines()
        .filter_map(|line| RE_LIST_ITEM.captures(line))
        .map(|caps| strip_quotes(&caps[1]).to_string())
        .take(count)
        .collect();
    (count > 0 && items.len() == count).then_some(items)
}

fn strip_quotes(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_json_block() {
        let content = "Here is the summary.\n\n```json\n[\"Q1?\",\"Q2?\",\"Q3?\"]\n```\n";
        assert_eq!(extract_followups(content, 3), vec!["Q1?", "Q2?", "Q3?"]);
    }

    #[test]
    fn test_untagged_fence() {
        let content = "```\n[\"Who signs?\", \"When?\"]\n```";
        assert_eq!(extract_followups(content, 3), vec!["Who signs?", "When?"]);
    }

    #[test]
    fn test_array_not_truncated() {
        let content = "```json\n[\"a\",\"b\",\"c\",\"d\",\"e\"]\n```";
        assert_eq!(extract_followups(content, 3).len(), 5);
    }

    #[test]
    fn test_skips_unparseable_block_and_takes_next() {
        let content = "```rust\nfn main() {}\n```\nThen:\n```json\n[\"Next?\"]\n```";
        assert_eq!(extract_followups(content, 3), vec!["Next?"]);
    }

    #[test]
    fn test_non_string_items_rendered_as_json() {
        let content = "```json\n[{\"q\":\"Why?\"}, 42]\n```";
        assert_eq!(extract_followups(content, 3), vec![r#"{"q":"Why?"}"#, "42"]);
    }

    #[test]
    fn test_list_fallback_dashes() {
        let content = "Summary text.\n\n- A\n- B\n- C\n";
        assert_eq!(extract_followups(content, 3), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_list_fallback_mixed_markers_keeps_first_three() {
        let content = "1. What is the term?\n* Who pays rent?\n2. \"Is there a deposit?\"\n- Extra one\n";
        assert_eq!(
            extract_followups(content, 3),
            vec!["What is the term?", "Who pays rent?", "Is there a deposit?"]
        );
    }

    #[test]
    fn test_list_fallback_needs_enough_lines() {
        let content = "- only\n- two\n";
        assert!(extract_followups(content, 3).is_empty());
    }

    #[test]
    fn test_object_in_fence_falls_back_to_list() {
        let content = "```json\n{\"questions\": 1}\n```\n- A\n- B\n- C";
        assert_eq!(extract_followups(content, 3), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_marker_needs_following_space() {
        let content = "-A\n*B\n1.C\n";
        assert!(extract_followups(content, 3).is_empty());
    }

    #[test]
    fn test_nothing_found() {
        assert!(extract_followups("Plain prose without suggestions.", 3).is_empty());
        assert!(extract_followups("", 3).is_empty());
    }

    #[test]
    fn test_bold_text_is_not_a_list_item() {
        let content = "**Note** one\n**Note** two\n**Note** three";
        assert!(extract_followups(content, 3).is_empty());
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "```json\n[\"Q1?\",\"Q2?\",\"Q3?\"]\n```",
            "- A\n- B\n- C",
            "nothing here",
        ];
        for input in inputs {
            assert_eq!(extract_followups(input, 3), extract_followups(input, 3));
        }
    }
}
