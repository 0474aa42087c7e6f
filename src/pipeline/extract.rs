//! Text extraction: PDF bytes → normalised plain text.
//!
//! ## Why spawn_blocking?
//!
//! `pdf-extract` is synchronous and CPU-bound; a 200-page contract can take
//! a noticeable fraction of a second to decode. Running it on Tokio's
//! blocking pool keeps the async workers free to serve other requests, and
//! lets several uploaded files be parsed at the same time.
//!
//! The parser is reached through the [`TextExtractor`] trait so the
//! orchestrator can be exercised with fakes. A parser panic is caught at
//! the task boundary and reported like any other parse failure.

use crate::error::ChatError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// A decoded document's text, tagged with the name it was uploaded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub filename: String,
    pub text: String,
}

/// Something that turns PDF bytes into plain text.
///
/// Implementations are called from a blocking thread and may take as long
/// as they need. Errors are the parser's own message.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, String>;
}

/// Default extractor backed by `pdf-extract`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

/// How far into the file the `%PDF` header may start.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Offset of the `%PDF` header within the first [`HEADER_SEARCH_WINDOW`]
/// bytes. Readers tolerate junk before it, and so do we.
fn pdf_header_offset(bytes: &[u8]) -> Option<usize> {
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW + 4)];
    window.windows(4).position(|w| w == b"%PDF")
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, String> {
        let Some(offset) = pdf_header_offset(bytes) else {
            let head = &bytes[..bytes.len().min(8)];
            return Err(format!(
                "not a PDF (first bytes: {:?})",
                String::from_utf8_lossy(head)
            ));
        };
        // Cross-reference offsets count from the header, not the file start.
        pdf_extract::extract_text_from_mem(&bytes[offset..]).map_err(|e| e.to_string())
    }
}

/// Extract and normalise one document.
///
/// Runs the parser on the blocking pool. `max_chars` truncates the
/// normalised text on a character boundary.
pub async fn extract_document(
    extractor: Arc<dyn TextExtractor>,
    filename: String,
    bytes: Vec<u8>,
    max_chars: Option<usize>,
) -> Result<ExtractedDocument, ChatError> {
    let start = Instant::now();
    let size = bytes.len();

    let raw = tokio::task::spawn_blocking(move || extractor.extract(&bytes))
        .await
        .map_err(|e| ChatError::Extraction {
            filename: filename.clone(),
            detail: if e.is_panic() {
                "PDF parser panicked on this document".to_string()
            } else {
                e.to_string()
            },
        })?
        .map_err(|detail| ChatError::Extraction {
            filename: filename.clone(),
            detail,
        })?;

    let mut text = normalise_text(&raw);
    if let Some(max) = max_chars {
        truncate_chars(&mut text, max);
    }

    debug!(
        "Extracted '{}': {} bytes → {} chars in {:?}",
        filename,
        size,
        text.chars().count(),
        start.elapsed()
    );

    Ok(ExtractedDocument { filename, text })
}

// ── Normalisation ────────────────────────────────────────────────────────────

static RE_BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*){2,}").unwrap());

/// Clean parser output for prompting.
///
/// Normalises line endings and page breaks, drops invisible Unicode that
/// PDFs often carry (zero-width spaces, BOMs, soft hyphens), collapses long
/// runs of blank lines to one, and trims the ends.
pub fn normalise_text(input: &str) -> String {
    let s = input
        .replace("\r\n", "\n")
        .replace(['\r', '\x0C'], "\n")
        .replace(
            [
                '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
            ],
            "",
        );
    RE_BLANK_RUNS.replace_all(&s, "\n\n").trim().to_string()
}

fn truncate_chars(text: &mut String, max: usize) {
    if let Some((idx, _)) = text.char_indices().nth(max) {
        text.truncate(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    impl TextExtractor for Fixed {
        fn extract(&self, _bytes: &[u8]) -> Result<String, String> {
            Ok(self.0.to_string())
        }
    }

    struct Panicky;

    impl TextExtractor for Panicky {
        fn extract(&self, _bytes: &[u8]) -> Result<String, String> {
            panic!("malformed xref stream")
        }
    }

    /// Build a one-page PDF whose only content is `text` in Courier.
    ///
    /// Same fixture as `pdf_with_text` in `tests/api.rs`; keep them in step.
    fn tiny_pdf(text: &str) -> Vec<u8> {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Document, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn normalises_whitespace_and_invisibles() {
        let raw = "\u{FEFF}\r\n  Lease\u{200B} Agreement\r\n\n\n\n\nTerm: 12\u{00AD} months\x0C\n  ";
        assert_eq!(normalise_text(raw), "Lease Agreement\n\nTerm: 12 months");
    }

    #[test]
    fn keeps_single_blank_lines() {
        assert_eq!(normalise_text("a\n\nb\nc"), "a\n\nb\nc");
    }

    #[test]
    fn truncates_on_char_boundary() {
        let mut s = "déjà vu".to_string();
        truncate_chars(&mut s, 4);
        assert_eq!(s, "déjà");
        let mut short = "ok".to_string();
        truncate_chars(&mut short, 10);
        assert_eq!(short, "ok");
    }

    #[test]
    fn rejects_non_pdf_bytes() {
        let err = PdfTextExtractor.extract(b"<html>nope</html>").unwrap_err();
        assert!(err.contains("not a PDF"), "got: {err}");
    }

    #[test]
    fn finds_header_after_leading_junk() {
        assert_eq!(pdf_header_offset(b"%PDF-1.7"), Some(0));
        assert_eq!(pdf_header_offset(b"\r\n\xEF\xBB\xBF%PDF-1.4"), Some(5));
        let mut late = vec![b' '; HEADER_SEARCH_WINDOW];
        late.extend_from_slice(b"%PDF-1.4");
        assert_eq!(pdf_header_offset(&late), Some(HEADER_SEARCH_WINDOW));
        late.insert(0, b' ');
        assert_eq!(pdf_header_offset(&late), None);
    }

    #[test]
    fn extracts_text_after_leading_junk() {
        let mut bytes = b"HTTP/1.1 junk\r\n\r\n".to_vec();
        bytes.extend_from_slice(&tiny_pdf("Prefixed Lease"));
        let text = PdfTextExtractor.extract(&bytes).expect("valid PDF after junk");
        assert!(text.contains("Prefixed"), "got: {text:?}");
    }

    #[tokio::test]
    async fn corrupt_pdf_is_an_error_not_a_crash() {
        // "%PDF-1" followed by nothing a parser can use.
        let err = extract_document(
            Arc::new(PdfTextExtractor),
            "corrupt.pdf".into(),
            b"%PDF-1\x00\x01garbage".to_vec(),
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ChatError::Extraction { .. }), "got: {err:?}");
    }

    #[test]
    fn extracts_text_from_generated_pdf() {
        let bytes = tiny_pdf("Hello Lease");
        let text = PdfTextExtractor.extract(&bytes).expect("valid PDF");
        assert!(text.contains("Hello"), "got: {text:?}");
        assert!(text.contains("Lease"), "got: {text:?}");
    }

    #[tokio::test]
    async fn extract_document_normalises_and_keeps_name() {
        let doc = extract_document(
            Arc::new(Fixed("  body text \n\n\n\n")),
            "a.pdf".into(),
            b"%PDF".to_vec(),
            None,
        )
        .await
        .unwrap();
        assert_eq!(doc.filename, "a.pdf");
        assert_eq!(doc.text, "body text");
    }

    #[tokio::test]
    async fn extract_document_applies_char_cap() {
        let doc = extract_document(
            Arc::new(Fixed("0123456789")),
            "a.pdf".into(),
            b"%PDF".to_vec(),
            Some(4),
        )
        .await
        .unwrap();
        assert_eq!(doc.text, "0123");
    }

    #[tokio::test]
    async fn parser_panic_becomes_extraction_error() {
        let err = extract_document(Arc::new(Panicky), "boom.pdf".into(), vec![1, 2, 3], None)
            .await
            .unwrap_err();
        match err {
            ChatError::Extraction { filename, detail } => {
                assert_eq!(filename, "boom.pdf");
                assert!(detail.contains("panicked"), "got: {detail}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
