//! Input decoding: caller-supplied `file_data` strings → raw PDF bytes.
//!
//! Browsers hand us `FileReader.readAsDataURL` output
//! (`data:application/pdf;base64,JVBERi0x...`), while scripted clients
//! usually send bare base64. Both are accepted. Decoding happens before any
//! extraction starts, so a request with one undecodable file is rejected as
//! a bad request without parsing the others.

use crate::error::ChatError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

/// Check if the payload carries a data-URI prefix.
pub fn is_data_uri(input: &str) -> bool {
    input.trim_start().starts_with("data:")
}

/// Remove a `data:<mime>;base64,` prefix, if present.
///
/// Anything up to and including the first comma is dropped when the string
/// is a data URI. Bare base64 never contains a comma, so it passes through
/// untouched.
pub fn strip_data_uri(input: &str) -> &str {
    let input = input.trim();
    if is_data_uri(input) {
        input.split_once(',').map(|(_, b64)| b64).unwrap_or("")
    } else {
        input
    }
}

/// Decode one file's `file_data` into bytes.
///
/// Whitespace inside the base64 (line-wrapped payloads) is ignored.
pub fn decode_file_data(filename: &str, file_data: &str) -> Result<Vec<u8>, ChatError> {
    let b64: String = strip_data_uri(file_data)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = STANDARD
        .decode(b64.as_bytes())
        .map_err(|e| ChatError::InvalidFileData {
            filename: filename.to_string(),
            detail: e.to_string(),
        })?;

    if bytes.is_empty() {
        return Err(ChatError::InvalidFileData {
            filename: filename.to_string(),
            detail: "file is empty".to_string(),
        });
    }

    debug!("Decoded '{}': {} bytes", filename, bytes.len());
    Ok(bytes)
}

/// Encode bytes as a data URI, the way browser clients send files.
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}
