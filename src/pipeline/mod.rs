//! Pipeline stages for a document-chat request.
//!
//! Each submodule implements exactly one transformation step, so each can
//! be tested alone and swapped (another PDF parser, another completion
//! provider) without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ prompt ──▶ llm ──▶ followups
//! (base64)  (PDF text)  (template)  (HTTP)  (parse list)
//! ```
//!
//! 1. [`input`]      strip the data-URI prefix and base64-decode each file
//! 2. [`extract`]    pull plain text out of each PDF; runs in
//!    `spawn_blocking` because the parser is synchronous
//! 3. [`prompt`]     lay the documents out and wrap them in the tool's template
//! 4. [`llm`]        one chat-completion call; the only stage with network I/O
//! 5. [`followups`]  best-effort parse of suggested questions; never fails

pub mod extract;
pub mod followups;
pub mod input;
pub mod llm;
pub mod prompt;
