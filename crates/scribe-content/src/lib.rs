//! scribe-content: the bidirectional content-reference pipeline.
//!
//! Rich-text content references uploaded files through inline *markers*,
//! HTML elements carrying a `data-attachment-id` attribute. This crate
//! reconciles three pieces of truth about them - the markers themselves, the
//! explicit attachment list sent by the upload widget, and attachment
//! ownership in the store:
//!
//! - `scanner` - lazy tokenizer for the three marker families (`img`,
//!   `video`, `a`), no regex, malformed markup degrades to "no match"
//! - `resolve` - save-path ownership resolution (first claim, idempotent
//!   re-save, clone-on-foreign-reuse) and the read-only display lookup
//! - `editor` - save path: raw payload in, canonical [`ContentRecord`] out
//! - `viewer` - display path: stored record in, render-ready HTML out
//! - `sanitize` - seam to the external HTML allow-list engine
//!
//! Both assemblers are stateless across calls and never emit a dangling
//! marker: a reference that fails resolution is removed wholesale.

pub mod editor;
mod error;
mod html;
pub mod resolve;
pub mod sanitize;
pub mod scanner;
mod types;
pub mod viewer;

pub use editor::EditorAssembler;
pub use error::AssembleError;
pub use sanitize::{ContentSanitizer, PurifyError};
pub use scanner::{Marker, MarkerKind, scan};
pub use types::{ContentRecord, RichTextPayload};
pub use viewer::{ViewerAssembler, ViewerOptions};
