//! Save path: raw editor payload in, canonical [`ContentRecord`] out.
//!
//! Markers are rewritten down to their storable minimum (id plus passthrough
//! `class`/`style`); presentation is recomputed on every display so stored
//! content stays faithful to the author's structural intent. No sanitization
//! happens here for the same reason.

use std::collections::HashSet;

use scribe_attachment::{AttachmentId, AttachmentStore, PositionContext};

use crate::error::AssembleError;
use crate::html::element;
use crate::resolve::SaveResolver;
use crate::scanner::{Marker, MarkerKind, rewrite_markers};
use crate::types::{ContentRecord, RichTextPayload};

pub struct EditorAssembler<'a, S> {
    store: &'a S,
    position: PositionContext,
}

impl<'a, S: AttachmentStore> EditorAssembler<'a, S> {
    /// `position` identifies where the content is being saved; it drives the
    /// reuse-vs-clone decision for every referenced attachment.
    pub fn new(store: &'a S, position: PositionContext) -> Self {
        Self { store, position }
    }

    /// Produce the storable record for one save action.
    ///
    /// Passes run image, then video, then link. Each marker's original id
    /// goes into the `exists` set; resolution failures remove the marker
    /// text, successes re-emit the minimal element and collect the resolved
    /// id in first-seen order (deduplicated). Explicit payload attachments
    /// neither referenced inline nor already collected are appended last.
    ///
    /// Store failures abort the whole call - partially rewritten content is
    /// never returned.
    #[tracing::instrument(skip_all, fields(explicit = payload.attachments.len()))]
    pub fn assemble(&self, payload: &RichTextPayload) -> Result<ContentRecord, AssembleError> {
        let mut resolver = SaveResolver::new(self.store, &self.position);
        let mut exists: HashSet<AttachmentId> = HashSet::new();
        let mut attachments: Vec<AttachmentId> = Vec::new();

        let mut content = payload.content.clone();
        for kind in MarkerKind::ALL {
            content = rewrite_markers(&content, kind, |marker| {
                exists.insert(marker.id.clone());
                let Some(resolved) = resolver.resolve(&marker.id)? else {
                    tracing::warn!(id = %marker.id, ?kind, "dropping marker for unknown attachment");
                    return Ok::<_, AssembleError>(None);
                };
                if !attachments.contains(&resolved) {
                    attachments.push(resolved.clone());
                }
                Ok(Some(storable_marker(marker, &resolved)))
            })?;
        }

        for id in &payload.attachments {
            if !exists.contains(id) && !attachments.contains(id) {
                attachments.push(id.clone());
            }
        }

        Ok(ContentRecord {
            content,
            attachments,
        })
    }
}

/// The minimal storable element for a resolved marker. Anchors lose their
/// body and every attribute; the display path re-renders the full
/// presentation from store metadata.
fn storable_marker(marker: &Marker<'_>, id: &AttachmentId) -> String {
    match marker.kind {
        MarkerKind::Image => element(
            "img",
            &[
                ("data-attachment-id", Some(id.as_str())),
                ("class", marker.class),
                ("style", marker.style),
            ],
            None,
        ),
        MarkerKind::Video => element(
            "video",
            &[
                ("data-attachment-id", Some(id.as_str())),
                ("class", marker.class),
                ("style", marker.style),
            ],
            Some(""),
        ),
        MarkerKind::Link => element("a", &[("data-attachment-id", Some(id.as_str()))], Some("")),
    }
}
