//! Display path: stored record in, render-ready content out.
//!
//! Markers are rehydrated into full presentational elements with resolved
//! URLs; references the store no longer knows are dropped so rendered output
//! never carries a broken reference. Nothing on this path mutates the store.

use scribe_attachment::{Attachment, AttachmentId, AttachmentStore, UrlKind};
use url::Url;

use crate::error::AssembleError;
use crate::html::{element, escape_text, format_size};
use crate::resolve::ViewLookup;
use crate::sanitize::ContentSanitizer;
use crate::scanner::{Marker, MarkerKind, rewrite_markers};
use crate::types::ContentRecord;

#[derive(Clone, Copy, Debug)]
pub struct ViewerOptions {
    /// Run the sanitizer over the rewritten content as the final step.
    pub purify: bool,
    /// Keep fully qualified URLs; otherwise the site origin prefix is
    /// stripped and links render domain-relative.
    pub absolute_urls: bool,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            purify: true,
            absolute_urls: false,
        }
    }
}

pub struct ViewerAssembler<'a, S, P = ()> {
    store: &'a S,
    site_origin: Url,
    sanitizer: P,
}

impl<'a, S: AttachmentStore> ViewerAssembler<'a, S> {
    /// `site_origin` is this site's own origin; it is what gets stripped
    /// when the caller wants domain-relative output.
    pub fn new(store: &'a S, site_origin: Url) -> Self {
        Self {
            store,
            site_origin,
            sanitizer: (),
        }
    }
}

impl<'a, S: AttachmentStore, P: ContentSanitizer> ViewerAssembler<'a, S, P> {
    pub fn with_sanitizer<P2: ContentSanitizer>(self, sanitizer: P2) -> ViewerAssembler<'a, S, P2> {
        ViewerAssembler {
            store: self.store,
            site_origin: self.site_origin,
            sanitizer,
        }
    }

    /// Rehydrate a stored record for rendering.
    ///
    /// The returned attachment list is the stored list filtered to ids that
    /// actually resolved (keeping the stored order), followed by any
    /// inline-confirmed id the stored list was missing: never an id that
    /// failed resolution, never an id still genuinely referenced inline.
    #[tracing::instrument(skip_all, fields(declared = stored.attachments.len()))]
    pub fn assemble(
        &self,
        stored: &ContentRecord,
        options: &ViewerOptions,
    ) -> Result<ContentRecord, AssembleError> {
        let mut lookup = ViewLookup::new(self.store);
        let mut confirmed: Vec<AttachmentId> = Vec::new();

        let mut content = stored.content.clone();
        for kind in MarkerKind::ALL {
            content = rewrite_markers(&content, kind, |marker| {
                let Some(attachment) = lookup.get(&marker.id)? else {
                    tracing::warn!(id = %marker.id, ?kind, "dropping marker for missing attachment");
                    return Ok::<_, AssembleError>(None);
                };
                if !confirmed.contains(&marker.id) {
                    confirmed.push(marker.id.clone());
                }
                Ok(Some(presentational_marker(marker, &attachment)))
            })?;
        }

        let mut attachments: Vec<AttachmentId> = stored
            .attachments
            .iter()
            .filter(|id| confirmed.contains(id))
            .cloned()
            .collect();
        for id in &confirmed {
            if !attachments.contains(id) {
                attachments.push(id.clone());
            }
        }

        if !options.absolute_urls {
            let origin = self.site_origin.as_str().trim_end_matches('/');
            content = relativize_urls(&content, origin);
        }
        if options.purify {
            content = self.sanitizer.purify(&content)?;
        }

        Ok(ContentRecord {
            content,
            attachments,
        })
    }

    /// Convenience over a raw stored value: accepts the JSON envelope or a
    /// legacy bare HTML string (see [`ContentRecord::from_stored`]).
    pub fn assemble_stored(
        &self,
        raw: &str,
        options: &ViewerOptions,
    ) -> Result<ContentRecord, AssembleError> {
        self.assemble(&ContentRecord::from_stored(raw), options)
    }
}

/// Strip the site origin from `src`/`href` attribute values so they render
/// domain-relative. Only values that start with the origin at a path
/// boundary are rewritten; prose mentioning the origin and foreign hosts
/// that merely share it as a prefix (`https://example.test.evil.com`) are
/// left alone.
fn relativize_urls(content: &str, origin: &str) -> String {
    const PREFIXES: [&str; 4] = ["src=\"", "src='", "href=\"", "href='"];
    let mut out = String::with_capacity(content.len());
    let mut last = 0;
    let mut at = 0;
    while let Some(rel) = content[at..].find(origin) {
        let start = at + rel;
        let end = start + origin.len();
        at = end;
        if !PREFIXES.iter().any(|p| content[..start].ends_with(p)) {
            continue;
        }
        let next = content[end..].chars().next();
        // the origin must end the URL or be followed by a path boundary
        if !matches!(next, Some('/' | '?' | '#' | '"' | '\'')) {
            continue;
        }
        out.push_str(&content[last..start]);
        if next != Some('/') {
            out.push('/');
        }
        last = end;
    }
    out.push_str(&content[last..]);
    out
}

/// Full presentational element for a confirmed marker.
fn presentational_marker(marker: &Marker<'_>, attachment: &Attachment) -> String {
    let id = attachment.id.as_str();
    match marker.kind {
        MarkerKind::Image => element(
            "img",
            &[
                ("src", Some(attachment.url(UrlKind::View))),
                ("data-attachment-id", Some(id)),
                ("class", marker.class),
                ("style", marker.style),
            ],
            None,
        ),
        MarkerKind::Video => element(
            "video",
            &[
                ("src", Some(attachment.url(UrlKind::View))),
                ("data-attachment-id", Some(id)),
                ("controls", Some("controls")),
                ("class", marker.class),
                ("style", marker.style),
            ],
            Some(""),
        ),
        MarkerKind::Link => {
            let size = format_size(attachment.size);
            let body = format!(
                "{}{}{}",
                element(
                    "i",
                    &[
                        ("data-type", Some(attachment.mime.as_str())),
                        ("data-extension", Some(attachment.extension.as_str())),
                    ],
                    Some(&escape_text(&attachment.extension)),
                ),
                element("span", &[], Some(&escape_text(&attachment.name))),
                element("small", &[], Some(&escape_text(&size))),
            );
            element(
                "a",
                &[
                    ("href", Some(attachment.url(UrlKind::Download))),
                    ("data-attachment-id", Some(id)),
                    ("data-module", Some("attachment")),
                    ("download", Some(attachment.name.as_str())),
                ],
                Some(&body),
            )
        }
    }
}
