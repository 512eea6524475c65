//! Marker scanning over HTML fragments.
//!
//! A marker is an `img`, `video`, or `a` element carrying a
//! `data-attachment-id` attribute. Scanning is a pure, restartable pass over
//! the fragment with a tokenizer restricted to exactly those three shapes -
//! no backtracking, no errors. A candidate that fails the expected shape
//! (missing marker attribute, unterminated quote or tag, no closing tag for
//! the paired families) is simply not yielded and scanning resumes behind it.

use std::ops::Range;

use scribe_attachment::AttachmentId;

/// The three marker families, by tag name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Image,
    Video,
    Link,
}

impl MarkerKind {
    /// Fixed rewrite order used by both assemblers: images, then videos,
    /// then links.
    pub const ALL: [MarkerKind; 3] = [MarkerKind::Image, MarkerKind::Video, MarkerKind::Link];

    pub fn tag(self) -> &'static str {
        match self {
            MarkerKind::Image => "img",
            MarkerKind::Video => "video",
            MarkerKind::Link => "a",
        }
    }

    /// Images are matched as a lone open tag; videos and anchors as a full
    /// open/close pair whose inner content is discarded on rewrite.
    fn is_paired(self) -> bool {
        !matches!(self, MarkerKind::Image)
    }
}

/// One recognized marker, borrowing from the scanned fragment.
#[derive(Clone, Debug)]
pub struct Marker<'a> {
    pub kind: MarkerKind,
    /// The referenced attachment id, exactly as written in the markup.
    pub id: AttachmentId,
    /// Full marker text, open tag through close tag for paired kinds.
    pub raw: &'a str,
    /// Byte span of `raw` within the scanned fragment.
    pub span: Range<usize>,
    /// Passthrough presentation attributes; everything else is dropped on
    /// rewrite.
    pub class: Option<&'a str>,
    pub style: Option<&'a str>,
}

/// Scan `content` for markers of one family, in document order.
pub fn scan(content: &str, kind: MarkerKind) -> Markers<'_> {
    Markers {
        content,
        kind,
        pos: 0,
    }
}

/// Lazy marker iterator returned by [`scan`].
#[derive(Debug)]
pub struct Markers<'a> {
    content: &'a str,
    kind: MarkerKind,
    pos: usize,
}

impl<'a> Iterator for Markers<'a> {
    type Item = Marker<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.content.len() {
            let rel = self.content[self.pos..].find('<')?;
            let start = self.pos + rel;
            // resume just past this '<' when the candidate does not pan out
            self.pos = start + 1;
            let Some(open) = OpenTag::parse(&self.content[start..], self.kind.tag()) else {
                continue;
            };
            // a well-formed tag of this family: skip it entirely next round
            self.pos = start + open.len;
            let Some(id) = open.attachment_id else {
                continue;
            };
            let end = if self.kind.is_paired() {
                match find_close(&self.content[start + open.len..], self.kind.tag()) {
                    Some(rel_end) => start + open.len + rel_end,
                    None => continue,
                }
            } else {
                start + open.len
            };
            self.pos = end;
            return Some(Marker {
                kind: self.kind,
                id: AttachmentId::from(id),
                raw: &self.content[start..end],
                span: start..end,
                class: open.class,
                style: open.style,
            });
        }
        None
    }
}

/// Walk the markers of one family in document order and splice the
/// replacement `f` returns into a fresh string; `Ok(None)` removes the
/// marker text entirely. Shared by the save and display assemblers so the
/// two paths cannot drift in how they treat markup.
pub(crate) fn rewrite_markers<E>(
    content: &str,
    kind: MarkerKind,
    mut f: impl FnMut(&Marker<'_>) -> Result<Option<String>, E>,
) -> Result<String, E> {
    let mut out = String::with_capacity(content.len());
    let mut last = 0;
    for marker in scan(content, kind) {
        out.push_str(&content[last..marker.span.start]);
        if let Some(replacement) = f(&marker)? {
            out.push_str(&replacement);
        }
        last = marker.span.end;
    }
    out.push_str(&content[last..]);
    Ok(out)
}

/// A parsed open tag of the family being scanned.
struct OpenTag<'a> {
    /// Byte length of the open tag, `<` through `>`.
    len: usize,
    attachment_id: Option<&'a str>,
    class: Option<&'a str>,
    style: Option<&'a str>,
}

impl<'a> OpenTag<'a> {
    /// Parse an open tag at the start of `s` (which begins with `<`).
    /// Returns `None` unless it is a complete tag named `tag`.
    fn parse(s: &'a str, tag: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        let name_end = 1 + tag.len();
        if !s.get(1..name_end)?.eq_ignore_ascii_case(tag) {
            return None;
        }
        // the name must end here, otherwise `<a` would also match `<abbr>`
        match bytes.get(name_end) {
            Some(b'>') | Some(b'/') => {}
            Some(c) if c.is_ascii_whitespace() => {}
            _ => return None,
        }

        let mut at = name_end;
        let mut attachment_id = None;
        let mut class = None;
        let mut style = None;
        loop {
            while at < bytes.len() && bytes[at].is_ascii_whitespace() {
                at += 1;
            }
            match bytes.get(at) {
                // ran off the end before '>': not a tag
                None => return None,
                Some(b'>') => {
                    return Some(OpenTag {
                        len: at + 1,
                        attachment_id,
                        class,
                        style,
                    });
                }
                Some(b'/') => {
                    at += 1;
                    while at < bytes.len() && bytes[at].is_ascii_whitespace() {
                        at += 1;
                    }
                    if bytes.get(at) != Some(&b'>') {
                        return None;
                    }
                    return Some(OpenTag {
                        len: at + 1,
                        attachment_id,
                        class,
                        style,
                    });
                }
                _ => {}
            }

            let name_start = at;
            while at < bytes.len()
                && !bytes[at].is_ascii_whitespace()
                && !matches!(bytes[at], b'=' | b'>' | b'/')
            {
                at += 1;
            }
            if at == name_start {
                // stray byte where an attribute name should be
                return None;
            }
            let name = &s[name_start..at];

            while at < bytes.len() && bytes[at].is_ascii_whitespace() {
                at += 1;
            }
            let value = if bytes.get(at) == Some(&b'=') {
                at += 1;
                while at < bytes.len() && bytes[at].is_ascii_whitespace() {
                    at += 1;
                }
                match bytes.get(at).copied() {
                    Some(q @ (b'"' | b'\'')) => {
                        at += 1;
                        let value_start = at;
                        // quoted values may contain '>'
                        let rel = s[at..].find(q as char)?;
                        at = value_start + rel;
                        let value = &s[value_start..at];
                        at += 1;
                        Some(value)
                    }
                    _ => {
                        let value_start = at;
                        while at < bytes.len()
                            && !bytes[at].is_ascii_whitespace()
                            && !matches!(bytes[at], b'>' | b'/')
                        {
                            at += 1;
                        }
                        Some(&s[value_start..at])
                    }
                }
            } else {
                None
            };

            if let Some(value) = value {
                if name.eq_ignore_ascii_case("data-attachment-id") {
                    attachment_id.get_or_insert(value);
                } else if name.eq_ignore_ascii_case("class") {
                    class.get_or_insert(value);
                } else if name.eq_ignore_ascii_case("style") {
                    style.get_or_insert(value);
                }
            }
        }
    }
}

/// Find the first `</tag>` in `s`, returning the byte offset just past its
/// `>`. Nested elements of the same name are not balanced; the original
/// markers never nest and their inner content is discarded anyway.
fn find_close(s: &str, tag: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut at = 0;
    loop {
        let rel = s[at..].find('<')?;
        let open = at + rel;
        at = open + 1;
        if s.get(open + 1..open + 2) != Some("/") {
            continue;
        }
        let name_end = open + 2 + tag.len();
        let Some(name) = s.get(open + 2..name_end) else {
            continue;
        };
        if !name.eq_ignore_ascii_case(tag) {
            continue;
        }
        let mut j = name_end;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if bytes.get(j) == Some(&b'>') {
            return Some(j + 1);
        }
    }
}
