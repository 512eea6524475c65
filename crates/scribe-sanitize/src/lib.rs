//! Ammonia-backed [`ContentSanitizer`] for the display path.
//!
//! The allow-list extends ammonia's defaults with exactly what the pipeline
//! emits: the marker attribute (`data-attachment-id`), the anchor metadata
//! attributes (`data-module`, `data-type`, `data-extension`, `download`),
//! generic `class`/`style`, and `video`/`iframe` as embeddable block
//! elements. Iframe sources are restricted to a caller-configured safe-host
//! list; everything else about the allow-list stays ammonia's business.
//!
//! Construct one per process or request scope and inject it into the viewer
//! assembler - there is no global instance.

use std::borrow::Cow;
use std::collections::HashSet;

use scribe_content::{ContentSanitizer, PurifyError};
use url::Url;

pub struct HtmlSanitizer {
    cleaner: ammonia::Builder<'static>,
}

impl HtmlSanitizer {
    /// `iframe_hosts` is the exact-match host allowlist for embedded
    /// iframes, e.g. `["www.youtube.com", "player.vimeo.com"]`. Sources on
    /// any other host (or with a non-http scheme) lose their `src`.
    pub fn new(iframe_hosts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let hosts: HashSet<String> = iframe_hosts.into_iter().map(Into::into).collect();

        let mut cleaner = ammonia::Builder::default();
        cleaner
            .strip_comments(true)
            .add_tags(["video", "iframe"])
            .add_tag_attributes("img", ["data-attachment-id"])
            .add_tag_attributes("a", ["data-attachment-id", "data-module", "download"])
            .add_tag_attributes("i", ["data-type", "data-extension"])
            .add_tag_attributes("video", ["src", "controls", "data-attachment-id"])
            .add_tag_attributes(
                "iframe",
                ["src", "width", "height", "frameborder", "allowfullscreen", "scrolling"],
            )
            .add_generic_attributes(["class", "style"])
            .attribute_filter(move |element, attribute, value| {
                if element == "iframe" && attribute == "src" && !host_allowed(value, &hosts) {
                    None
                } else {
                    Some(Cow::Borrowed(value))
                }
            });
        Self { cleaner }
    }
}

impl ContentSanitizer for HtmlSanitizer {
    fn purify(&self, html: &str) -> Result<String, PurifyError> {
        Ok(self.cleaner.clean(html).to_string())
    }
}

/// http(s) or protocol-relative, host exactly in the allowlist.
fn host_allowed(src: &str, hosts: &HashSet<String>) -> bool {
    let absolute = if let Some(rest) = src.strip_prefix("//") {
        Cow::Owned(format!("https://{rest}"))
    } else {
        Cow::Borrowed(src)
    };
    let Ok(url) = Url::parse(&absolute) else {
        return false;
    };
    matches!(url.scheme(), "http" | "https")
        && url.host_str().is_some_and(|host| hosts.contains(host))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitizer() -> HtmlSanitizer {
        HtmlSanitizer::new(["www.youtube.com"])
    }

    #[test]
    fn script_is_stripped() {
        let out = sanitizer()
            .purify("<p>hi<script>alert(1)</script></p>")
            .unwrap();
        assert!(!out.contains("script"));
        assert!(out.contains("<p>hi"));
    }

    #[test]
    fn pipeline_marker_output_survives() {
        let html = concat!(
            r#"<img src="/attachments/5/view/a.png" data-attachment-id="5" class="wide">"#,
            r#"<a href="/attachments/9/download/r.pdf" data-attachment-id="9" "#,
            r#"data-module="attachment" download="r.pdf">"#,
            r#"<i data-type="application/pdf" data-extension="pdf">pdf</i>"#,
            r#"<span>r.pdf</span><small>2.0KB</small></a>"#,
        );
        let out = sanitizer().purify(html).unwrap();
        assert!(out.contains(r#"data-attachment-id="5""#));
        assert!(out.contains(r#"data-attachment-id="9""#));
        assert!(out.contains(r#"data-module="attachment""#));
        assert!(out.contains(r#"data-extension="pdf""#));
        assert!(out.contains(r#"download="r.pdf""#));
        assert!(out.contains(r#"class="wide""#));
    }

    #[test]
    fn video_element_is_allowed() {
        let html = r#"<video src="/attachments/3/view/c.mp4" data-attachment-id="3" controls="controls"></video>"#;
        let out = sanitizer().purify(html).unwrap();
        assert!(out.contains("<video"));
        assert!(out.contains("controls"));
    }

    #[test]
    fn iframe_src_is_restricted_to_safe_hosts() {
        let ok = sanitizer()
            .purify(r#"<iframe src="https://www.youtube.com/embed/x"></iframe>"#)
            .unwrap();
        assert!(ok.contains("www.youtube.com"));

        let protocol_relative = sanitizer()
            .purify(r#"<iframe src="//www.youtube.com/embed/x"></iframe>"#)
            .unwrap();
        assert!(protocol_relative.contains("www.youtube.com"));

        let bad = sanitizer()
            .purify(r#"<iframe src="https://evil.example/x"></iframe>"#)
            .unwrap();
        assert!(!bad.contains("evil.example"));
        // the element itself survives, only the source is gone
        assert!(bad.contains("<iframe"));
    }

    #[test]
    fn event_handler_attributes_are_dropped() {
        let out = sanitizer()
            .purify(r#"<img src="/x.png" onerror="alert(1)" data-attachment-id="1">"#)
            .unwrap();
        assert!(!out.contains("onerror"));
        assert!(out.contains(r#"data-attachment-id="1""#));
    }
}
