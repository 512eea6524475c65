//! Seam to the external HTML allow-list engine.
//!
//! The pipeline never second-guesses the sanitizer: when purification is
//! requested it runs as the very last step, over markup the pipeline itself
//! emitted, and a rejection fails the whole assembly.
//!
//! Implementations are provided by the consuming application (the
//! `scribe-sanitize` crate ships an ammonia-backed one).

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
#[error("sanitizer rejected content: {reason}")]
#[diagnostic(code(scribe::content::purify))]
pub struct PurifyError {
    pub reason: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl PurifyError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            source: None,
        }
    }

    pub fn with_source(
        reason: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            reason: reason.into(),
            source: Some(source.into()),
        }
    }
}

/// Applies an externally configured allow-list to an HTML fragment.
pub trait ContentSanitizer {
    fn purify(&self, html: &str) -> Result<String, PurifyError>;
}

/// Unit type implementation - passthrough, no sanitization.
impl ContentSanitizer for () {
    fn purify(&self, html: &str) -> Result<String, PurifyError> {
        Ok(html.to_owned())
    }
}

impl<T: ContentSanitizer> ContentSanitizer for &T {
    fn purify(&self, html: &str) -> Result<String, PurifyError> {
        (*self).purify(html)
    }
}

impl<T: ContentSanitizer> ContentSanitizer for Option<T> {
    fn purify(&self, html: &str) -> Result<String, PurifyError> {
        match self {
            Some(sanitizer) => sanitizer.purify(html),
            None => Ok(html.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upcase;

    impl ContentSanitizer for Upcase {
        fn purify(&self, html: &str) -> Result<String, PurifyError> {
            Ok(html.to_ascii_uppercase())
        }
    }

    #[test]
    fn unit_and_none_pass_through() {
        assert_eq!(().purify("<p>x</p>").unwrap(), "<p>x</p>");
        let none: Option<Upcase> = None;
        assert_eq!(none.purify("<p>x</p>").unwrap(), "<p>x</p>");
    }

    #[test]
    fn some_delegates() {
        assert_eq!(Some(Upcase).purify("abc").unwrap(), "ABC");
        assert_eq!((&Upcase).purify("abc").unwrap(), "ABC");
    }
}
