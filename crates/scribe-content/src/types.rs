//! Payload and record types flowing through the pipeline.

use serde::{Deserialize, Serialize};

use scribe_attachment::AttachmentId;

/// What the editor UI hands to the save path: the fragment as authored plus
/// the explicit attachment list from the upload widget (independent of what
/// is referenced inline). Consumed once per save.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RichTextPayload {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<AttachmentId>,
}

impl RichTextPayload {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachments(
        content: impl Into<String>,
        attachments: impl IntoIterator<Item = AttachmentId>,
    ) -> Self {
        Self {
            content: content.into(),
            attachments: attachments.into_iter().collect(),
        }
    }
}

/// The canonical storable unit: processed content plus the deduplicated
/// attachment list, inline references first in document order, then explicit
/// attachments that are not referenced inline.
///
/// Every `data-attachment-id` marker left in `content` has a matching entry
/// in `attachments`; markers that failed resolution were removed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<AttachmentId>,
}

impl ContentRecord {
    pub fn new(
        content: impl Into<String>,
        attachments: impl IntoIterator<Item = AttachmentId>,
    ) -> Self {
        Self {
            content: content.into(),
            attachments: attachments.into_iter().collect(),
        }
    }

    /// Parse a stored value. A JSON object with a `content` key is the
    /// canonical envelope; anything else (legacy bare HTML, or JSON without
    /// `content`) is treated as a record with that exact text and no
    /// attachments. There is no schema version field - this structural
    /// sniffing is the migration path for legacy rows.
    pub fn from_stored(raw: &str) -> Self {
        match serde_json::from_str::<ContentRecord>(raw) {
            Ok(record) => record,
            Err(_) => ContentRecord {
                content: raw.to_owned(),
                attachments: Vec::new(),
            },
        }
    }

    /// Serialize to the stored JSON envelope.
    pub fn to_stored(&self) -> String {
        serde_json::json!({
            "content": self.content,
            "attachments": self.attachments,
        })
        .to_string()
    }

    /// Re-edit round trip: a stored record is a valid editor payload.
    pub fn into_payload(self) -> RichTextPayload {
        RichTextPayload {
            content: self.content,
            attachments: self.attachments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_envelope_round_trips() {
        let record = ContentRecord::new("<p>hi</p>", [AttachmentId::from("5")]);
        let stored = record.to_stored();
        assert_eq!(ContentRecord::from_stored(&stored), record);
    }

    #[test]
    fn bare_string_is_back_compat_record() {
        let record = ContentRecord::from_stored("<p>hello</p>");
        assert_eq!(record.content, "<p>hello</p>");
        assert!(record.attachments.is_empty());
    }

    #[test]
    fn json_without_content_key_is_treated_as_bare() {
        let raw = r#"{"attachments":["5"]}"#;
        let record = ContentRecord::from_stored(raw);
        assert_eq!(record.content, raw);
        assert!(record.attachments.is_empty());
    }

    #[test]
    fn missing_attachments_defaults_to_empty() {
        let record = ContentRecord::from_stored(r#"{"content":"<p>x</p>"}"#);
        assert_eq!(record.content, "<p>x</p>");
        assert!(record.attachments.is_empty());
    }

    #[test]
    fn non_object_json_is_treated_as_bare() {
        let record = ContentRecord::from_stored("\"quoted\"");
        assert_eq!(record.content, "\"quoted\"");
    }
}
