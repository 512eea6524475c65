//! Core attachment types: identifiers, ownership positions, and metadata.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Opaque attachment identifier, as issued by the attachment store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentId(SmolStr);

impl AttachmentId {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl From<&str> for AttachmentId {
    fn from(id: &str) -> Self {
        Self(SmolStr::new(id))
    }
}

impl From<String> for AttachmentId {
    fn from(id: String) -> Self {
        Self(SmolStr::new(id))
    }
}

/// The component a piece of content (or an attachment) belongs to,
/// e.g. `{ kind: "module", name: "board" }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRef {
    pub kind: SmolStr,
    pub name: SmolStr,
}

impl ComponentRef {
    pub fn new(kind: impl Into<SmolStr>, name: impl Into<SmolStr>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

/// Position identifier within a position type. Hosts use either numeric row
/// ids or string keys, so both are accepted on the wire.
///
/// Equality is exact per variant: `Number(5)` and `Text("5")` are distinct
/// positions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PositionId {
    Number(i64),
    Text(SmolStr),
}

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionId::Number(n) => write!(f, "{n}"),
            PositionId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for PositionId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for PositionId {
    fn from(id: &str) -> Self {
        Self::Text(SmolStr::new(id))
    }
}

/// Identifies *where* content lives: the owning component plus a position
/// type and id inside it (e.g. board "notice", post 731).
///
/// The save path compares an attachment's recorded position against the
/// position being saved to decide between reuse and clone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionContext {
    pub component: ComponentRef,
    pub position_type: SmolStr,
    pub position_id: PositionId,
}

impl PositionContext {
    pub fn new(
        component: ComponentRef,
        position_type: impl Into<SmolStr>,
        position_id: impl Into<PositionId>,
    ) -> Self {
        Self {
            component,
            position_type: position_type.into(),
            position_id: position_id.into(),
        }
    }
}

/// Which resolved URL of an attachment to use when rewriting a marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UrlKind {
    /// Inline display (images, video sources).
    View,
    /// File download (anchors).
    Download,
}

/// Attachment state as recorded by the store.
///
/// URLs are absolute; the display path strips the site origin again when the
/// caller asks for domain-relative output.
#[derive(Clone, Debug, PartialEq)]
pub struct Attachment {
    pub id: AttachmentId,
    /// Original file name, also used as the `download` attribute on anchors.
    pub name: String,
    /// File size in bytes.
    pub size: u64,
    /// MIME type, e.g. `application/pdf`.
    pub mime: String,
    /// Lowercased file extension without the dot.
    pub extension: String,
    /// `Some` once the attachment has been published at a position.
    pub owner: Option<PositionContext>,
    pub view_url: String,
    pub download_url: String,
}

impl Attachment {
    /// A draft attachment becomes published the moment it is claimed.
    pub fn is_published(&self) -> bool {
        self.owner.is_some()
    }

    pub fn url(&self, kind: UrlKind) -> &str {
        match kind {
            UrlKind::View => &self.view_url,
            UrlKind::Download => &self.download_url,
        }
    }
}
