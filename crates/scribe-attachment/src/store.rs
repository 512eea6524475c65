//! The storage capability the content pipeline consumes.
//!
//! Hosts implement [`AttachmentStore`] over their persistence layer; the
//! pipeline only ever reads attachment state, claims unpublished drafts, and
//! requests draft copies. All calls fail fast - there are no retries above
//! this seam.

use miette::Diagnostic;
use thiserror::Error;

use crate::types::{Attachment, AttachmentId, PositionContext};

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("attachment {id} not found")]
    #[diagnostic(code(scribe::attachment::not_found))]
    NotFound { id: AttachmentId },

    /// The conditional claim lost: the attachment is already published at a
    /// different position. With a single writer this is unreachable from the
    /// save path, which clones instead of claiming foreign attachments.
    #[error("attachment {id} is already published at another position")]
    #[diagnostic(code(scribe::attachment::claim_conflict))]
    ClaimConflict { id: AttachmentId },

    #[error("attachment store backend failure")]
    #[diagnostic(code(scribe::attachment::backend))]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Backend(err.into())
    }
}

/// Capability interface over the attachment store.
pub trait AttachmentStore {
    /// Look up an attachment by id. Unknown ids are `Ok(None)`, not errors.
    fn get(&self, id: &AttachmentId) -> Result<Option<Attachment>, StoreError>;

    /// Conditionally bind an attachment to a position.
    ///
    /// Succeeds when the attachment is unpublished (first claim) or already
    /// bound to exactly `position` (idempotent re-claim). The store must
    /// serialize concurrent first claims so at most one wins; losers get
    /// [`StoreError::ClaimConflict`].
    fn claim(&self, id: &AttachmentId, position: &PositionContext) -> Result<(), StoreError>;

    /// Copy an existing attachment's binary and metadata into a fresh
    /// unpublished draft, returning the new id. The source is untouched.
    fn create_draft_from(&self, id: &AttachmentId) -> Result<AttachmentId, StoreError>;
}

impl<T: AttachmentStore> AttachmentStore for &T {
    fn get(&self, id: &AttachmentId) -> Result<Option<Attachment>, StoreError> {
        (*self).get(id)
    }

    fn claim(&self, id: &AttachmentId, position: &PositionContext) -> Result<(), StoreError> {
        (*self).claim(id, position)
    }

    fn create_draft_from(&self, id: &AttachmentId) -> Result<AttachmentId, StoreError> {
        (*self).create_draft_from(id)
    }
}
