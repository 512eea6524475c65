//! Ownership resolution for marker references.
//!
//! The save path may mutate the store (claim, clone); the display path never
//! does. Both memoize per assembly call only, so repeated markers for one id
//! inside a document resolve identically and touch the store at most once,
//! while later assemblies always observe fresh store state.

use std::collections::HashMap;

use scribe_attachment::{Attachment, AttachmentId, AttachmentStore, PositionContext, StoreError};

/// Save-path resolver: decides reuse vs. clone for each referenced id.
pub struct SaveResolver<'a, S> {
    store: &'a S,
    position: &'a PositionContext,
    memo: HashMap<AttachmentId, Option<AttachmentId>>,
}

impl<'a, S: AttachmentStore> SaveResolver<'a, S> {
    pub fn new(store: &'a S, position: &'a PositionContext) -> Self {
        Self {
            store,
            position,
            memo: HashMap::new(),
        }
    }

    /// Resolve one referenced id to the id the saved content should carry.
    ///
    /// - unknown id: `None`, the caller drops the marker
    /// - unpublished: claimed for this position, same id
    /// - published here: same id, no store mutation
    /// - published elsewhere: cloned into a fresh draft claimed for this
    ///   position; the original and its owner are untouched
    pub fn resolve(&mut self, id: &AttachmentId) -> Result<Option<AttachmentId>, StoreError> {
        if let Some(hit) = self.memo.get(id) {
            return Ok(hit.clone());
        }
        let outcome = self.resolve_uncached(id)?;
        self.memo.insert(id.clone(), outcome.clone());
        Ok(outcome)
    }

    fn resolve_uncached(&self, id: &AttachmentId) -> Result<Option<AttachmentId>, StoreError> {
        let Some(attachment) = self.store.get(id)? else {
            return Ok(None);
        };
        match &attachment.owner {
            None => {
                self.store.claim(id, self.position)?;
                Ok(Some(id.clone()))
            }
            Some(owner) if owner == self.position => Ok(Some(id.clone())),
            Some(owner) => {
                tracing::debug!(
                    id = %id,
                    owner_position = %owner.position_id,
                    "attachment published elsewhere, cloning into new draft"
                );
                let clone_id = self.store.create_draft_from(id)?;
                self.store.claim(&clone_id, self.position)?;
                Ok(Some(clone_id))
            }
        }
    }
}

/// Display-path lookup: read-only, memoized per assembly.
pub struct ViewLookup<'a, S> {
    store: &'a S,
    memo: HashMap<AttachmentId, Option<Attachment>>,
}

impl<'a, S: AttachmentStore> ViewLookup<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            memo: HashMap::new(),
        }
    }

    pub fn get(&mut self, id: &AttachmentId) -> Result<Option<Attachment>, StoreError> {
        if let Some(hit) = self.memo.get(id) {
            return Ok(hit.clone());
        }
        let fetched = self.store.get(id)?;
        self.memo.insert(id.clone(), fetched.clone());
        Ok(fetched)
    }
}
