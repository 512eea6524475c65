//! In-memory attachment store.
//!
//! Reference implementation of [`AttachmentStore`] backed by a `DashMap`.
//! Claims are atomic per attachment (DashMap holds the shard lock for the
//! duration of the conditional update), which is exactly the at-most-one
//! first-publish guarantee the pipeline requires from a real store.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use url::Url;

use crate::store::{AttachmentStore, StoreError};
use crate::types::{Attachment, AttachmentId, PositionContext};

pub struct MemoryAttachmentStore {
    base: Url,
    items: DashMap<AttachmentId, Attachment>,
    next_draft: AtomicU64,
}

impl MemoryAttachmentStore {
    /// `base` is the origin attachment URLs are served from,
    /// e.g. `https://example.test`.
    pub fn new(base: Url) -> Self {
        Self {
            base,
            items: DashMap::new(),
            next_draft: AtomicU64::new(1),
        }
    }

    pub fn insert(&self, attachment: Attachment) {
        self.items.insert(attachment.id.clone(), attachment);
    }

    /// Register an unpublished draft with synthesized URLs, returning its id.
    pub fn add_draft(
        &self,
        id: impl Into<AttachmentId>,
        name: &str,
        size: u64,
        mime: &str,
    ) -> AttachmentId {
        let id = id.into();
        let attachment = self.build(id.clone(), name.to_owned(), size, mime.to_owned());
        self.items.insert(id.clone(), attachment);
        id
    }

    fn build(&self, id: AttachmentId, name: String, size: u64, mime: String) -> Attachment {
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let base = self.base.as_str().trim_end_matches('/');
        Attachment {
            view_url: format!("{base}/attachments/{id}/view/{name}"),
            download_url: format!("{base}/attachments/{id}/download/{name}"),
            id,
            name,
            size,
            mime,
            extension,
            owner: None,
        }
    }
}

impl AttachmentStore for MemoryAttachmentStore {
    fn get(&self, id: &AttachmentId) -> Result<Option<Attachment>, StoreError> {
        Ok(self.items.get(id).map(|entry| entry.value().clone()))
    }

    fn claim(&self, id: &AttachmentId, position: &PositionContext) -> Result<(), StoreError> {
        let Some(mut entry) = self.items.get_mut(id) else {
            return Err(StoreError::NotFound { id: id.clone() });
        };
        match &entry.owner {
            None => {
                entry.owner = Some(position.clone());
                Ok(())
            }
            Some(owner) if owner == position => Ok(()),
            Some(_) => Err(StoreError::ClaimConflict { id: id.clone() }),
        }
    }

    fn create_draft_from(&self, id: &AttachmentId) -> Result<AttachmentId, StoreError> {
        let Some(source) = self.items.get(id).map(|entry| entry.value().clone()) else {
            return Err(StoreError::NotFound { id: id.clone() });
        };
        let n = self.next_draft.fetch_add(1, Ordering::Relaxed);
        let draft_id = AttachmentId::new(format!("{}-draft{n}", source.id));
        tracing::debug!(source = %source.id, draft = %draft_id, "copied attachment into new draft");
        let draft = self.build(draft_id.clone(), source.name, source.size, source.mime);
        self.items.insert(draft_id.clone(), draft);
        Ok(draft_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ComponentRef;

    fn store() -> MemoryAttachmentStore {
        MemoryAttachmentStore::new(Url::parse("https://example.test").unwrap())
    }

    fn position(id: i64) -> PositionContext {
        PositionContext::new(ComponentRef::new("module", "board"), "post", id)
    }

    #[test]
    fn get_unknown_id_is_none() {
        assert_eq!(store().get(&"missing".into()).unwrap(), None);
    }

    #[test]
    fn first_claim_publishes() {
        let store = store();
        let id = store.add_draft("5", "photo.jpg", 2048, "image/jpeg");
        assert!(!store.get(&id).unwrap().unwrap().is_published());

        store.claim(&id, &position(1)).unwrap();
        let claimed = store.get(&id).unwrap().unwrap();
        assert_eq!(claimed.owner, Some(position(1)));
    }

    #[test]
    fn reclaim_at_same_position_is_idempotent() {
        let store = store();
        let id = store.add_draft("5", "photo.jpg", 2048, "image/jpeg");
        store.claim(&id, &position(1)).unwrap();
        store.claim(&id, &position(1)).unwrap();
        assert_eq!(store.get(&id).unwrap().unwrap().owner, Some(position(1)));
    }

    #[test]
    fn claim_at_foreign_position_conflicts() {
        let store = store();
        let id = store.add_draft("5", "photo.jpg", 2048, "image/jpeg");
        store.claim(&id, &position(1)).unwrap();
        let err = store.claim(&id, &position(2)).unwrap_err();
        assert!(matches!(err, StoreError::ClaimConflict { .. }));
        // loser must not have altered ownership
        assert_eq!(store.get(&id).unwrap().unwrap().owner, Some(position(1)));
    }

    #[test]
    fn draft_copy_gets_fresh_unpublished_id() {
        let store = store();
        let id = store.add_draft("5", "report.pdf", 4096, "application/pdf");
        store.claim(&id, &position(1)).unwrap();

        let copy_id = store.create_draft_from(&id).unwrap();
        assert_ne!(copy_id, id);

        let copy = store.get(&copy_id).unwrap().unwrap();
        assert!(!copy.is_published());
        assert_eq!(copy.name, "report.pdf");
        assert_eq!(copy.size, 4096);
        assert_eq!(copy.mime, "application/pdf");
        assert_eq!(copy.extension, "pdf");
        // source untouched
        assert_eq!(store.get(&id).unwrap().unwrap().owner, Some(position(1)));
    }

    #[test]
    fn urls_are_absolute_under_base() {
        let store = store();
        let id = store.add_draft("5", "photo.jpg", 2048, "image/jpeg");
        let attachment = store.get(&id).unwrap().unwrap();
        assert_eq!(
            attachment.view_url,
            "https://example.test/attachments/5/view/photo.jpg"
        );
        assert_eq!(
            attachment.download_url,
            "https://example.test/attachments/5/download/photo.jpg"
        );
    }
}
