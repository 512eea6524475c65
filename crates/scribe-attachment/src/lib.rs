//! Attachment domain types and the storage capability consumed by the
//! content pipeline.
//!
//! This crate provides:
//! - `AttachmentId`, `Attachment`, `PositionContext` - the ownership model
//! - `AttachmentStore` - the capability trait a host's persistence layer implements
//! - `MemoryAttachmentStore` - a DashMap-backed reference store used in tests
//!
//! An attachment is *published* once it is bound to a position (a component
//! plus a position type/id). The store guarantees at most one successful
//! first claim per attachment; everything above this crate builds on that.

pub mod memory;
mod store;
mod types;

pub use memory::MemoryAttachmentStore;
pub use store::{AttachmentStore, StoreError};
pub use types::{Attachment, AttachmentId, ComponentRef, PositionContext, PositionId, UrlKind};
