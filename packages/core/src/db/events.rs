//! Domain Events for Content Trees
//!
//! Every committed write batch is announced as a sequence of
//! [`ContentEvent`]s on a tokio broadcast channel, so other parts of an
//! application (cache invalidation, live previews) can follow tree changes
//! without coupling to the store.
//!
//! # Event Flow
//!
//! 1. A service builds a `WriteBatch` for one logical mutation
//! 2. The store commits the batch atomically
//! 3. One event per write is broadcast, in batch order
//! 4. Subscribers that lag behind lose the oldest events (broadcast semantics)

use crate::db::content_store::{WriteBatch, WriteOp};
use crate::models::{Content, ContentId, Property, PropertyId};

/// Domain events emitted after a write batch commits
#[derive(Debug, Clone, PartialEq)]
pub enum ContentEvent {
    /// A content node was created or updated
    ContentUpserted(Content),

    /// A content node was deleted (or was already gone)
    ContentDeleted { id: ContentId },

    /// A property was created or updated
    PropertyUpserted(Property),

    /// A property was deleted (or was already gone)
    PropertyDeleted { id: PropertyId },
}

impl ContentEvent {
    /// Short event name, handy for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            ContentEvent::ContentUpserted(_) => "content_upserted",
            ContentEvent::ContentDeleted { .. } => "content_deleted",
            ContentEvent::PropertyUpserted(_) => "property_upserted",
            ContentEvent::PropertyDeleted { .. } => "property_deleted",
        }
    }

    /// Events describing `batch`, in write order
    pub fn from_batch(batch: &WriteBatch) -> Vec<ContentEvent> {
        batch.ops().iter().map(ContentEvent::from).collect()
    }
}

impl From<&WriteOp> for ContentEvent {
    fn from(op: &WriteOp) -> Self {
        match op {
            WriteOp::UpsertContent(content) => ContentEvent::ContentUpserted(content.clone()),
            WriteOp::DeleteContent(id) => ContentEvent::ContentDeleted { id: *id },
            WriteOp::UpsertProperty(property) => ContentEvent::PropertyUpserted(property.clone()),
            WriteOp::DeleteProperty(id) => ContentEvent::PropertyDeleted { id: *id },
        }
    }
}
