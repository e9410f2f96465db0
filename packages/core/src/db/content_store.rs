//! ContentStore Trait - Persistence Abstraction
//!
//! The `ContentStore` trait is the seam between the tree services and the
//! database. It knows nothing about trees: it stores two record kinds,
//! answers predicate queries, and applies write batches atomically.
//!
//! # Atomic Writes
//!
//! Every logical tree mutation (for example "create child node, create the
//! property pointing at it, append the property id to the parent") is
//! expressed as one [`WriteBatch`]. Implementations must apply a batch
//! all-or-nothing so a failure mid-way cannot leave a dangling reference or
//! an orphaned child.
//!
//! # Idempotent Deletes
//!
//! Deleting a row that no longer exists is a no-op, not an error. This keeps
//! concurrent garbage collection passes over the same tree safe.

use crate::db::error::DatabaseError;
use crate::models::{Content, ContentId, Property, PropertyId, UserId};
use async_trait::async_trait;

/// Predicate for content queries; unset fields do not filter
///
/// # Examples
///
/// ```rust
/// # use contentree_core::db::ContentQuery;
/// # use contentree_core::models::UserId;
/// let user_id = UserId::new_v4();
/// let query = ContentQuery::roots_of(user_id);
/// assert_eq!(query.is_root, Some(true));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentQuery {
    /// Restrict to these ids
    pub ids: Option<Vec<ContentId>>,
    pub user_id: Option<UserId>,
    /// Nodes whose `root_content_id` is this root (the root itself excluded)
    pub root_content_id: Option<ContentId>,
    /// The root itself plus every node whose `root_content_id` is the root
    pub tree_of: Option<ContentId>,
    pub parent_content_id: Option<ContentId>,
    pub is_root: Option<bool>,
    /// Nodes whose `item_content` or any `list_item_content` row holds this id
    pub references_property: Option<PropertyId>,
}

impl ContentQuery {
    /// A user's root documents
    pub fn roots_of(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            is_root: Some(true),
            ..Default::default()
        }
    }

    /// A root and all nodes below it
    pub fn tree(root_id: ContentId) -> Self {
        Self {
            tree_of: Some(root_id),
            ..Default::default()
        }
    }

    /// Nodes referencing `property_id` from either reference slot
    pub fn referencing(property_id: PropertyId) -> Self {
        Self {
            references_property: Some(property_id),
            ..Default::default()
        }
    }
}

/// Predicate for property queries; unset fields do not filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyQuery {
    pub ids: Option<Vec<PropertyId>>,
    pub root_content_id: Option<ContentId>,
    pub parent_content_id: Option<ContentId>,
}

impl PropertyQuery {
    /// Batch lookup by id membership
    pub fn by_ids(ids: impl IntoIterator<Item = PropertyId>) -> Self {
        Self {
            ids: Some(ids.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Every property of a root's tree
    pub fn in_tree(root_id: ContentId) -> Self {
        Self {
            root_content_id: Some(root_id),
            ..Default::default()
        }
    }
}

/// A single write inside a [`WriteBatch`]
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    UpsertContent(Content),
    DeleteContent(ContentId),
    UpsertProperty(Property),
    DeleteProperty(PropertyId),
}

/// Ordered set of writes applied in one transaction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_content(&mut self, content: Content) -> &mut Self {
        self.ops.push(WriteOp::UpsertContent(content));
        self
    }

    pub fn delete_content(&mut self, id: ContentId) -> &mut Self {
        self.ops.push(WriteOp::DeleteContent(id));
        self
    }

    pub fn upsert_property(&mut self, property: Property) -> &mut Self {
        self.ops.push(WriteOp::UpsertProperty(property));
        self
    }

    pub fn delete_property(&mut self, id: PropertyId) -> &mut Self {
        self.ops.push(WriteOp::DeleteProperty(id));
        self
    }

    /// Append all writes of `other` after the writes already queued
    pub fn extend(&mut self, other: WriteBatch) -> &mut Self {
        self.ops.extend(other.ops);
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl IntoIterator for WriteBatch {
    type Item = WriteOp;
    type IntoIter = std::vec::IntoIter<WriteOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

/// Row counts produced by applying a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub upserted: u64,
    /// Rows actually removed (deletes of missing rows count 0)
    pub deleted: u64,
}

/// Abstraction layer for content and property persistence
///
/// Implementations must be `Send + Sync` so services can share them across
/// tasks behind an `Arc<dyn ContentStore>`.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Get content node by ID (`Ok(None)` when absent)
    async fn get_content(&self, id: ContentId) -> Result<Option<Content>, DatabaseError>;

    /// All content nodes matching `query`, ordered by position, creation time, id
    async fn query_contents(&self, query: ContentQuery) -> Result<Vec<Content>, DatabaseError>;

    /// Get property by ID (`Ok(None)` when absent)
    async fn get_property(&self, id: PropertyId) -> Result<Option<Property>, DatabaseError>;

    /// All properties matching `query`, ordered by creation time, id
    async fn query_properties(&self, query: PropertyQuery)
        -> Result<Vec<Property>, DatabaseError>;

    /// Highest root position of `user_id` (0 when the user has no roots)
    async fn max_root_position(&self, user_id: UserId) -> Result<i64, DatabaseError>;

    /// Apply every write of `batch` atomically
    async fn apply(&self, batch: WriteBatch) -> Result<BatchOutcome, DatabaseError>;
}
