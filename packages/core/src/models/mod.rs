//! Data Models
//!
//! This module contains the core data structures used throughout Contentree:
//!
//! - `Content` - A node of a content tree (root document or inner node)
//! - `Property` - A keyed edge from a parent node to a child node
//! - `ContentUpdate` - Partial update accepted by `update_content`
//! - `ContentTree` - Arena snapshot of one root's tree
//! - `ResolvedContent` - Read view with dereferenced property ids

mod content;
mod ids;
mod property;
mod resolved;
mod tree;
mod update;

pub use content::{
    Content, ContentType, ContentValue, ListItemRows, RootSummary, UnknownContentType,
};
pub use ids::{ContentId, IdGenerator, PropertyId, UserId, UuidGenerator};
pub use property::{Property, DEFAULT_PROPERTY_KEY};
pub use resolved::{ResolvedContent, ResolvedProperty};
pub use tree::ContentTree;
pub use update::ContentUpdate;
