//! Content Item Property Model
//!
//! A property is a named edge from a parent content node to a child content
//! node. Parents never hold child content ids directly; they hold property ids
//! in `item_content` / `list_item_content`, and the property carries the key
//! and the target.

use crate::models::ids::{ContentId, PropertyId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key given to properties created before the caller names them
pub const DEFAULT_PROPERTY_KEY: &str = "Key";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub parent_content_id: ContentId,
    pub root_content_id: ContentId,
    pub user_id: UserId,

    /// Object key on render
    pub key: Option<String>,

    /// Child node; may dangle if the node has been deleted
    pub content_id: Option<ContentId>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    /// New property pointing at `content_id`, keyed with [`DEFAULT_PROPERTY_KEY`]
    pub fn new(
        id: PropertyId,
        user_id: UserId,
        root_content_id: ContentId,
        parent_content_id: ContentId,
        content_id: ContentId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            parent_content_id,
            root_content_id,
            user_id,
            key: Some(DEFAULT_PROPERTY_KEY.to_string()),
            content_id: Some(content_id),
            created_at: now,
            updated_at: now,
        }
    }

    /// Key as rendered, empty when unset
    pub fn key_or_empty(&self) -> &str {
        self.key.as_deref().unwrap_or_default()
    }
}
