//! Content Node Model
//!
//! A [`Content`] row is one node of a content tree. Roots are top-level
//! documents owned by a user; every other node hangs below a root and is
//! reached through a [`Property`](crate::models::Property) edge.
//!
//! # Value Slots
//!
//! The persisted row keeps one slot per value kind (`text`, `image`, `html`,
//! `list_text_content`) plus the two reference slots (`item_content`,
//! `list_item_content`). Partial updates may write any slot independently, so
//! the row does not enforce that only the slot matching `content_type` is
//! populated. Readers go through [`Content::value`], which yields the typed
//! [`ContentValue`] selected by `content_type` and ignores the other slots.

use crate::models::ids::{ContentId, PropertyId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rows of property ids held by a `list_item_content` node
pub type ListItemRows = Vec<Vec<PropertyId>>;

/// Discriminator selecting which value slot of a node is meaningful
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Text,
    Image,
    Html,
    ListTextContent,
    ItemContent,
    ListItemContent,
}

impl ContentType {
    /// Stable storage name (matches the serde representation)
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Image => "image",
            ContentType::Html => "html",
            ContentType::ListTextContent => "list_text_content",
            ContentType::ItemContent => "item_content",
            ContentType::ListItemContent => "list_item_content",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown content type name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown content type: {0}")]
pub struct UnknownContentType(pub String);

impl FromStr for ContentType {
    type Err = UnknownContentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ContentType::Text),
            "image" => Ok(ContentType::Image),
            "html" => Ok(ContentType::Html),
            "list_text_content" => Ok(ContentType::ListTextContent),
            "item_content" => Ok(ContentType::ItemContent),
            "list_item_content" => Ok(ContentType::ListItemContent),
            other => Err(UnknownContentType(other.to_string())),
        }
    }
}

/// A node of the content tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: ContentId,

    /// Owner; every node under one root shares it
    pub user_id: UserId,

    /// Dense 1..N ordering among a user's roots, 0 for inner nodes
    pub position: i64,

    pub is_root: bool,

    /// Root of the tree this node belongs to (None for roots)
    pub root_content_id: Option<ContentId>,

    /// Node this one was created under (None for roots)
    pub parent_content_id: Option<ContentId>,

    /// Public name of a root, used as the render key instead of the id
    pub alias: Option<String>,

    pub content_type: Option<ContentType>,

    pub text: Option<String>,

    /// Path of an uploaded image
    pub image: Option<String>,

    pub html: Option<String>,

    pub list_text_content: Option<Vec<String>>,

    /// Keyed children: ordered property ids
    #[serde(default)]
    pub item_content: Vec<PropertyId>,

    /// List of keyed children: ordered rows of property ids
    pub list_item_content: Option<ListItemRows>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Content {
    /// New root document for `user_id` at `position`
    pub fn new_root(id: ContentId, user_id: UserId, position: i64) -> Self {
        Self::blank(id, user_id, position, true, None, None)
    }

    /// New inner node created under `parent_content_id` inside the tree of `root_content_id`
    pub fn new_child(
        id: ContentId,
        user_id: UserId,
        root_content_id: ContentId,
        parent_content_id: ContentId,
    ) -> Self {
        Self::blank(
            id,
            user_id,
            0,
            false,
            Some(root_content_id),
            Some(parent_content_id),
        )
    }

    fn blank(
        id: ContentId,
        user_id: UserId,
        position: i64,
        is_root: bool,
        root_content_id: Option<ContentId>,
        parent_content_id: Option<ContentId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            position,
            is_root,
            root_content_id,
            parent_content_id,
            alias: None,
            content_type: None,
            text: None,
            image: None,
            html: None,
            list_text_content: None,
            item_content: Vec::new(),
            list_item_content: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Root of the tree containing this node (the node itself for roots)
    pub fn tree_root_id(&self) -> ContentId {
        if self.is_root {
            self.id
        } else {
            self.root_content_id.unwrap_or(self.id)
        }
    }

    /// Number of rows in `list_item_content` (0 when never initialized)
    pub fn row_count(&self) -> usize {
        self.list_item_content.as_ref().map_or(0, Vec::len)
    }

    /// Whether `property_id` appears in `item_content` or any row of `list_item_content`
    pub fn references(&self, property_id: PropertyId) -> bool {
        self.referenced_property_ids().any(|id| id == property_id)
    }

    /// Every property id held by the two reference slots, in stored order
    pub fn referenced_property_ids(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.item_content.iter().copied().chain(
            self.list_item_content
                .iter()
                .flatten()
                .flat_map(|row| row.iter().copied()),
        )
    }

    /// Strip `property_id` from both reference slots
    ///
    /// Returns true when at least one occurrence was removed. Empty rows stay
    /// in place so row indices of the other rows do not shift.
    pub fn remove_property_reference(&mut self, property_id: PropertyId) -> bool {
        let before = self.referenced_property_ids().count();
        self.item_content.retain(|id| *id != property_id);
        if let Some(rows) = self.list_item_content.as_mut() {
            for row in rows.iter_mut() {
                row.retain(|id| *id != property_id);
            }
        }
        before != self.referenced_property_ids().count()
    }

    /// Typed view of the value selected by `content_type`
    pub fn value(&self) -> ContentValue<'_> {
        match self.content_type {
            None => ContentValue::Untyped,
            Some(ContentType::Text) => ContentValue::Text(self.text.as_deref()),
            Some(ContentType::Image) => ContentValue::Image(self.image.as_deref()),
            Some(ContentType::Html) => ContentValue::Html(self.html.as_deref()),
            Some(ContentType::ListTextContent) => {
                ContentValue::ListText(self.list_text_content.as_deref())
            }
            Some(ContentType::ItemContent) => ContentValue::Item(&self.item_content),
            Some(ContentType::ListItemContent) => ContentValue::ListItem(
                self.list_item_content.as_deref().unwrap_or_default(),
            ),
        }
    }
}

/// The meaningful value of a node, tagged by its content type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContentValue<'a> {
    /// No content type chosen yet
    Untyped,
    Text(Option<&'a str>),
    Image(Option<&'a str>),
    Html(Option<&'a str>),
    ListText(Option<&'a [String]>),
    /// Keyed object: property ids in display order
    Item(&'a [PropertyId]),
    /// List of keyed objects: one row of property ids per object
    ListItem(&'a [Vec<PropertyId>]),
}

/// Lightweight listing entry for a user's roots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootSummary {
    pub id: ContentId,
    pub alias: Option<String>,
    pub is_root: bool,
    pub position: i64,
}

impl From<&Content> for RootSummary {
    fn from(content: &Content) -> Self {
        Self {
            id: content.id,
            alias: content.alias.clone(),
            is_root: content.is_root,
            position: content.position,
        }
    }
}
