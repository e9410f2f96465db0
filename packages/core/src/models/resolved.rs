//! Hydrated read views produced by the reference resolver

use crate::models::content::{Content, ContentType};
use crate::models::ids::{ContentId, PropertyId, UserId};
use crate::models::property::Property;
use serde::{Deserialize, Serialize};

/// A property reference with its key and target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedProperty {
    pub id: PropertyId,
    pub content_id: Option<ContentId>,
    pub key: Option<String>,
}

impl From<&Property> for ResolvedProperty {
    fn from(property: &Property) -> Self {
        Self {
            id: property.id,
            content_id: property.content_id,
            key: property.key.clone(),
        }
    }
}

/// A content node whose reference slots have been dereferenced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedContent {
    pub id: ContentId,
    pub user_id: UserId,
    pub position: i64,
    pub is_root: bool,
    pub alias: Option<String>,
    pub content_type: Option<ContentType>,
    pub text: Option<String>,
    pub image: Option<String>,
    pub html: Option<String>,
    pub list_text_content: Option<Vec<String>>,
    pub item_content: Vec<ResolvedProperty>,
    pub list_item_content: Vec<Vec<ResolvedProperty>>,
}

impl ResolvedContent {
    /// Copy the scalar fields of `content`; reference slots start empty
    pub fn from_scalars(content: &Content) -> Self {
        Self {
            id: content.id,
            user_id: content.user_id,
            position: content.position,
            is_root: content.is_root,
            alias: content.alias.clone(),
            content_type: content.content_type,
            text: content.text.clone(),
            image: content.image.clone(),
            html: content.html.clone(),
            list_text_content: content.list_text_content.clone(),
            item_content: Vec::new(),
            list_item_content: Vec::new(),
        }
    }
}
