//! Content Tree Arena
//!
//! In-memory snapshot of one root's tree: every content node and property
//! whose `root_content_id` is the root, plus the root itself. Nodes refer to
//! each other only through ids, so the snapshot is a flat arena and the
//! renderer and garbage collector can walk it without touching storage.

use crate::models::content::Content;
use crate::models::ids::{ContentId, PropertyId};
use crate::models::property::Property;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct ContentTree {
    root_id: Option<ContentId>,
    contents: HashMap<ContentId, Content>,
    properties: HashMap<PropertyId, Property>,
}

impl ContentTree {
    /// Build a snapshot for `root_id` from loaded rows
    ///
    /// The root row itself may be absent (for example right after the root
    /// was deleted); the scope is still defined by `root_id`.
    pub fn new(
        root_id: ContentId,
        contents: impl IntoIterator<Item = Content>,
        properties: impl IntoIterator<Item = Property>,
    ) -> Self {
        Self {
            root_id: Some(root_id),
            contents: contents.into_iter().map(|c| (c.id, c)).collect(),
            properties: properties.into_iter().map(|p| (p.id, p)).collect(),
        }
    }

    pub fn root_id(&self) -> Option<ContentId> {
        self.root_id
    }

    pub fn root(&self) -> Option<&Content> {
        self.root_id.and_then(|id| self.contents.get(&id))
    }

    pub fn content(&self, id: ContentId) -> Option<&Content> {
        self.contents.get(&id)
    }

    pub fn content_mut(&mut self, id: ContentId) -> Option<&mut Content> {
        self.contents.get_mut(&id)
    }

    pub fn property(&self, id: PropertyId) -> Option<&Property> {
        self.properties.get(&id)
    }

    pub fn contents(&self) -> impl Iterator<Item = &Content> {
        self.contents.values()
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    pub fn content_count(&self) -> usize {
        self.contents.len()
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty() && self.properties.is_empty()
    }

    /// Insert or replace a content node
    pub fn put_content(&mut self, content: Content) {
        self.contents.insert(content.id, content);
    }

    pub fn remove_content(&mut self, id: ContentId) -> Option<Content> {
        self.contents.remove(&id)
    }

    pub fn remove_property(&mut self, id: PropertyId) -> Option<Property> {
        self.properties.remove(&id)
    }

    /// Property ids referenced by any node's reference slots
    pub fn referenced_property_ids(&self) -> HashSet<PropertyId> {
        self.contents
            .values()
            .flat_map(Content::referenced_property_ids)
            .collect()
    }

    /// Content ids targeted by any property
    pub fn targeted_content_ids(&self) -> HashSet<ContentId> {
        self.properties
            .values()
            .filter_map(|p| p.content_id)
            .collect()
    }
}
