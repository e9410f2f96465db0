//! Garbage Collector
//!
//! Reclaims property and content rows of one root's tree that are no longer
//! reachable through any reference slot.
//!
//! # Algorithm
//!
//! Works on a [`ContentTree`] snapshot, never the whole table:
//!
//! 1. Every property not held by some node's `item_content` or
//!    `list_item_content` row is deleted.
//! 2. Every non-root node no surviving property targets is deleted.
//! 3. Deleting a node drops its reference slots, which may orphan more
//!    properties, so steps 1 and 2 repeat until a pass deletes nothing.
//!
//! Planning is pure; [`CollectionReport::to_batch`] turns the result into
//! deletes the store applies in one transaction.

use crate::db::WriteBatch;
use crate::models::{ContentId, ContentTree, PropertyId};
use serde::Serialize;

/// Rows removed by a collection pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionReport {
    pub deleted_property_ids: Vec<PropertyId>,
    pub deleted_content_ids: Vec<ContentId>,
}

impl CollectionReport {
    pub fn is_empty(&self) -> bool {
        self.deleted_property_ids.is_empty() && self.deleted_content_ids.is_empty()
    }

    /// Total number of deleted rows
    pub fn len(&self) -> usize {
        self.deleted_property_ids.len() + self.deleted_content_ids.len()
    }

    /// Property deletes first, then content deletes
    pub fn to_batch(&self) -> WriteBatch {
        let mut batch = WriteBatch::new();
        for id in &self.deleted_property_ids {
            batch.delete_property(*id);
        }
        for id in &self.deleted_content_ids {
            batch.delete_content(*id);
        }
        batch
    }

    pub fn merge(&mut self, other: CollectionReport) {
        self.deleted_property_ids.extend(other.deleted_property_ids);
        self.deleted_content_ids.extend(other.deleted_content_ids);
    }
}

/// Sweep `tree` to a fixed point, removing collected rows from it
///
/// Root nodes are never collected. Ids are reported in ascending order per
/// pass so repeated runs over equal trees produce equal reports.
pub fn sweep(tree: &mut ContentTree) -> CollectionReport {
    let mut report = CollectionReport::default();

    loop {
        let referenced = tree.referenced_property_ids();
        let mut orphaned_properties: Vec<PropertyId> = tree
            .properties()
            .map(|p| p.id)
            .filter(|id| !referenced.contains(id))
            .collect();
        orphaned_properties.sort();
        for id in &orphaned_properties {
            tree.remove_property(*id);
        }

        let targeted = tree.targeted_content_ids();
        let root_id = tree.root_id();
        let mut orphaned_contents: Vec<ContentId> = tree
            .contents()
            .filter(|c| !c.is_root && Some(c.id) != root_id && !targeted.contains(&c.id))
            .map(|c| c.id)
            .collect();
        orphaned_contents.sort();
        for id in &orphaned_contents {
            tree.remove_content(*id);
        }

        if orphaned_properties.is_empty() && orphaned_contents.is_empty() {
            break;
        }
        tracing::debug!(
            "GC pass removed {} properties and {} contents",
            orphaned_properties.len(),
            orphaned_contents.len()
        );
        report.deleted_property_ids.extend(orphaned_properties);
        report.deleted_content_ids.extend(orphaned_contents);
    }

    report
}
