//! Reference Resolver
//!
//! Dereferences the property ids held by a node's reference slots into
//! [`ResolvedProperty`] entries for authenticated read paths.

use crate::db::{ContentStore, PropertyQuery};
use crate::models::{Content, ContentId, PropertyId, ResolvedContent, ResolvedProperty};
use crate::services::error::ContentServiceError;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves reference slots with one batch lookup per slot or row
#[derive(Clone)]
pub struct ReferenceResolver {
    store: Arc<dyn ContentStore>,
}

impl ReferenceResolver {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Load `content_id` and resolve both reference slots
    ///
    /// Ids without a property record are dropped. A property whose target
    /// node is gone is still listed with its `content_id`.
    pub async fn resolve(
        &self,
        content_id: ContentId,
    ) -> Result<ResolvedContent, ContentServiceError> {
        let content = self
            .store
            .get_content(content_id)
            .await?
            .ok_or_else(|| ContentServiceError::content_not_found(content_id))?;
        self.resolve_content(&content).await
    }

    /// Resolve the reference slots of an already loaded node
    pub async fn resolve_content(
        &self,
        content: &Content,
    ) -> Result<ResolvedContent, ContentServiceError> {
        let mut resolved = ResolvedContent::from_scalars(content);
        resolved.item_content = self.resolve_ids(&content.item_content).await?;

        if let Some(rows) = &content.list_item_content {
            let mut resolved_rows = Vec::with_capacity(rows.len());
            for row in rows {
                resolved_rows.push(self.resolve_ids(row).await?);
            }
            resolved.list_item_content = resolved_rows;
        }

        Ok(resolved)
    }

    /// One membership query for `ids`, returned in the order of `ids`
    async fn resolve_ids(
        &self,
        ids: &[PropertyId],
    ) -> Result<Vec<ResolvedProperty>, ContentServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let found: HashMap<PropertyId, ResolvedProperty> = self
            .store
            .query_properties(PropertyQuery::by_ids(ids.iter().copied()))
            .await?
            .iter()
            .map(|p| (p.id, ResolvedProperty::from(p)))
            .collect();

        Ok(ids
            .iter()
            .filter_map(|id| {
                let entry = found.get(id).cloned();
                if entry.is_none() {
                    tracing::warn!("Dropping dangling property id {} while resolving", id);
                }
                entry
            })
            .collect())
    }
}
