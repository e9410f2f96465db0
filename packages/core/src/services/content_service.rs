//! Content Service - Tree Mutations and Reads
//!
//! This module provides the business logic layer for content trees:
//!
//! - Root documents (create, rename, reposition, delete, list)
//! - Keyed children (`item_content`) and rows of keyed children
//!   (`list_item_content`)
//! - Row removal, row reordering and property removal with cascades
//! - Resolved reads, public rendering and garbage collection
//!
//! # Atomicity
//!
//! Each operation validates its target first, then builds one
//! [`WriteBatch`] and commits it in a single store transaction. A failure
//! leaves the tree untouched. Events are broadcast only after the commit.
//!
//! # Ownership
//!
//! The service takes `user_id` as trusted input. Callers check tokens with
//! [`authorize`](crate::auth::authorize) before mutating.

use crate::db::{ContentEvent, ContentQuery, ContentStore, PropertyQuery, WriteBatch};
use crate::models::{
    Content, ContentId, ContentTree, ContentType, ContentUpdate, IdGenerator, Property, PropertyId,
    ResolvedContent, RootSummary, UserId, UuidGenerator,
};
use crate::services::error::ContentServiceError;
use crate::services::garbage_collector::{self, CollectionReport};
use crate::services::renderer;
use crate::services::resolver::ReferenceResolver;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Default broadcast channel capacity for content events
///
/// Lagging subscribers lose the oldest events; they only need the latest
/// state of a tree.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 128;

/// Most rows a `list_item_content` slot may hold; bounds row padding
pub const MAX_LIST_ROWS: usize = 10_000;

/// Content tree operations over a [`ContentStore`]
#[derive(Clone)]
pub struct ContentService {
    store: Arc<dyn ContentStore>,
    ids: Arc<dyn IdGenerator>,
    resolver: ReferenceResolver,
    event_tx: broadcast::Sender<ContentEvent>,
}

impl ContentService {
    /// Create a service with UUID v4 ids and the default event capacity
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self::with_event_capacity(store, DEFAULT_EVENT_CHANNEL_CAPACITY)
    }

    pub fn with_event_capacity(store: Arc<dyn ContentStore>, capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity.max(1));
        Self {
            resolver: ReferenceResolver::new(store.clone()),
            store,
            ids: Arc::new(UuidGenerator),
            event_tx,
        }
    }

    /// Replace the id generator
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    /// Subscribe to events of every committed mutation
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use contentree_core::services::ContentService;
    /// # async fn example(service: ContentService) {
    /// let mut rx = service.subscribe_to_events();
    /// while let Ok(event) = rx.recv().await {
    ///     println!("{}", event.event_type());
    /// }
    /// # }
    /// ```
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<ContentEvent> {
        self.event_tx.subscribe()
    }

    // -- roots -------------------------------------------------------------

    /// Create a root for `user_id` after the user's last root
    pub async fn create_root(&self, user_id: UserId) -> Result<Content, ContentServiceError> {
        let position = self.store.max_root_position(user_id).await? + 1;
        let root = Content::new_root(self.ids.content_id(), user_id, position);

        let mut batch = WriteBatch::new();
        batch.upsert_content(root.clone());
        self.commit(batch).await?;

        tracing::info!("Created root {} at position {} for user {}", root.id, position, user_id);
        Ok(root)
    }

    /// Set (or clear) the public alias of a node
    pub async fn update_root(
        &self,
        content_id: ContentId,
        alias: Option<String>,
    ) -> Result<Content, ContentServiceError> {
        let mut content = self.require_content(content_id).await?;
        content.alias = alias;
        touch(&mut content);

        let mut batch = WriteBatch::new();
        batch.upsert_content(content.clone());
        self.commit(batch).await?;
        Ok(content)
    }

    /// Delete a root, close the gap in its owner's ordering and reclaim its tree
    pub async fn delete_root(
        &self,
        content_id: ContentId,
    ) -> Result<CollectionReport, ContentServiceError> {
        let root = self.require_content(content_id).await?;

        let mut batch = WriteBatch::new();
        batch.delete_content(root.id);

        if root.is_root {
            for mut sibling in self
                .store
                .query_contents(ContentQuery::roots_of(root.user_id))
                .await?
            {
                if sibling.id != root.id && sibling.position > root.position {
                    sibling.position -= 1;
                    touch(&mut sibling);
                    batch.upsert_content(sibling);
                }
            }
        }

        let mut tree = self.load_tree(root.id).await?;
        tree.remove_content(root.id);
        let report = garbage_collector::sweep(&mut tree);
        batch.extend(report.to_batch());
        self.commit(batch).await?;

        tracing::info!(
            "Deleted root {} (reclaimed {} properties, {} contents)",
            root.id,
            report.deleted_property_ids.len(),
            report.deleted_content_ids.len()
        );
        Ok(report)
    }

    /// A user's roots ordered by position (empty when the user has none)
    pub async fn list_roots(&self, user_id: UserId) -> Result<Vec<RootSummary>, ContentServiceError> {
        let roots = self
            .store
            .query_contents(ContentQuery::roots_of(user_id))
            .await?;
        Ok(roots.iter().map(RootSummary::from).collect())
    }

    // -- nodes -------------------------------------------------------------

    pub async fn get_content(&self, content_id: ContentId) -> Result<Content, ContentServiceError> {
        self.require_content(content_id).await
    }

    /// Apply a partial update to a node
    ///
    /// Fields left unset in `update` keep their value. A `position` on a root
    /// moves the root inside its owner's ordering (clamped to `1..=N`); on an
    /// inner node it is stored as given. The value slots are not checked
    /// against `content_type`.
    ///
    /// Replacing `item_content` or `list_item_content` does not sweep; pairs
    /// dropped that way stay until [`collect_garbage`](Self::collect_garbage).
    pub async fn update_content(
        &self,
        content_id: ContentId,
        update: ContentUpdate,
    ) -> Result<Content, ContentServiceError> {
        let mut content = self.require_content(content_id).await?;
        update.apply_fields(&mut content);

        let mut batch = WriteBatch::new();
        if let Some(position) = update.position {
            if content.is_root {
                content.position = self.move_root(&content, position, &mut batch).await?;
            } else {
                content.position = position;
            }
        }
        touch(&mut content);
        batch.upsert_content(content.clone());
        self.commit(batch).await?;

        tracing::debug!("Updated content {}", content.id);
        Ok(content)
    }

    /// Reorder a user's other roots around `root` placed at `requested`
    ///
    /// Queues upserts for siblings whose position changes and returns the
    /// position `root` ends up at.
    async fn move_root(
        &self,
        root: &Content,
        requested: i64,
        batch: &mut WriteBatch,
    ) -> Result<i64, ContentServiceError> {
        let mut siblings: Vec<Content> = self
            .store
            .query_contents(ContentQuery::roots_of(root.user_id))
            .await?
            .into_iter()
            .filter(|c| c.id != root.id)
            .collect();

        let target = requested.clamp(1, siblings.len() as i64 + 1);
        let slot = (target - 1) as usize;

        for (index, sibling) in siblings.iter_mut().enumerate() {
            let position = if index < slot { index as i64 + 1 } else { index as i64 + 2 };
            if sibling.position != position {
                sibling.position = position;
                touch(sibling);
                batch.upsert_content(sibling.clone());
            }
        }
        Ok(target)
    }

    // -- keyed children ----------------------------------------------------

    /// Create a child node with its property and append it to `item_content`
    ///
    /// An untyped parent becomes `item_content`; an explicit type is kept.
    pub async fn add_item_property(
        &self,
        content_id: ContentId,
        root_id: ContentId,
    ) -> Result<Property, ContentServiceError> {
        let mut parent = self.require_content(content_id).await?;
        check_root(&parent, root_id)?;

        let (child, property) = self.new_pair(&parent, root_id);
        parent.item_content.push(property.id);
        parent.content_type.get_or_insert(ContentType::ItemContent);
        touch(&mut parent);

        let mut batch = WriteBatch::new();
        batch
            .upsert_content(child)
            .upsert_property(property.clone())
            .upsert_content(parent);
        self.commit(batch).await?;

        tracing::info!("Added item property {} to content {}", property.id, content_id);
        Ok(property)
    }

    /// Rename a property
    pub async fn update_property_key(
        &self,
        property_id: PropertyId,
        key: impl Into<String>,
    ) -> Result<Property, ContentServiceError> {
        let mut property = self
            .store
            .get_property(property_id)
            .await?
            .ok_or_else(|| ContentServiceError::property_not_found(property_id))?;
        property.key = Some(key.into());
        property.updated_at = Utc::now();

        let mut batch = WriteBatch::new();
        batch.upsert_property(property.clone());
        self.commit(batch).await?;
        Ok(property)
    }

    // -- rows of keyed children ---------------------------------------------

    /// Append an empty row to `list_item_content`, typing an untyped node
    /// as `list_item_content`
    pub async fn init_list_item_row(
        &self,
        content_id: ContentId,
    ) -> Result<Content, ContentServiceError> {
        let mut content = self.require_content(content_id).await?;
        content
            .list_item_content
            .get_or_insert_with(Vec::new)
            .push(Vec::new());
        content.content_type.get_or_insert(ContentType::ListItemContent);
        touch(&mut content);

        let mut batch = WriteBatch::new();
        batch.upsert_content(content.clone());
        self.commit(batch).await?;
        Ok(content)
    }

    /// Create a child node with its property and append it to row `row_index`
    ///
    /// Missing rows up to `row_index` are created empty. An index at or past
    /// [`MAX_LIST_ROWS`] is `InvalidArgument`.
    pub async fn add_property_to_list_row(
        &self,
        content_id: ContentId,
        row_index: usize,
        root_id: ContentId,
    ) -> Result<Property, ContentServiceError> {
        let mut parent = self.require_content(content_id).await?;
        check_root(&parent, root_id)?;
        let row_count = row_index
            .checked_add(1)
            .filter(|&count| count <= MAX_LIST_ROWS)
            .ok_or_else(|| {
                ContentServiceError::invalid_argument(format!(
                    "row index {} exceeds the limit of {} rows",
                    row_index, MAX_LIST_ROWS
                ))
            })?;

        let (child, property) = self.new_pair(&parent, root_id);
        let rows = parent.list_item_content.get_or_insert_with(Vec::new);
        if rows.len() < row_count {
            rows.resize_with(row_count, Vec::new);
        }
        rows[row_index].push(property.id);
        parent.content_type.get_or_insert(ContentType::ListItemContent);
        touch(&mut parent);

        let mut batch = WriteBatch::new();
        batch
            .upsert_content(child)
            .upsert_property(property.clone())
            .upsert_content(parent);
        self.commit(batch).await?;

        tracing::info!(
            "Added property {} to row {} of content {}",
            property.id,
            row_index,
            content_id
        );
        Ok(property)
    }

    /// Remove row `row_index` and reclaim whatever it alone kept alive
    ///
    /// Properties of the removed row that are still referenced elsewhere in
    /// the tree (including other rows of the same node) survive.
    pub async fn remove_list_row(
        &self,
        content_id: ContentId,
        row_index: usize,
    ) -> Result<CollectionReport, ContentServiceError> {
        let content = self.require_content(content_id).await?;
        let row_count = content.row_count();
        if row_index >= row_count {
            return Err(ContentServiceError::invalid_argument(format!(
                "row index {} out of range for {} rows",
                row_index, row_count
            )));
        }

        let mut tree = self.load_tree(content.tree_root_id()).await?;
        let mut updated = content;
        if let Some(rows) = updated.list_item_content.as_mut() {
            rows.remove(row_index);
        }
        touch(&mut updated);
        tree.put_content(updated);

        let report = self.sweep_and_commit(content_id, tree, WriteBatch::new()).await?;
        tracing::info!(
            "Removed row {} of content {} ({} rows reclaimed)",
            row_index,
            content_id,
            report.len()
        );
        Ok(report)
    }

    /// Permute rows: row `i` of the result is old row `new_order[i]`
    pub async fn reorder_list_rows(
        &self,
        content_id: ContentId,
        new_order: &[usize],
    ) -> Result<Content, ContentServiceError> {
        let mut content = self.require_content(content_id).await?;
        let row_count = content.row_count();
        check_permutation(new_order, row_count)?;
        if row_count == 0 {
            return Ok(content);
        }

        if let Some(rows) = content.list_item_content.as_mut() {
            let old = std::mem::take(rows);
            *rows = new_order.iter().map(|&index| old[index].clone()).collect();
        }
        touch(&mut content);

        let mut batch = WriteBatch::new();
        batch.upsert_content(content.clone());
        self.commit(batch).await?;
        Ok(content)
    }

    /// Strip a property from both reference slots of a node and delete it
    ///
    /// The property's target node goes with it unless another property
    /// still points at it. The rest of the tree is swept in the same batch.
    pub async fn remove_property_from_content(
        &self,
        content_id: ContentId,
        property_id: PropertyId,
    ) -> Result<CollectionReport, ContentServiceError> {
        let mut content = self.require_content(content_id).await?;
        if !content.remove_property_reference(property_id) {
            tracing::debug!("Content {} did not reference property {}", content_id, property_id);
        }
        touch(&mut content);

        let mut tree = self.load_tree(content.tree_root_id()).await?;
        tree.put_content(content);

        let mut batch = WriteBatch::new();
        let mut report = CollectionReport::default();
        if let Some(property) = self.store.get_property(property_id).await? {
            tree.remove_property(property.id);
            batch.delete_property(property.id);
            report.deleted_property_ids.push(property.id);
        }

        report.merge(self.sweep_and_commit(content_id, tree, batch).await?);
        tracing::info!(
            "Removed property {} from content {} ({} rows reclaimed)",
            property_id,
            content_id,
            report.len()
        );
        Ok(report)
    }

    // -- reads -------------------------------------------------------------

    /// Node with its reference slots resolved to `{id, content_id, key}`
    pub async fn resolve(&self, content_id: ContentId) -> Result<ResolvedContent, ContentServiceError> {
        self.resolver.resolve(content_id).await
    }

    /// Public JSON rendering of a root
    pub async fn render_root(&self, root_id: ContentId) -> Result<Value, ContentServiceError> {
        match self.store.get_content(root_id).await? {
            Some(root) if root.is_root => {}
            _ => return Err(ContentServiceError::content_not_found(root_id)),
        }
        let tree = self.load_tree(root_id).await?;
        renderer::render_tree(&tree)
    }

    // -- garbage collection ----------------------------------------------------

    /// Reclaim unreachable rows of the tree of `root_id`
    ///
    /// The root row may already be gone. An empty scope writes nothing.
    pub async fn collect_garbage(
        &self,
        root_id: ContentId,
    ) -> Result<CollectionReport, ContentServiceError> {
        let mut tree = self.load_tree(root_id).await?;
        let report = garbage_collector::sweep(&mut tree);
        if report.is_empty() {
            tracing::debug!("GC found nothing to reclaim under {}", root_id);
            return Ok(report);
        }

        self.commit(report.to_batch()).await?;
        tracing::info!(
            "GC reclaimed {} properties and {} contents under {}",
            report.deleted_property_ids.len(),
            report.deleted_content_ids.len(),
            root_id
        );
        Ok(report)
    }

    // -- helpers -----------------------------------------------------------

    async fn require_content(&self, id: ContentId) -> Result<Content, ContentServiceError> {
        self.store
            .get_content(id)
            .await?
            .ok_or_else(|| ContentServiceError::content_not_found(id))
    }

    async fn load_tree(&self, root_id: ContentId) -> Result<ContentTree, ContentServiceError> {
        let contents = self.store.query_contents(ContentQuery::tree(root_id)).await?;
        let properties = self
            .store
            .query_properties(PropertyQuery::in_tree(root_id))
            .await?;
        Ok(ContentTree::new(root_id, contents, properties))
    }

    fn new_pair(&self, parent: &Content, root_id: ContentId) -> (Content, Property) {
        let child = Content::new_child(self.ids.content_id(), parent.user_id, root_id, parent.id);
        let property = Property::new(
            self.ids.property_id(),
            parent.user_id,
            root_id,
            parent.id,
            child.id,
        );
        (child, property)
    }

    /// Sweep `tree`, then commit `batch`, the edited node and the sweep together
    async fn sweep_and_commit(
        &self,
        edited: ContentId,
        mut tree: ContentTree,
        mut batch: WriteBatch,
    ) -> Result<CollectionReport, ContentServiceError> {
        let report = garbage_collector::sweep(&mut tree);
        if let Some(content) = tree.content(edited) {
            batch.upsert_content(content.clone());
        }
        batch.extend(report.to_batch());
        self.commit(batch).await?;
        Ok(report)
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), ContentServiceError> {
        if batch.is_empty() {
            return Ok(());
        }
        let events = ContentEvent::from_batch(&batch);
        let outcome = self.store.apply(batch).await?;
        tracing::debug!(
            "Committed batch: {} upserted, {} deleted",
            outcome.upserted,
            outcome.deleted
        );
        for event in events {
            // No subscribers is fine
            let _ = self.event_tx.send(event);
        }
        Ok(())
    }
}

fn touch(content: &mut Content) {
    content.updated_at = Utc::now();
}

/// `root_id` must be the tree `parent` belongs to
fn check_root(parent: &Content, root_id: ContentId) -> Result<(), ContentServiceError> {
    let expected = parent.tree_root_id();
    if expected != root_id {
        return Err(ContentServiceError::invalid_argument(format!(
            "content {} belongs to root {}, not {}",
            parent.id, expected, root_id
        )));
    }
    Ok(())
}

fn check_permutation(order: &[usize], row_count: usize) -> Result<(), ContentServiceError> {
    if order.len() != row_count {
        return Err(ContentServiceError::invalid_argument(format!(
            "order has {} entries for {} rows",
            order.len(),
            row_count
        )));
    }
    let mut seen = vec![false; row_count];
    for &index in order {
        match seen.get_mut(index) {
            Some(slot) if !*slot => *slot = true,
            Some(_) => {
                return Err(ContentServiceError::invalid_argument(format!(
                    "row {} listed twice",
                    index
                )))
            }
            None => {
                return Err(ContentServiceError::invalid_argument(format!(
                    "row {} out of range for {} rows",
                    index, row_count
                )))
            }
        }
    }
    Ok(())
}
