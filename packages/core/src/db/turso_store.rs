//! TursoStore - ContentStore Implementation for libsql
//!
//! Wraps a [`DatabaseService`] and implements [`ContentStore`] on top of the
//! `content` and `content_item_property` tables.
//!
//! # Design Principles
//!
//! 1. **No tree logic**: Only predicates, row conversion and batching live here
//! 2. **Row conversion**: `libsql::Row` → `Content` / `Property` in one place each
//! 3. **Transactions**: `apply` wraps a whole batch in `BEGIN`/`COMMIT`
//!
//! # Examples
//!
//! ```rust,no_run
//! use contentree_core::db::{ContentStore, DatabaseService, TursoStore};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = Arc::new(DatabaseService::new(PathBuf::from("./data/contentree.db")).await?);
//!     let store: Arc<dyn ContentStore> = Arc::new(TursoStore::new(db));
//!     let roots = store.max_root_position("6f1c0a5e-3e55-4c3f-9d59-0d8f6f8c1c11".parse()?).await?;
//!     println!("highest root position: {}", roots);
//!     Ok(())
//! }
//! ```

use crate::db::content_store::{
    BatchOutcome, ContentQuery, ContentStore, PropertyQuery, WriteBatch, WriteOp,
};
use crate::db::{DatabaseError, DatabaseService};
use crate::models::{Content, ContentId, ContentType, Property, PropertyId, UserId};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use libsql::{Row, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;

const CONTENT_TABLE: &str = "content";
const PROPERTY_TABLE: &str = "content_item_property";

const CONTENT_COLUMNS: &str = "id, user_id, position, is_root, root_content_id, parent_content_id, \
     alias, content_type, text, image, html, list_text_content, item_content, list_item_content, \
     created_at, updated_at";

const PROPERTY_COLUMNS: &str =
    "id, parent_content_id, root_content_id, user_id, \"key\", content_id, created_at, updated_at";

const UPSERT_CONTENT_SQL: &str = "INSERT INTO content (
        id, user_id, position, is_root, root_content_id, parent_content_id,
        alias, content_type, text, image, html, list_text_content, item_content, list_item_content
     ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
     ON CONFLICT(id) DO UPDATE SET
        user_id = excluded.user_id,
        position = excluded.position,
        is_root = excluded.is_root,
        root_content_id = excluded.root_content_id,
        parent_content_id = excluded.parent_content_id,
        alias = excluded.alias,
        content_type = excluded.content_type,
        text = excluded.text,
        image = excluded.image,
        html = excluded.html,
        list_text_content = excluded.list_text_content,
        item_content = excluded.item_content,
        list_item_content = excluded.list_item_content,
        updated_at = CURRENT_TIMESTAMP";

const UPSERT_PROPERTY_SQL: &str = "INSERT INTO content_item_property (
        id, parent_content_id, root_content_id, user_id, \"key\", content_id
     ) VALUES (?, ?, ?, ?, ?, ?)
     ON CONFLICT(id) DO UPDATE SET
        parent_content_id = excluded.parent_content_id,
        root_content_id = excluded.root_content_id,
        user_id = excluded.user_id,
        \"key\" = excluded.\"key\",
        content_id = excluded.content_id,
        updated_at = CURRENT_TIMESTAMP";

/// TursoStore implements ContentStore for the libsql backend
pub struct TursoStore {
    db: Arc<DatabaseService>,
}

impl TursoStore {
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    /// Underlying database service
    pub fn database(&self) -> &Arc<DatabaseService> {
        &self.db
    }

    /// Parse timestamp from database - handles both SQLite and RFC3339 formats
    ///
    /// SQLite CURRENT_TIMESTAMP returns: "YYYY-MM-DD HH:MM:SS"
    fn parse_timestamp(table: &'static str, s: &str) -> Result<DateTime<Utc>, DatabaseError> {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Ok(naive.and_utc());
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }

        Err(DatabaseError::corrupt_row(
            table,
            format!("Unable to parse timestamp '{}'", s),
        ))
    }

    fn column_error(table: &'static str, name: &'static str) -> impl Fn(libsql::Error) -> DatabaseError {
        move |e| DatabaseError::corrupt_row(table, format!("Failed to get {}: {}", name, e))
    }

    fn parse_id<T>(table: &'static str, raw: &str) -> Result<T, DatabaseError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        raw.parse::<T>()
            .map_err(|e| DatabaseError::corrupt_row(table, format!("Invalid id '{}': {}", raw, e)))
    }

    fn parse_optional_id<T>(table: &'static str, raw: Option<String>) -> Result<Option<T>, DatabaseError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        raw.as_deref().map(|s| Self::parse_id(table, s)).transpose()
    }

    fn parse_json<T: DeserializeOwned>(
        table: &'static str,
        name: &str,
        raw: &str,
    ) -> Result<T, DatabaseError> {
        serde_json::from_str(raw).map_err(|e| {
            DatabaseError::corrupt_row(table, format!("Failed to parse {} JSON: {}", name, e))
        })
    }

    /// Convert libsql::Row to Content (columns in `CONTENT_COLUMNS` order)
    fn row_to_content(row: &Row) -> Result<Content, DatabaseError> {
        let t = CONTENT_TABLE;
        let id: String = row.get(0).map_err(Self::column_error(t, "id"))?;
        let user_id: String = row.get(1).map_err(Self::column_error(t, "user_id"))?;
        let position: i64 = row.get(2).map_err(Self::column_error(t, "position"))?;
        let is_root: i64 = row.get(3).map_err(Self::column_error(t, "is_root"))?;
        let root_content_id: Option<String> = row.get(4).map_err(Self::column_error(t, "root_content_id"))?;
        let parent_content_id: Option<String> = row.get(5).map_err(Self::column_error(t, "parent_content_id"))?;
        let alias: Option<String> = row.get(6).map_err(Self::column_error(t, "alias"))?;
        let content_type: Option<String> = row.get(7).map_err(Self::column_error(t, "content_type"))?;
        let text: Option<String> = row.get(8).map_err(Self::column_error(t, "text"))?;
        let image: Option<String> = row.get(9).map_err(Self::column_error(t, "image"))?;
        let html: Option<String> = row.get(10).map_err(Self::column_error(t, "html"))?;
        let list_text_content: Option<String> = row.get(11).map_err(Self::column_error(t, "list_text_content"))?;
        let item_content: String = row.get(12).map_err(Self::column_error(t, "item_content"))?;
        let list_item_content: Option<String> = row.get(13).map_err(Self::column_error(t, "list_item_content"))?;
        let created_at: String = row.get(14).map_err(Self::column_error(t, "created_at"))?;
        let updated_at: String = row.get(15).map_err(Self::column_error(t, "updated_at"))?;

        let content_type = content_type
            .as_deref()
            .map(ContentType::from_str)
            .transpose()
            .map_err(|e| DatabaseError::corrupt_row(t, e.to_string()))?;

        Ok(Content {
            id: Self::parse_id(t, &id)?,
            user_id: Self::parse_id(t, &user_id)?,
            position,
            is_root: is_root != 0,
            root_content_id: Self::parse_optional_id(t, root_content_id)?,
            parent_content_id: Self::parse_optional_id(t, parent_content_id)?,
            alias,
            content_type,
            text,
            image,
            html,
            list_text_content: list_text_content
                .as_deref()
                .map(|raw| Self::parse_json(t, "list_text_content", raw))
                .transpose()?,
            item_content: Self::parse_json(t, "item_content", &item_content)?,
            list_item_content: list_item_content
                .as_deref()
                .map(|raw| Self::parse_json(t, "list_item_content", raw))
                .transpose()?,
            created_at: Self::parse_timestamp(t, &created_at)?,
            updated_at: Self::parse_timestamp(t, &updated_at)?,
        })
    }

    /// Convert libsql::Row to Property (columns in `PROPERTY_COLUMNS` order)
    fn row_to_property(row: &Row) -> Result<Property, DatabaseError> {
        let t = PROPERTY_TABLE;
        let id: String = row.get(0).map_err(Self::column_error(t, "id"))?;
        let parent_content_id: String = row.get(1).map_err(Self::column_error(t, "parent_content_id"))?;
        let root_content_id: String = row.get(2).map_err(Self::column_error(t, "root_content_id"))?;
        let user_id: String = row.get(3).map_err(Self::column_error(t, "user_id"))?;
        let key: Option<String> = row.get(4).map_err(Self::column_error(t, "key"))?;
        let content_id: Option<String> = row.get(5).map_err(Self::column_error(t, "content_id"))?;
        let created_at: String = row.get(6).map_err(Self::column_error(t, "created_at"))?;
        let updated_at: String = row.get(7).map_err(Self::column_error(t, "updated_at"))?;

        Ok(Property {
            id: Self::parse_id(t, &id)?,
            parent_content_id: Self::parse_id(t, &parent_content_id)?,
            root_content_id: Self::parse_id(t, &root_content_id)?,
            user_id: Self::parse_id(t, &user_id)?,
            key,
            content_id: Self::parse_optional_id(t, content_id)?,
            created_at: Self::parse_timestamp(t, &created_at)?,
            updated_at: Self::parse_timestamp(t, &updated_at)?,
        })
    }

    fn text(value: impl ToString) -> Value {
        Value::Text(value.to_string())
    }

    fn optional_text(value: Option<impl ToString>) -> Value {
        value.map_or(Value::Null, Self::text)
    }

    fn json<T: Serialize + ?Sized>(name: &str, value: &T) -> Result<Value, DatabaseError> {
        serde_json::to_string(value)
            .map(Value::Text)
            .map_err(|e| DatabaseError::statement(format!("Failed to serialize {}: {}", name, e)))
    }

    fn optional_json<T: Serialize>(name: &str, value: Option<&T>) -> Result<Value, DatabaseError> {
        value.map_or(Ok(Value::Null), |v| Self::json(name, v))
    }

    fn content_params(content: &Content) -> Result<Vec<Value>, DatabaseError> {
        Ok(vec![
            Self::text(content.id),
            Self::text(content.user_id),
            Value::Integer(content.position),
            Value::Integer(i64::from(content.is_root)),
            Self::optional_text(content.root_content_id),
            Self::optional_text(content.parent_content_id),
            Self::optional_text(content.alias.as_deref()),
            Self::optional_text(content.content_type.map(|ty| ty.as_str())),
            Self::optional_text(content.text.as_deref()),
            Self::optional_text(content.image.as_deref()),
            Self::optional_text(content.html.as_deref()),
            Self::optional_json("list_text_content", content.list_text_content.as_ref())?,
            Self::json("item_content", &content.item_content)?,
            Self::optional_json("list_item_content", content.list_item_content.as_ref())?,
        ])
    }

    fn property_params(property: &Property) -> Vec<Value> {
        vec![
            Self::text(property.id),
            Self::text(property.parent_content_id),
            Self::text(property.root_content_id),
            Self::text(property.user_id),
            Self::optional_text(property.key.as_deref()),
            Self::optional_text(property.content_id),
        ]
    }

    /// Append `column IN (?, ...)`; an empty id list matches nothing
    fn push_membership<T: std::fmt::Display>(
        conditions: &mut Vec<String>,
        params: &mut Vec<Value>,
        column: &str,
        ids: &[T],
    ) {
        if ids.is_empty() {
            conditions.push("0".to_string());
            return;
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        conditions.push(format!("{} IN ({})", column, placeholders));
        params.extend(ids.iter().map(Self::text));
    }

    fn content_filter(query: &ContentQuery) -> (String, Vec<Value>) {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(ids) = &query.ids {
            Self::push_membership(&mut conditions, &mut params, "id", ids);
        }
        if let Some(user_id) = query.user_id {
            conditions.push("user_id = ?".to_string());
            params.push(Self::text(user_id));
        }
        if let Some(root_id) = query.root_content_id {
            conditions.push("root_content_id = ?".to_string());
            params.push(Self::text(root_id));
        }
        if let Some(root_id) = query.tree_of {
            conditions.push("(id = ? OR root_content_id = ?)".to_string());
            params.push(Self::text(root_id));
            params.push(Self::text(root_id));
        }
        if let Some(parent_id) = query.parent_content_id {
            conditions.push("parent_content_id = ?".to_string());
            params.push(Self::text(parent_id));
        }
        if let Some(is_root) = query.is_root {
            conditions.push("is_root = ?".to_string());
            params.push(Value::Integer(i64::from(is_root)));
        }
        if let Some(property_id) = query.references_property {
            conditions.push(
                "(EXISTS (SELECT 1 FROM json_each(content.item_content) AS i WHERE i.value = ?)
                  OR EXISTS (SELECT 1 FROM json_each(COALESCE(content.list_item_content, '[]')) AS r,
                                           json_each(r.value) AS p
                             WHERE p.value = ?))"
                    .to_string(),
            );
            params.push(Self::text(property_id));
            params.push(Self::text(property_id));
        }

        (Self::where_clause(&conditions), params)
    }

    fn property_filter(query: &PropertyQuery) -> (String, Vec<Value>) {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(ids) = &query.ids {
            Self::push_membership(&mut conditions, &mut params, "id", ids);
        }
        if let Some(root_id) = query.root_content_id {
            conditions.push("root_content_id = ?".to_string());
            params.push(Self::text(root_id));
        }
        if let Some(parent_id) = query.parent_content_id {
            conditions.push("parent_content_id = ?".to_string());
            params.push(Self::text(parent_id));
        }

        (Self::where_clause(&conditions), params)
    }

    fn where_clause(conditions: &[String]) -> String {
        if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        }
    }

    async fn fetch_rows<T>(
        &self,
        sql: &str,
        params: Vec<Value>,
        convert: fn(&Row) -> Result<T, DatabaseError>,
    ) -> Result<Vec<T>, DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;

        let mut stmt = conn.prepare(sql).await.map_err(|e| {
            DatabaseError::statement(format!("Failed to prepare query: {}", e))
        })?;

        let mut rows = stmt
            .query(libsql::params_from_iter(params))
            .await
            .map_err(|e| DatabaseError::statement(format!("Failed to execute query: {}", e)))?;

        let mut results = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::statement(e.to_string()))?
        {
            results.push(convert(&row)?);
        }
        Ok(results)
    }

    async fn execute_op(conn: &libsql::Connection, op: &WriteOp) -> Result<u64, DatabaseError> {
        let (sql, params, what) = match op {
            WriteOp::UpsertContent(content) => (
                UPSERT_CONTENT_SQL,
                Self::content_params(content)?,
                format!("upsert content {}", content.id),
            ),
            WriteOp::DeleteContent(id) => (
                "DELETE FROM content WHERE id = ?",
                vec![Self::text(id)],
                format!("delete content {}", id),
            ),
            WriteOp::UpsertProperty(property) => (
                UPSERT_PROPERTY_SQL,
                Self::property_params(property),
                format!("upsert property {}", property.id),
            ),
            WriteOp::DeleteProperty(id) => (
                "DELETE FROM content_item_property WHERE id = ?",
                vec![Self::text(id)],
                format!("delete property {}", id),
            ),
        };

        conn.execute(sql, libsql::params_from_iter(params))
            .await
            .map_err(|e| DatabaseError::statement(format!("Failed to {}: {}", what, e)))
    }
}

#[async_trait]
impl ContentStore for TursoStore {
    async fn get_content(&self, id: ContentId) -> Result<Option<Content>, DatabaseError> {
        let mut found = self
            .query_contents(ContentQuery {
                ids: Some(vec![id]),
                ..Default::default()
            })
            .await?;
        Ok(found.pop())
    }

    async fn query_contents(&self, query: ContentQuery) -> Result<Vec<Content>, DatabaseError> {
        let (filter, params) = Self::content_filter(&query);
        let sql = format!(
            "SELECT {} FROM content{} ORDER BY position ASC, created_at ASC, id ASC",
            CONTENT_COLUMNS, filter
        );
        self.fetch_rows(&sql, params, Self::row_to_content).await
    }

    async fn get_property(&self, id: PropertyId) -> Result<Option<Property>, DatabaseError> {
        let mut found = self.query_properties(PropertyQuery::by_ids([id])).await?;
        Ok(found.pop())
    }

    async fn query_properties(
        &self,
        query: PropertyQuery,
    ) -> Result<Vec<Property>, DatabaseError> {
        let (filter, params) = Self::property_filter(&query);
        let sql = format!(
            "SELECT {} FROM content_item_property{} ORDER BY created_at ASC, id ASC",
            PROPERTY_COLUMNS, filter
        );
        self.fetch_rows(&sql, params, Self::row_to_property).await
    }

    async fn max_root_position(&self, user_id: UserId) -> Result<i64, DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;
        let mut stmt = conn
            .prepare("SELECT COALESCE(MAX(position), 0) FROM content WHERE user_id = ? AND is_root = 1")
            .await
            .map_err(|e| {
                DatabaseError::statement(format!("Failed to prepare max position query: {}", e))
            })?;

        let mut rows = stmt.query([user_id.to_string()]).await.map_err(|e| {
            DatabaseError::statement(format!("Failed to execute max position query: {}", e))
        })?;

        match rows
            .next()
            .await
            .map_err(|e| DatabaseError::statement(e.to_string()))?
        {
            Some(row) => row
                .get::<i64>(0)
                .map_err(Self::column_error(CONTENT_TABLE, "max(position)")),
            None => Ok(0),
        }
    }

    async fn apply(&self, batch: WriteBatch) -> Result<BatchOutcome, DatabaseError> {
        if batch.is_empty() {
            return Ok(BatchOutcome::default());
        }

        let conn = self.db.connect_with_timeout().await?;

        conn.execute("BEGIN TRANSACTION", ())
            .await
            .map_err(|e| DatabaseError::batch("begin", e))?;

        let mut outcome = BatchOutcome::default();
        for op in batch.ops() {
            match Self::execute_op(&conn, op).await {
                Ok(rows) => match op {
                    WriteOp::UpsertContent(_) | WriteOp::UpsertProperty(_) => {
                        outcome.upserted += rows
                    }
                    WriteOp::DeleteContent(_) | WriteOp::DeleteProperty(_) => {
                        outcome.deleted += rows
                    }
                },
                Err(e) => {
                    let _rollback = conn.execute("ROLLBACK", ()).await;
                    return Err(e);
                }
            }
        }

        if let Err(e) = conn.execute("COMMIT", ()).await {
            let _rollback = conn.execute("ROLLBACK", ()).await;
            return Err(DatabaseError::batch("commit", e));
        }

        tracing::debug!(
            writes = batch.len(),
            upserted = outcome.upserted,
            deleted = outcome.deleted,
            "Applied write batch"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentUpdate;
    use tempfile::TempDir;

    async fn create_test_store() -> (TursoStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = DatabaseService::new(temp_dir.path().join("test.db"))
            .await
            .unwrap();
        (TursoStore::new(Arc::new(db)), temp_dir)
    }

    fn child_pair(root: &Content, parent: &Content) -> (Content, Property) {
        let child = Content::new_child(ContentId::new_v4(), root.user_id, root.id, parent.id);
        let property = Property::new(
            PropertyId::new_v4(),
            root.user_id,
            root.id,
            parent.id,
            child.id,
        );
        (child, property)
    }

    #[tokio::test]
    async fn test_content_round_trip_preserves_all_slots() {
        let (store, _temp) = create_test_store().await;
        let user = UserId::new_v4();
        let mut root = Content::new_root(ContentId::new_v4(), user, 1);
        let a = PropertyId::new_v4();
        let b = PropertyId::new_v4();
        ContentUpdate::new()
            .with_alias("Home Page")
            .with_content_type(ContentType::ListItemContent)
            .with_list_text_content(vec!["x".to_string(), "y".to_string()])
            .with_item_content(vec![a])
            .with_list_item_content(vec![vec![a, b], vec![]])
            .apply_fields(&mut root);

        let mut batch = WriteBatch::new();
        batch.upsert_content(root.clone());
        store.apply(batch).await.unwrap();

        let loaded = store.get_content(root.id).await.unwrap().unwrap();
        assert_eq!(loaded.alias.as_deref(), Some("Home Page"));
        assert_eq!(loaded.content_type, Some(ContentType::ListItemContent));
        assert_eq!(
            loaded.list_text_content,
            Some(vec!["x".to_string(), "y".to_string()])
        );
        assert_eq!(loaded.item_content, vec![a]);
        assert_eq!(loaded.list_item_content, Some(vec![vec![a, b], vec![]]));
        assert!(loaded.is_root);
        assert_eq!(loaded.root_content_id, None);
    }

    #[tokio::test]
    async fn test_references_property_scans_both_slots() {
        let (store, _temp) = create_test_store().await;
        let user = UserId::new_v4();
        let mut root = Content::new_root(ContentId::new_v4(), user, 1);
        let (mut child, property) = child_pair(&root, &root);
        let listed = PropertyId::new_v4();

        root.item_content = vec![property.id];
        child.list_item_content = Some(vec![vec![], vec![listed]]);

        let mut batch = WriteBatch::new();
        batch
            .upsert_content(root.clone())
            .upsert_content(child.clone())
            .upsert_property(property.clone());
        store.apply(batch).await.unwrap();

        let by_item = store
            .query_contents(ContentQuery::referencing(property.id))
            .await
            .unwrap();
        assert_eq!(by_item.iter().map(|c| c.id).collect::<Vec<_>>(), vec![root.id]);

        let by_row = store
            .query_contents(ContentQuery::referencing(listed))
            .await
            .unwrap();
        assert_eq!(by_row.iter().map(|c| c.id).collect::<Vec<_>>(), vec![child.id]);

        let nowhere = store
            .query_contents(ContentQuery::referencing(PropertyId::new_v4()))
            .await
            .unwrap();
        assert!(nowhere.is_empty());
    }

    #[tokio::test]
    async fn test_tree_query_includes_root_and_descendants_only() {
        let (store, _temp) = create_test_store().await;
        let user = UserId::new_v4();
        let root = Content::new_root(ContentId::new_v4(), user, 1);
        let other_root = Content::new_root(ContentId::new_v4(), user, 2);
        let (child, property) = child_pair(&root, &root);
        let (foreign_child, _) = child_pair(&other_root, &other_root);

        let mut batch = WriteBatch::new();
        batch
            .upsert_content(root.clone())
            .upsert_content(other_root.clone())
            .upsert_content(child.clone())
            .upsert_content(foreign_child)
            .upsert_property(property.clone());
        store.apply(batch).await.unwrap();

        let mut tree_ids: Vec<ContentId> = store
            .query_contents(ContentQuery::tree(root.id))
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        tree_ids.sort();
        let mut expected = vec![root.id, child.id];
        expected.sort();
        assert_eq!(tree_ids, expected);

        let properties = store
            .query_properties(PropertyQuery::in_tree(root.id))
            .await
            .unwrap();
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].content_id, Some(child.id));

        assert_eq!(store.max_root_position(user).await.unwrap(), 2);
        assert_eq!(store.max_root_position(UserId::new_v4()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_id_membership_matches_nothing() {
        let (store, _temp) = create_test_store().await;
        let root = Content::new_root(ContentId::new_v4(), UserId::new_v4(), 1);
        let mut batch = WriteBatch::new();
        batch.upsert_content(root);
        store.apply(batch).await.unwrap();

        let found = store
            .query_contents(ContentQuery {
                ids: Some(Vec::new()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(found.is_empty());
        assert!(store
            .query_properties(PropertyQuery::by_ids(Vec::new()))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_deleting_missing_rows_is_a_noop() {
        let (store, _temp) = create_test_store().await;
        let mut batch = WriteBatch::new();
        batch
            .delete_content(ContentId::new_v4())
            .delete_property(PropertyId::new_v4());

        let outcome = store.apply(batch).await.unwrap();
        assert_eq!(outcome.deleted, 0);
    }

    #[tokio::test]
    async fn test_failed_batch_rolls_back_earlier_writes() {
        let (store, _temp) = create_test_store().await;
        let root = Content::new_root(ContentId::new_v4(), UserId::new_v4(), 1);

        // Any insert into the property table aborts, after the content rows were written
        let conn = store.database().connect_with_timeout().await.unwrap();
        conn.execute("CREATE TRIGGER reject_keys BEFORE INSERT ON content_item_property \
                      BEGIN SELECT RAISE(ABORT, 'rejected'); END", ())
            .await
            .unwrap();

        let (child, property) = child_pair(&root, &root);
        let mut batch = WriteBatch::new();
        batch
            .upsert_content(root.clone())
            .upsert_content(child.clone())
            .upsert_property(property);

        assert!(store.apply(batch).await.is_err());
        assert!(store.get_content(root.id).await.unwrap().is_none());
        assert!(store.get_content(child.id).await.unwrap().is_none());
    }
}
