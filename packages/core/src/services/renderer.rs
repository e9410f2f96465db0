//! Public Renderer
//!
//! Turns a root's tree into a plain JSON document: scalar nodes become their
//! value, keyed nodes become objects, list-of-keyed nodes become arrays of
//! objects. Object keys are property keys passed through
//! [`normalize_key`](crate::services::normalize_key).

use crate::models::{Content, ContentId, ContentTree, ContentValue, PropertyId};
use crate::services::error::ContentServiceError;
use crate::services::keys::normalize_key;
use serde_json::{Map, Value};

/// Render the root of `tree` wrapped as `{ key: value }`
///
/// `key` is the normalized alias when the root has a non-blank alias,
/// otherwise the root id.
pub fn render_tree(tree: &ContentTree) -> Result<Value, ContentServiceError> {
    let root = match tree.root() {
        Some(root) if root.is_root => root,
        _ => {
            let id = tree
                .root_id()
                .ok_or_else(|| ContentServiceError::invalid_argument("tree has no root id"))?;
            return Err(ContentServiceError::content_not_found(id));
        }
    };

    let key = match root.alias.as_deref().map(normalize_key) {
        Some(alias) if !alias.is_empty() => alias,
        _ => root.id.to_string(),
    };

    let mut renderer = Renderer {
        tree,
        path: Vec::new(),
    };
    let mut output = Map::new();
    output.insert(key, renderer.render_node(root)?);
    Ok(Value::Object(output))
}

struct Renderer<'a> {
    tree: &'a ContentTree,
    /// Nodes on the current descent, for cycle detection
    path: Vec<ContentId>,
}

impl<'a> Renderer<'a> {
    fn render_node(&mut self, content: &'a Content) -> Result<Value, ContentServiceError> {
        if self.path.contains(&content.id) {
            return Err(ContentServiceError::circular_reference(format!(
                "content {} is its own descendant",
                content.id
            )));
        }
        self.path.push(content.id);

        let value = match content.value() {
            ContentValue::Untyped => Value::Null,
            ContentValue::Text(v) | ContentValue::Image(v) | ContentValue::Html(v) => {
                v.map_or(Value::Null, |s| Value::String(s.to_string()))
            }
            ContentValue::ListText(items) => items.map_or(Value::Null, |items| {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }),
            ContentValue::Item(ids) => self.render_object(ids)?,
            ContentValue::ListItem(rows) => Value::Array(
                rows.iter()
                    .map(|row| self.render_object(row))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        };

        self.path.pop();
        Ok(value)
    }

    fn render_object(&mut self, ids: &[PropertyId]) -> Result<Value, ContentServiceError> {
        let mut object = Map::new();
        for id in ids {
            let Some(property) = self.tree.property(*id) else {
                tracing::warn!("Skipping dangling property id {} during render", id);
                continue;
            };
            let child = property.content_id.and_then(|cid| self.tree.content(cid));
            let value = match child {
                Some(child) => self.render_node(child)?,
                None => Value::Null,
            };
            object.insert(normalize_key(property.key_or_empty()), value);
        }
        Ok(Value::Object(object))
    }
}
