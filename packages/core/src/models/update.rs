//! Partial Content Updates
//!
//! [`ContentUpdate`] enumerates exactly the fields `update_content` may
//! change. Nullable fields use the double-Option pattern:
//!
//! - `None`: leave the field unchanged
//! - `Some(None)`: clear the field (JSON `null`)
//! - `Some(Some(v))`: set the field to `v`
//!
//! The two reference slots can be replaced but not cleared; a JSON `null` for
//! them is read as "unchanged".

use crate::models::content::{Content, ContentType, ListItemRows};
use crate::models::ids::PropertyId;
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize a present field (including `null`) as `Some(..)`
///
/// A missing field is handled by `#[serde(default)]` on the struct field.
fn deserialize_optional_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

/// Partial update for a content node
///
/// # Examples
///
/// ```rust
/// # use contentree_core::models::{ContentType, ContentUpdate};
/// let update = ContentUpdate::new()
///     .with_content_type(ContentType::Text)
///     .with_text("a@b.com");
/// assert!(update.text.is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentUpdate {
    /// New position; for roots this moves the root inside the owner's ordering
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub alias: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub content_type: Option<Option<ContentType>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub text: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub image: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub html: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub list_text_content: Option<Option<Vec<String>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_content: Option<Vec<PropertyId>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_item_content: Option<ListItemRows>,
}

impl ContentUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, position: i64) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(Some(alias.into()));
        self
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(Some(content_type));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(Some(text.into()));
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(Some(image.into()));
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(Some(html.into()));
        self
    }

    pub fn with_list_text_content(mut self, items: Vec<String>) -> Self {
        self.list_text_content = Some(Some(items));
        self
    }

    pub fn with_item_content(mut self, ids: Vec<PropertyId>) -> Self {
        self.item_content = Some(ids);
        self
    }

    pub fn with_list_item_content(mut self, rows: ListItemRows) -> Self {
        self.list_item_content = Some(rows);
        self
    }

    /// True when no field is supplied
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply every supplied field except `position` to `content`
    ///
    /// Position is handled by the service because moving a root renumbers
    /// its siblings.
    pub fn apply_fields(&self, content: &mut Content) {
        if let Some(alias) = &self.alias {
            content.alias = alias.clone();
        }
        if let Some(content_type) = self.content_type {
            content.content_type = content_type;
        }
        if let Some(text) = &self.text {
            content.text = text.clone();
        }
        if let Some(image) = &self.image {
            content.image = image.clone();
        }
        if let Some(html) = &self.html {
            content.html = html.clone();
        }
        if let Some(list_text_content) = &self.list_text_content {
            content.list_text_content = list_text_content.clone();
        }
        if let Some(item_content) = &self.item_content {
            content.item_content = item_content.clone();
        }
        if let Some(rows) = &self.list_item_content {
            content.list_item_content = Some(rows.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ids::{ContentId, UserId};
    use serde_json::json;

    #[test]
    fn test_missing_null_and_value_are_distinguished() {
        let update: ContentUpdate = serde_json::from_value(json!({
            "alias": null,
            "text": "hello"
        }))
        .unwrap();

        assert_eq!(update.alias, Some(None));
        assert_eq!(update.text, Some(Some("hello".to_string())));
        assert_eq!(update.html, None);
        assert_eq!(update.position, None);
    }

    #[test]
    fn test_null_reference_slots_read_as_unchanged() {
        let update: ContentUpdate = serde_json::from_value(json!({
            "list_item_content": null,
            "item_content": null
        }))
        .unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_apply_fields_only_touches_supplied_fields() {
        let mut content = Content::new_root(ContentId::new_v4(), UserId::new_v4(), 3);
        content.alias = Some("Landing".to_string());
        content.html = Some("<b>x</b>".to_string());

        ContentUpdate::new()
            .with_content_type(ContentType::Text)
            .with_text("body")
            .with_position(9)
            .apply_fields(&mut content);

        assert_eq!(content.alias.as_deref(), Some("Landing"));
        assert_eq!(content.html.as_deref(), Some("<b>x</b>"));
        assert_eq!(content.text.as_deref(), Some("body"));
        assert_eq!(content.content_type, Some(ContentType::Text));
        assert_eq!(content.position, 3);
    }
}
