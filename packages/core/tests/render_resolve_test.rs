//! Render and Resolve Tests
//!
//! End-to-end checks of the two read paths:
//! - `resolve`: a node with its reference slots turned into `{id, content_id, key}`
//! - `render_root`: the public JSON document of a root

#[cfg(test)]
mod render_resolve_tests {
    use anyhow::Result;
    use contentree_core::db::WriteBatch;
    use contentree_core::{
        ContentId, ContentService, ContentServiceError, ContentType, ContentUpdate,
        DatabaseService, ErrorKind, PropertyId, TursoStore, UserId,
    };
    use serde_json::{json, Map, Value};
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Helper to create test service
    async fn create_test_service() -> Result<(ContentService, TempDir)> {
        let temp_dir = TempDir::new()?;
        let db = DatabaseService::new(temp_dir.path().join("test.db")).await?;
        let service = ContentService::new(Arc::new(TursoStore::new(Arc::new(db))));
        Ok((service, temp_dir))
    }

    async fn set_text(service: &ContentService, id: ContentId, text: &str) -> Result<()> {
        service
            .update_content(
                id,
                ContentUpdate::new()
                    .with_content_type(ContentType::Text)
                    .with_text(text),
            )
            .await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_email_scenario_renders_under_root_id() -> Result<()> {
        let (service, _temp_dir) = create_test_service().await?;
        let root = service.create_root(UserId::new_v4()).await?;

        let property = service.add_item_property(root.id, root.id).await?;
        assert_eq!(property.key.as_deref(), Some("Key"));
        service.update_property_key(property.id, "Email").await?;
        set_text(&service, property.content_id.unwrap(), "a@b.com").await?;

        let rendered = service.render_root(root.id).await?;

        let mut expected = Map::new();
        expected.insert(root.id.to_string(), json!({"email": "a@b.com"}));
        assert_eq!(rendered, Value::Object(expected));
        Ok(())
    }

    #[tokio::test]
    async fn test_render_form_with_alias() -> Result<()> {
        let (service, _temp_dir) = create_test_service().await?;
        let root = service.create_root(UserId::new_v4()).await?;
        service.update_root(root.id, Some("My Form".to_string())).await?;

        let property = service.add_item_property(root.id, root.id).await?;
        service.update_property_key(property.id, "First Name").await?;
        set_text(&service, property.content_id.unwrap(), "Alice").await?;

        assert_eq!(
            service.render_root(root.id).await?,
            json!({"myForm": {"firstName": "Alice"}})
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_render_nested_list_of_objects() -> Result<()> {
        let (service, _temp_dir) = create_test_service().await?;
        let root = service.create_root(UserId::new_v4()).await?;
        service.update_root(root.id, Some("About Us".to_string())).await?;

        let team = service.add_item_property(root.id, root.id).await?;
        service.update_property_key(team.id, "Team Members").await?;
        let team_node = team.content_id.unwrap();

        let ada = service.add_property_to_list_row(team_node, 0, root.id).await?;
        service.update_property_key(ada.id, "Name").await?;
        set_text(&service, ada.content_id.unwrap(), "Ada").await?;

        let photo = service.add_property_to_list_row(team_node, 0, root.id).await?;
        service.update_property_key(photo.id, "Photo").await?;
        service
            .update_content(
                photo.content_id.unwrap(),
                ContentUpdate::new()
                    .with_content_type(ContentType::Image)
                    .with_image("/uploads/ada.png"),
            )
            .await?;

        let grace = service.add_property_to_list_row(team_node, 1, root.id).await?;
        service.update_property_key(grace.id, "Name").await?;
        set_text(&service, grace.content_id.unwrap(), "Grace").await?;

        let tags = service.add_item_property(root.id, root.id).await?;
        service.update_property_key(tags.id, "tags").await?;
        service
            .update_content(
                tags.content_id.unwrap(),
                ContentUpdate::new()
                    .with_content_type(ContentType::ListTextContent)
                    .with_list_text_content(vec!["rust".into(), "cms".into()]),
            )
            .await?;

        assert_eq!(
            service.render_root(root.id).await?,
            json!({
                "aboutUs": {
                    "teamMembers": [
                        {"name": "Ada", "photo": "/uploads/ada.png"},
                        {"name": "Grace"}
                    ],
                    "tags": ["rust", "cms"]
                }
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_untyped_child_renders_null() -> Result<()> {
        let (service, _temp_dir) = create_test_service().await?;
        let root = service.create_root(UserId::new_v4()).await?;
        service.update_root(root.id, Some("Draft".to_string())).await?;
        service.add_item_property(root.id, root.id).await?;

        assert_eq!(
            service.render_root(root.id).await?,
            json!({"draft": {"key": null}})
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_render_requires_a_root() -> Result<()> {
        let (service, _temp_dir) = create_test_service().await?;
        let root = service.create_root(UserId::new_v4()).await?;
        let property = service.add_item_property(root.id, root.id).await?;

        let err = service
            .render_root(property.content_id.unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = service.render_root(ContentId::new_v4()).await.unwrap_err();
        assert!(matches!(err, ContentServiceError::ContentNotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_render_reports_cycles() -> Result<()> {
        let (service, _temp_dir) = create_test_service().await?;
        let root = service.create_root(UserId::new_v4()).await?;
        let property = service.add_item_property(root.id, root.id).await?;

        // Point the child back at its own property
        service
            .update_content(
                property.content_id.unwrap(),
                ContentUpdate::new()
                    .with_content_type(ContentType::ItemContent)
                    .with_item_content(vec![property.id]),
            )
            .await?;

        let err = service.render_root(root.id).await.unwrap_err();
        assert!(matches!(err, ContentServiceError::CircularReference { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_preserves_stored_order() -> Result<()> {
        let (service, _temp_dir) = create_test_service().await?;
        let root = service.create_root(UserId::new_v4()).await?;
        let p1 = service.add_item_property(root.id, root.id).await?;
        let p2 = service.add_item_property(root.id, root.id).await?;
        let p3 = service.add_item_property(root.id, root.id).await?;
        service
            .update_content(
                root.id,
                ContentUpdate::new().with_item_content(vec![p3.id, p1.id, p2.id]),
            )
            .await?;

        let resolved = service.resolve(root.id).await?;

        let ids: Vec<PropertyId> = resolved.item_content.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![p3.id, p1.id, p2.id]);
        assert!(resolved.list_item_content.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_list_rows() -> Result<()> {
        let (service, _temp_dir) = create_test_service().await?;
        let root = service.create_root(UserId::new_v4()).await?;
        let a = service.add_property_to_list_row(root.id, 0, root.id).await?;
        let b = service.add_property_to_list_row(root.id, 2, root.id).await?;
        service.update_property_key(b.id, "Title").await?;

        let resolved = service.resolve(root.id).await?;

        assert_eq!(resolved.list_item_content.len(), 3);
        assert_eq!(resolved.list_item_content[0][0].id, a.id);
        assert_eq!(resolved.list_item_content[0][0].content_id, a.content_id);
        assert!(resolved.list_item_content[1].is_empty());
        assert_eq!(
            resolved.list_item_content[2][0].key.as_deref(),
            Some("Title")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_tolerates_dangling_references() -> Result<()> {
        let (service, _temp_dir) = create_test_service().await?;
        let root = service.create_root(UserId::new_v4()).await?;
        let property = service.add_item_property(root.id, root.id).await?;
        let target = property.content_id.unwrap();

        // Target node gone, property and a bogus id still referenced
        let mut batch = WriteBatch::new();
        batch.delete_content(target);
        service.store().apply(batch).await?;
        service
            .update_content(
                root.id,
                ContentUpdate::new().with_item_content(vec![PropertyId::new_v4(), property.id]),
            )
            .await?;

        let resolved = service.resolve(root.id).await?;

        assert_eq!(resolved.item_content.len(), 1);
        assert_eq!(resolved.item_content[0].id, property.id);
        assert_eq!(resolved.item_content[0].content_id, Some(target));
        assert_eq!(resolved.item_content[0].key.as_deref(), Some("Key"));

        let mut expected = Map::new();
        expected.insert(root.id.to_string(), json!({"key": null}));
        assert_eq!(service.render_root(root.id).await?, Value::Object(expected));
        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_missing_content_is_not_found() -> Result<()> {
        let (service, _temp_dir) = create_test_service().await?;

        let err = service.resolve(ContentId::new_v4()).await.unwrap_err();
        assert!(err.is_not_found());
        Ok(())
    }
}
