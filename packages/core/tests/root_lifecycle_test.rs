//! Root Lifecycle Tests
//!
//! Integration tests for a user's root documents against a real libsql
//! database:
//!
//! - Positions form a dense 1..N sequence after creates, deletes and moves
//! - Deleting a root reclaims its whole tree
//! - Roots of different users never affect each other

#[cfg(test)]
mod root_lifecycle_tests {
    use anyhow::Result;
    use contentree_core::db::ContentQuery;
    use contentree_core::{
        ContentService, ContentServiceError, ContentUpdate, DatabaseService, ErrorKind,
        TursoStore, UserId,
    };
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Helper to create test service
    async fn create_test_service() -> Result<(ContentService, TempDir)> {
        let temp_dir = TempDir::new()?;
        let db = DatabaseService::new(temp_dir.path().join("test.db")).await?;
        let service = ContentService::new(Arc::new(TursoStore::new(Arc::new(db))));
        Ok((service, temp_dir))
    }

    async fn positions(service: &ContentService, user: UserId) -> Result<Vec<i64>> {
        Ok(service
            .list_roots(user)
            .await?
            .iter()
            .map(|r| r.position)
            .collect())
    }

    #[tokio::test]
    async fn test_create_root_appends_after_last_position() -> Result<()> {
        let (service, _temp_dir) = create_test_service().await?;
        let user = UserId::new_v4();

        let first = service.create_root(user).await?;
        let second = service.create_root(user).await?;
        let third = service.create_root(user).await?;

        assert!(first.is_root && second.is_root && third.is_root);
        assert_eq!(positions(&service, user).await?, vec![1, 2, 3]);
        assert_eq!(service.get_content(third.id).await?.position, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_positions_stay_contiguous_after_deletes() -> Result<()> {
        let (service, _temp_dir) = create_test_service().await?;
        let user = UserId::new_v4();

        let mut roots = Vec::new();
        for _ in 0..4 {
            roots.push(service.create_root(user).await?);
        }

        service.delete_root(roots[1].id).await?;
        assert_eq!(positions(&service, user).await?, vec![1, 2, 3]);

        service.delete_root(roots[0].id).await?;
        assert_eq!(positions(&service, user).await?, vec![1, 2]);

        let fresh = service.create_root(user).await?;
        assert_eq!(fresh.position, 3);

        let order: Vec<_> = service.list_roots(user).await?.iter().map(|r| r.id).collect();
        assert_eq!(order, vec![roots[2].id, roots[3].id, fresh.id]);
        Ok(())
    }

    #[tokio::test]
    async fn test_users_are_isolated() -> Result<()> {
        let (service, _temp_dir) = create_test_service().await?;
        let alice = UserId::new_v4();
        let bob = UserId::new_v4();

        let a1 = service.create_root(alice).await?;
        service.create_root(alice).await?;
        let b1 = service.create_root(bob).await?;
        assert_eq!(b1.position, 1);

        service.delete_root(a1.id).await?;
        assert_eq!(positions(&service, alice).await?, vec![1]);
        assert_eq!(positions(&service, bob).await?, vec![1]);
        Ok(())
    }

    #[tokio::test]
    async fn test_moving_a_root_shifts_siblings() -> Result<()> {
        let (service, _temp_dir) = create_test_service().await?;
        let user = UserId::new_v4();
        let a = service.create_root(user).await?;
        let b = service.create_root(user).await?;
        let c = service.create_root(user).await?;

        let moved = service
            .update_content(c.id, ContentUpdate::new().with_position(1))
            .await?;
        assert_eq!(moved.position, 1);
        let order: Vec<_> = service.list_roots(user).await?.iter().map(|r| r.id).collect();
        assert_eq!(order, vec![c.id, a.id, b.id]);
        assert_eq!(positions(&service, user).await?, vec![1, 2, 3]);

        // Out of range requests clamp to the ends
        let moved = service
            .update_content(c.id, ContentUpdate::new().with_position(99))
            .await?;
        assert_eq!(moved.position, 3);
        let order: Vec<_> = service.list_roots(user).await?.iter().map(|r| r.id).collect();
        assert_eq!(order, vec![a.id, b.id, c.id]);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_root_sets_and_clears_alias() -> Result<()> {
        let (service, _temp_dir) = create_test_service().await?;
        let root = service.create_root(UserId::new_v4()).await?;

        let named = service.update_root(root.id, Some("Landing Page".to_string())).await?;
        assert_eq!(named.alias.as_deref(), Some("Landing Page"));
        assert_eq!(
            service.get_content(root.id).await?.alias.as_deref(),
            Some("Landing Page")
        );

        service.update_root(root.id, None).await?;
        assert_eq!(service.get_content(root.id).await?.alias, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_root_reclaims_tree() -> Result<()> {
        let (service, _temp_dir) = create_test_service().await?;
        let user = UserId::new_v4();
        let root = service.create_root(user).await?;

        let p1 = service.add_item_property(root.id, root.id).await?;
        let child = p1.content_id.unwrap();
        service.add_property_to_list_row(child, 0, root.id).await?;
        service.add_property_to_list_row(child, 2, root.id).await?;

        let report = service.delete_root(root.id).await?;

        assert_eq!(report.deleted_property_ids.len(), 3);
        assert_eq!(report.deleted_content_ids.len(), 3);
        let remaining = service
            .store()
            .query_contents(ContentQuery::tree(root.id))
            .await?;
        assert!(remaining.is_empty());
        assert!(service.list_roots(user).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_root_is_not_found() -> Result<()> {
        let (service, _temp_dir) = create_test_service().await?;
        let root = service.create_root(UserId::new_v4()).await?;
        service.delete_root(root.id).await?;

        let err = service.delete_root(root.id).await.unwrap_err();
        assert!(matches!(err, ContentServiceError::ContentNotFound { .. }));
        let err = service.update_root(root.id, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_roots_of_unknown_user_is_empty() -> Result<()> {
        let (service, _temp_dir) = create_test_service().await?;

        assert!(service.list_roots(UserId::new_v4()).await?.is_empty());
        Ok(())
    }
}
