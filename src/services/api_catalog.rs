use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{ApiEntity, ApiRecord};
use crate::repositories::CatalogStore;

/// Write path for API entities. Every write is validated first, so a
/// rejected entity never reaches the store.
pub struct ApiService;

impl ApiService {
    pub async fn create(store: &dyn CatalogStore, entity: ApiEntity) -> AppResult<ApiRecord> {
        entity.validate()?;
        let record = store.insert_api(&entity).await?;

        tracing::info!(
            api_id = %record.id,
            name = %record.entity.name,
            method = %record.entity.method,
            "API created"
        );
        Ok(record)
    }

    /// Full overwrite; `createdAt` is kept
    pub async fn update(
        store: &dyn CatalogStore,
        id: Uuid,
        entity: ApiEntity,
    ) -> AppResult<ApiRecord> {
        entity.validate()?;
        let record = store.replace_api(id, &entity).await?;

        tracing::info!(api_id = %id, name = %record.entity.name, "API updated");
        Ok(record)
    }

    pub async fn delete(store: &dyn CatalogStore, id: Uuid) -> AppResult<()> {
        store.delete_api(id).await?;

        tracing::info!(api_id = %id, "API deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{ApiFilter, HttpMethod};
    use crate::repositories::InMemoryStore;

    #[tokio::test]
    async fn test_invalid_entity_not_persisted() {
        let store = InMemoryStore::new();
        let mut entity = ApiEntity::new("Create user", "/users", HttpMethod::Post);
        entity.example_request_body = Some("{name:".to_string());

        let err = ApiService::create(&store, entity).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref msg) if msg.contains("exampleRequestBody")));
        assert_eq!(store.count_apis().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sequential_updates_last_wins() {
        let store = InMemoryStore::new();
        let created = ApiService::create(&store, ApiEntity::new("v0", "/x", HttpMethod::Get))
            .await
            .unwrap();

        ApiService::update(&store, created.id, ApiEntity::new("A", "/x", HttpMethod::Get))
            .await
            .unwrap();
        ApiService::update(&store, created.id, ApiEntity::new("B", "/x", HttpMethod::Put))
            .await
            .unwrap();

        let stored = store.find_api(created.id).await.unwrap();
        assert_eq!(stored.entity.name, "B");
        assert_eq!(stored.entity.method, HttpMethod::Put);
        assert_eq!(stored.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_failed_update_keeps_previous() {
        let store = InMemoryStore::new();
        let created = ApiService::create(&store, ApiEntity::new("ok", "/x", HttpMethod::Get))
            .await
            .unwrap();

        let mut bad = ApiEntity::new("bad", "/x", HttpMethod::Get);
        bad.graphql_variables = Some("{".to_string());
        assert!(ApiService::update(&store, created.id, bad).await.is_err());

        let all = store.list_apis(&ApiFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].entity.name, "ok");
    }
}
