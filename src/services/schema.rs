use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{ApiEntity, SchemaDefinition, SchemaTemplate};
use crate::repositories::CatalogStore;

pub struct SchemaService;

impl SchemaService {
    pub async fn create(
        store: &dyn CatalogStore,
        definition: SchemaDefinition,
    ) -> AppResult<SchemaTemplate> {
        let definition = definition.normalized()?;
        let template = store.insert_schema(&definition).await?;

        tracing::info!(schema_id = %template.id, name = %definition.name, "Schema template created");
        Ok(template)
    }

    pub async fn update(
        store: &dyn CatalogStore,
        id: Uuid,
        definition: SchemaDefinition,
    ) -> AppResult<SchemaTemplate> {
        let definition = definition.normalized()?;
        let template = store.update_schema(id, &definition).await?;

        tracing::info!(schema_id = %id, "Schema template updated");
        Ok(template)
    }

    pub async fn delete(store: &dyn CatalogStore, id: Uuid) -> AppResult<()> {
        store.delete_schema(id).await?;

        tracing::info!(schema_id = %id, "Schema template deleted");
        Ok(())
    }

    /// Copy the template's shape onto `entity`. Nothing is persisted.
    pub async fn apply(
        store: &dyn CatalogStore,
        template_id: Uuid,
        entity: ApiEntity,
    ) -> AppResult<ApiEntity> {
        let template = store.find_schema(template_id).await?;
        Ok(entity.apply_template(&template))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{FieldDescriptor, FieldList, FieldType, HttpMethod, StatusDescriptor};
    use crate::repositories::InMemoryStore;

    fn definition() -> SchemaDefinition {
        SchemaDefinition {
            name: "Paged list".to_string(),
            query_params: FieldList::new()
                .push(FieldDescriptor::new("page", FieldType::Number, "Page index"))
                .push(FieldDescriptor::new("size", FieldType::Number, "Page size")),
            response_codes: vec![StatusDescriptor {
                code: 200,
                description: "OK".to_string(),
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_apply_copies_shape() {
        let store = InMemoryStore::new();
        let template = SchemaService::create(&store, definition()).await.unwrap();

        let entity = ApiEntity::new("List orders", "/orders", HttpMethod::Get);
        let applied = SchemaService::apply(&store, template.id, entity)
            .await
            .unwrap();

        let params = applied.query_params.unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params.as_slice()[1].name, "size");
        assert_eq!(applied.status_codes.unwrap()[0].code, 200);
    }

    #[tokio::test]
    async fn test_apply_is_not_linked() {
        let store = InMemoryStore::new();
        let template = SchemaService::create(&store, definition()).await.unwrap();
        let applied = SchemaService::apply(
            &store,
            template.id,
            ApiEntity::new("List orders", "/orders", HttpMethod::Get),
        )
        .await
        .unwrap();

        let mut changed = definition();
        changed.query_params = FieldList::new();
        SchemaService::update(&store, template.id, changed)
            .await
            .unwrap();

        assert_eq!(applied.query_params.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_apply_missing_template() {
        let store = InMemoryStore::new();
        let result = SchemaService::apply(
            &store,
            Uuid::new_v4(),
            ApiEntity::new("a", "/a", HttpMethod::Get),
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
