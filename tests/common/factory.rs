use serde_json::Value;
use uuid::Uuid;

use api_catalog::models::{
    ApiEntity, ApiRecord, Category, CategoryInput, HttpMethod, LegacyApi, LegacyApiRecord,
    SchemaDefinition, SchemaTemplate,
};
use api_catalog::services::{ApiService, CategoryService, MigrationService, SchemaService};
use api_catalog::state::AppState;

/// Factory for creating test data directly through the service layer
pub struct Factory<'a> {
    state: &'a AppState,
}

#[allow(dead_code)]
impl<'a> Factory<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn create_category(&self, name: &str) -> Category {
        CategoryService::create(self.state.store.as_ref(), CategoryInput::new(name, None))
            .await
            .unwrap()
    }

    pub async fn create_api(&self, name: &str, category_id: Option<Uuid>) -> ApiRecord {
        let mut entity = ApiEntity::new(
            name,
            format!("/{}", name.to_lowercase().replace(' ', "-")),
            HttpMethod::Get,
        );
        entity.category_id = category_id;

        ApiService::create(self.state.store.as_ref(), entity)
            .await
            .unwrap()
    }

    pub async fn create_schema(&self, definition: SchemaDefinition) -> SchemaTemplate {
        SchemaService::create(self.state.store.as_ref(), definition)
            .await
            .unwrap()
    }

    pub async fn create_legacy(&self, id: &str, document: Value) -> LegacyApiRecord {
        let api: LegacyApi = serde_json::from_value(document).unwrap();
        MigrationService::insert_legacy(self.state.store.as_ref(), Some(id.to_string()), api)
            .await
            .unwrap()
    }
}
