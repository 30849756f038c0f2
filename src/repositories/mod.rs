pub mod memory;
pub mod mongo;
pub mod postgres;

pub use memory::InMemoryStore;
pub use mongo::MongoStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    ApiEntity, ApiFilter, ApiRecord, Category, CategoryInput, LegacyApi, LegacyApiRecord,
    SchemaDefinition, SchemaTemplate,
};

/// Persistence contract shared by every storage backend.
///
/// Inputs are already validated by the service layer. Every call is a
/// single-record round trip; nothing spans records atomically.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Backend name for health reporting
    fn backend(&self) -> &'static str;

    /// Connectivity probe
    async fn ping(&self) -> AppResult<()>;

    // Categories

    async fn list_categories(&self) -> AppResult<Vec<Category>>;

    async fn find_category(&self, id: Uuid) -> AppResult<Category>;

    /// Case-insensitive exact name lookup
    async fn find_category_by_name(&self, name: &str) -> AppResult<Option<Category>>;

    async fn insert_category(&self, input: &CategoryInput) -> AppResult<Category>;

    async fn update_category(&self, id: Uuid, input: &CategoryInput) -> AppResult<Category>;

    async fn delete_category(&self, id: Uuid) -> AppResult<()>;

    // Schema templates

    async fn list_schemas(&self) -> AppResult<Vec<SchemaTemplate>>;

    async fn find_schema(&self, id: Uuid) -> AppResult<SchemaTemplate>;

    async fn insert_schema(&self, definition: &SchemaDefinition) -> AppResult<SchemaTemplate>;

    async fn update_schema(
        &self,
        id: Uuid,
        definition: &SchemaDefinition,
    ) -> AppResult<SchemaTemplate>;

    async fn delete_schema(&self, id: Uuid) -> AppResult<()>;

    // API entities

    /// Matching entities, oldest first
    async fn list_apis(&self, filter: &ApiFilter) -> AppResult<Vec<ApiRecord>>;

    async fn find_api(&self, id: Uuid) -> AppResult<ApiRecord>;

    async fn insert_api(&self, entity: &ApiEntity) -> AppResult<ApiRecord>;

    /// Insert under a caller-chosen id, or overwrite the existing record
    async fn upsert_api(&self, id: Uuid, entity: &ApiEntity) -> AppResult<ApiRecord>;

    /// Full overwrite of an existing record
    async fn replace_api(&self, id: Uuid, entity: &ApiEntity) -> AppResult<ApiRecord>;

    async fn delete_api(&self, id: Uuid) -> AppResult<()>;

    async fn count_apis(&self) -> AppResult<u64>;

    // Legacy collection

    async fn list_legacy_apis(&self) -> AppResult<Vec<LegacyApiRecord>>;

    async fn insert_legacy_api(&self, id: &str, api: &LegacyApi) -> AppResult<LegacyApiRecord>;
}
