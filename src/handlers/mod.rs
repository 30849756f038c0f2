pub mod api;
pub mod catalog;
pub mod category;
pub mod common;
pub mod health;
pub mod import;
pub mod migration;
pub mod schema;

pub use api::{
    create_api, delete_api, get_api, list_apis, update_api, ApiListParams, ApiListResponse,
    ApiRequest, ApiResponse,
};
pub use catalog::{browse_catalog, dashboard};
pub use category::{
    create_category, delete_category, get_category, list_categories, update_category,
    CategoryListResponse, CategoryRequest, CategoryResponse,
};
pub use health::{health_check, welcome, HealthResponse, WelcomeResponse};
pub use import::{commit_import, preview_import, ImportCommitRequest, ImportPreviewResponse};
pub use migration::{
    create_legacy_api, list_legacy_apis, migrate_legacy_apis, LegacyApiListResponse,
    LegacyApiRequest, LegacyApiResponse,
};
pub use schema::{
    apply_schema, create_schema, delete_schema, get_schema, list_schemas, update_schema,
    SchemaListResponse, SchemaResponse,
};
