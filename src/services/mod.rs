pub mod api_catalog;
pub mod catalog;
pub mod category;
pub mod import;
pub mod migration;
pub mod schema;

pub use api_catalog::ApiService;
pub use catalog::{ApiSummary, CatalogGroup, CatalogService, DashboardStats};
pub use category::CategoryService;
pub use import::{
    CommitReport, DraftFailure, FileImportResult, ImportFormat, ImportService, UploadedFile,
};
pub use migration::{MigrationFailure, MigrationReport, MigrationService};
pub use schema::SchemaService;
