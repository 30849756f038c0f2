use anyhow::Context;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_catalog::config::Config;
use api_catalog::handlers::{
    ApiListResponse, ApiRequest, ApiResponse, CategoryListResponse, CategoryRequest,
    CategoryResponse, HealthResponse, ImportCommitRequest, ImportPreviewResponse,
    LegacyApiListResponse, LegacyApiRequest, LegacyApiResponse, SchemaListResponse,
    SchemaResponse, WelcomeResponse,
};
use api_catalog::models::{
    ApiDraft, ApiEntity, DataType, FieldDescriptor, HttpMethod, KeyValue, LegacyApi,
    SchemaDefinition, StatusDescriptor,
};
use api_catalog::services::{
    ApiSummary, CatalogGroup, CommitReport, DashboardStats, DraftFailure, FileImportResult,
    ImportFormat, MigrationFailure, MigrationReport,
};
use api_catalog::state::AppState;
use api_catalog::{build_router, handlers};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::welcome,
        handlers::health::health_check,
        handlers::category::create_category,
        handlers::category::list_categories,
        handlers::category::get_category,
        handlers::category::update_category,
        handlers::category::delete_category,
        handlers::schema::create_schema,
        handlers::schema::list_schemas,
        handlers::schema::get_schema,
        handlers::schema::update_schema,
        handlers::schema::delete_schema,
        handlers::schema::apply_schema,
        handlers::api::create_api,
        handlers::api::list_apis,
        handlers::api::get_api,
        handlers::api::update_api,
        handlers::api::delete_api,
        handlers::import::preview_import,
        handlers::import::commit_import,
        handlers::migration::migrate_legacy_apis,
        handlers::migration::list_legacy_apis,
        handlers::migration::create_legacy_api,
        handlers::catalog::browse_catalog,
        handlers::catalog::dashboard,
    ),
    components(schemas(
        WelcomeResponse,
        HealthResponse,
        CategoryRequest,
        CategoryResponse,
        CategoryListResponse,
        SchemaDefinition,
        SchemaResponse,
        SchemaListResponse,
        FieldDescriptor,
        StatusDescriptor,
        KeyValue,
        HttpMethod,
        DataType,
        ApiEntity,
        ApiRequest,
        ApiResponse,
        ApiListResponse,
        ApiDraft,
        ImportFormat,
        FileImportResult,
        ImportPreviewResponse,
        ImportCommitRequest,
        DraftFailure,
        CommitReport,
        LegacyApi,
        LegacyApiRequest,
        LegacyApiResponse,
        LegacyApiListResponse,
        MigrationFailure,
        MigrationReport,
        ApiSummary,
        CatalogGroup,
        DashboardStats,
    )),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Categories", description = "Category management endpoints"),
        (name = "Schemas", description = "Reusable API schema templates"),
        (name = "APIs", description = "API definition management endpoints"),
        (name = "Import", description = "Bulk import from CSV, PDF and Postman collections"),
        (name = "Migration", description = "Legacy API records and their migration"),
        (name = "Catalog", description = "Read-only catalog browsing")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    let addr = config.server_addr();

    // Connect to the configured store
    tracing::info!(backend = ?config.store_backend, "Connecting to storage...");
    let state = AppState::new(config)
        .await
        .context("Failed to initialize application state")?;

    // Build the main application router
    let app = build_router(state)
        // Add Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Server started on http://{}", addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
