// Library crate for the API catalog service
// Exports modules for use by the server binary and tests

pub mod config;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod services;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    apply_schema, browse_catalog, commit_import, create_api, create_category, create_legacy_api,
    create_schema, dashboard, delete_api, delete_category, delete_schema, get_api, get_category,
    get_schema, health_check, list_apis, list_categories, list_legacy_apis, list_schemas,
    migrate_legacy_apis, preview_import, update_api, update_category, update_schema, welcome,
};
use crate::state::AppState;

/// Build the application router with the given state
pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health_check))
        // Category routes
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        // Schema template routes
        .route("/schemas", get(list_schemas).post(create_schema))
        .route(
            "/schemas/{id}",
            get(get_schema).put(update_schema).delete(delete_schema),
        )
        .route("/schemas/{id}/apply", post(apply_schema))
        // API routes
        .route("/apis", get(list_apis).post(create_api))
        .route("/apis/{id}", get(get_api).put(update_api).delete(delete_api))
        // Import routes
        .route("/import/preview", post(preview_import).layer(upload_limit))
        .route("/import/commit", post(commit_import))
        // Legacy collection and migration
        .route("/legacy-apis", get(list_legacy_apis).post(create_legacy_api))
        .route("/migrations/legacy-apis", post(migrate_legacy_apis))
        // Public catalog
        .route("/catalog", get(browse_catalog))
        .route("/dashboard", get(dashboard))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
