use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::{CatalogGroup, CatalogService, DashboardStats};
use crate::state::AppState;

/// Browse categories with their APIs
#[utoipa::path(
    get,
    path = "/catalog",
    responses(
        (status = 200, description = "Categories by name, then uncategorized APIs", body = Vec<CatalogGroup>)
    ),
    tag = "Catalog"
)]
pub async fn browse_catalog(State(state): State<AppState>) -> AppResult<Json<Vec<CatalogGroup>>> {
    let groups = CatalogService::browse(state.store.as_ref()).await?;
    Ok(Json(groups))
}

#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Record counts", body = DashboardStats)
    ),
    tag = "Catalog"
)]
pub async fn dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardStats>> {
    let stats = CatalogService::dashboard(state.store.as_ref()).await?;
    Ok(Json(stats))
}
