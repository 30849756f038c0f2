use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::common::{AppJson, AppPath};
use crate::models::{Category, CategoryInput};
use crate::services::CategoryService;
use crate::state::AppState;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryRequest {
    #[serde(default)]
    pub name: String,
    pub introduction: Option<String>,
}

impl From<CategoryRequest> for CategoryInput {
    fn from(req: CategoryRequest) -> Self {
        CategoryInput::new(req.name, req.introduction)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub introduction: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub updated_at: time::OffsetDateTime,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            introduction: c.introduction,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryListResponse {
    pub data: Vec<CategoryResponse>,
    pub total: usize,
}

// ============ Handlers ============

/// Create a category
#[utoipa::path(
    post,
    path = "/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation error")
    ),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CategoryRequest>,
) -> AppResult<(StatusCode, Json<CategoryResponse>)> {
    let category = CategoryService::create(state.store.as_ref(), payload.into()).await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

/// List all categories
#[utoipa::path(
    get,
    path = "/categories",
    responses(
        (status = 200, description = "List of categories", body = CategoryListResponse)
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<CategoryListResponse>> {
    let categories = state.store.list_categories().await?;

    Ok(Json(CategoryListResponse {
        total: categories.len(),
        data: categories.into_iter().map(|c| c.into()).collect(),
    }))
}

/// Get a category by ID
#[utoipa::path(
    get,
    path = "/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category details", body = CategoryResponse),
        (status = 404, description = "Category not found")
    ),
    tag = "Categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<CategoryResponse>> {
    let category = state.store.find_category(id).await?;
    Ok(Json(category.into()))
}

/// Replace a category's name and introduction
#[utoipa::path(
    put,
    path = "/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Category not found")
    ),
    tag = "Categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<CategoryRequest>,
) -> AppResult<Json<CategoryResponse>> {
    let category = CategoryService::update(state.store.as_ref(), id, payload.into()).await?;
    Ok(Json(category.into()))
}

/// Delete a category. APIs that reference it are kept.
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found")
    ),
    tag = "Categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    CategoryService::delete(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
