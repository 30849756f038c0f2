use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::common::{AppJson, AppPath};
use crate::handlers::ApiRequest;
use crate::models::{ApiEntity, SchemaDefinition, SchemaTemplate};
use crate::services::SchemaService;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchemaResponse {
    pub id: Uuid,
    #[serde(flatten)]
    pub definition: SchemaDefinition,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub updated_at: time::OffsetDateTime,
}

impl From<SchemaTemplate> for SchemaResponse {
    fn from(t: SchemaTemplate) -> Self {
        Self {
            id: t.id,
            definition: t.definition,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SchemaListResponse {
    pub data: Vec<SchemaResponse>,
    pub total: usize,
}

/// Create a schema template
#[utoipa::path(
    post,
    path = "/schemas",
    request_body = SchemaDefinition,
    responses(
        (status = 201, description = "Schema template created", body = SchemaResponse),
        (status = 400, description = "Validation error")
    ),
    tag = "Schemas"
)]
pub async fn create_schema(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SchemaDefinition>,
) -> AppResult<(StatusCode, Json<SchemaResponse>)> {
    let template = SchemaService::create(state.store.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(template.into())))
}

/// List schema templates
#[utoipa::path(
    get,
    path = "/schemas",
    responses(
        (status = 200, description = "List of schema templates", body = SchemaListResponse)
    ),
    tag = "Schemas"
)]
pub async fn list_schemas(State(state): State<AppState>) -> AppResult<Json<SchemaListResponse>> {
    let templates = state.store.list_schemas().await?;

    Ok(Json(SchemaListResponse {
        total: templates.len(),
        data: templates.into_iter().map(|t| t.into()).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/schemas/{id}",
    params(
        ("id" = Uuid, Path, description = "Schema template ID")
    ),
    responses(
        (status = 200, description = "Schema template", body = SchemaResponse),
        (status = 404, description = "Schema template not found")
    ),
    tag = "Schemas"
)]
pub async fn get_schema(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<SchemaResponse>> {
    let template = state.store.find_schema(id).await?;
    Ok(Json(template.into()))
}

/// Replace a schema template
#[utoipa::path(
    put,
    path = "/schemas/{id}",
    params(
        ("id" = Uuid, Path, description = "Schema template ID")
    ),
    request_body = SchemaDefinition,
    responses(
        (status = 200, description = "Schema template updated", body = SchemaResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Schema template not found")
    ),
    tag = "Schemas"
)]
pub async fn update_schema(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<SchemaDefinition>,
) -> AppResult<Json<SchemaResponse>> {
    let template = SchemaService::update(state.store.as_ref(), id, payload).await?;
    Ok(Json(template.into()))
}

#[utoipa::path(
    delete,
    path = "/schemas/{id}",
    params(
        ("id" = Uuid, Path, description = "Schema template ID")
    ),
    responses(
        (status = 204, description = "Schema template deleted"),
        (status = 404, description = "Schema template not found")
    ),
    tag = "Schemas"
)]
pub async fn delete_schema(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    SchemaService::delete(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Apply a template to an API definition and return the result.
/// Nothing is stored; the template is copied, not linked.
#[utoipa::path(
    post,
    path = "/schemas/{id}/apply",
    params(
        ("id" = Uuid, Path, description = "Schema template ID")
    ),
    request_body = ApiRequest,
    responses(
        (status = 200, description = "API definition with the template applied", body = ApiEntity),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Schema template not found")
    ),
    tag = "Schemas"
)]
pub async fn apply_schema(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<ApiRequest>,
) -> AppResult<Json<ApiEntity>> {
    let entity = payload.into_entity()?;
    let applied = SchemaService::apply(state.store.as_ref(), id, entity).await?;
    Ok(Json(applied))
}
