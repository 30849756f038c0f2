use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::common::{parse_optional_id, AppJson, AppPath, AppQuery};
use crate::models::validate::non_blank;
use crate::models::{
    ApiEntity, ApiFilter, ApiRecord, DataType, FieldDescriptor, FieldList, HttpMethod, KeyValue,
    StatusDescriptor,
};
use crate::services::ApiService;
use crate::state::AppState;

// ============ Request/Response DTOs ============

/// Full API definition, used for create and (full-replace) update.
///
/// `method`, `dataType` and `categoryId` are taken as text so a bad value
/// is reported as a validation error naming the field.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub endpoint: String,
    #[schema(example = "GET")]
    pub method: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    #[serde(default)]
    pub requires_auth: bool,
    pub headers: Option<Vec<FieldDescriptor>>,
    pub query_params: Option<Vec<FieldDescriptor>>,
    pub request_body: Option<Vec<FieldDescriptor>>,
    pub response_body: Option<Vec<FieldDescriptor>>,
    pub status_codes: Option<Vec<StatusDescriptor>>,
    pub example_request_body: Option<String>,
    pub example_response_body: Option<String>,
    pub example_integration: Option<String>,
    #[schema(example = "raw")]
    pub data_type: Option<String>,
    #[serde(default)]
    pub form_data: Vec<KeyValue>,
    pub graphql_query: Option<String>,
    pub graphql_variables: Option<String>,
}

impl ApiRequest {
    pub fn into_entity(self) -> AppResult<ApiEntity> {
        let method = match non_blank(self.method) {
            Some(raw) => raw.parse::<HttpMethod>()?,
            None => HttpMethod::Get,
        };
        let data_type = match non_blank(self.data_type) {
            Some(raw) => raw.parse::<DataType>()?,
            None => DataType::default(),
        };

        Ok(ApiEntity {
            name: self.name.trim().to_string(),
            endpoint: self.endpoint.trim().to_string(),
            method,
            description: non_blank(self.description),
            category_id: parse_optional_id("categoryId", self.category_id)?,
            requires_auth: self.requires_auth,
            headers: self.headers.map(FieldList::from),
            query_params: self.query_params.map(FieldList::from),
            request_body: self.request_body.map(FieldList::from),
            response_body: self.response_body.map(FieldList::from),
            status_codes: self.status_codes,
            example_request_body: non_blank(self.example_request_body),
            example_response_body: non_blank(self.example_response_body),
            example_integration: non_blank(self.example_integration),
            data_type,
            form_data: FieldList::from(self.form_data),
            graphql_query: non_blank(self.graphql_query),
            graphql_variables: non_blank(self.graphql_variables),
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub id: Uuid,
    #[serde(flatten)]
    pub api: ApiEntity,
    /// Request body implied by `dataType`
    pub effective_request_body: Option<Value>,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub updated_at: time::OffsetDateTime,
}

impl From<ApiRecord> for ApiResponse {
    fn from(r: ApiRecord) -> Self {
        Self {
            id: r.id,
            effective_request_body: r.entity.effective_request_body(),
            api: r.entity,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiListResponse {
    pub data: Vec<ApiResponse>,
    pub total: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ApiListParams {
    /// Only APIs in this category
    pub category_id: Option<Uuid>,
    /// Case-insensitive substring of the name
    pub search: Option<String>,
}

// ============ Handlers ============

/// Create an API definition
#[utoipa::path(
    post,
    path = "/apis",
    request_body = ApiRequest,
    responses(
        (status = 201, description = "API created", body = ApiResponse),
        (status = 400, description = "Validation error")
    ),
    tag = "APIs"
)]
pub async fn create_api(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ApiRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse>)> {
    let entity = payload.into_entity()?;
    let record = ApiService::create(state.store.as_ref(), entity).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// List APIs, optionally filtered by category and name
#[utoipa::path(
    get,
    path = "/apis",
    params(ApiListParams),
    responses(
        (status = 200, description = "List of APIs, oldest first", body = ApiListResponse)
    ),
    tag = "APIs"
)]
pub async fn list_apis(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ApiListParams>,
) -> AppResult<Json<ApiListResponse>> {
    let filter = ApiFilter::new(params.category_id, params.search);
    let records = state.store.list_apis(&filter).await?;

    Ok(Json(ApiListResponse {
        total: records.len(),
        data: records.into_iter().map(|r| r.into()).collect(),
    }))
}

/// Get an API by ID
#[utoipa::path(
    get,
    path = "/apis/{id}",
    params(
        ("id" = Uuid, Path, description = "API ID")
    ),
    responses(
        (status = 200, description = "API details", body = ApiResponse),
        (status = 404, description = "API not found")
    ),
    tag = "APIs"
)]
pub async fn get_api(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse>> {
    let record = state.store.find_api(id).await?;
    Ok(Json(record.into()))
}

/// Replace an API definition
#[utoipa::path(
    put,
    path = "/apis/{id}",
    params(
        ("id" = Uuid, Path, description = "API ID")
    ),
    request_body = ApiRequest,
    responses(
        (status = 200, description = "API updated", body = ApiResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "API not found")
    ),
    tag = "APIs"
)]
pub async fn update_api(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<ApiRequest>,
) -> AppResult<Json<ApiResponse>> {
    let entity = payload.into_entity()?;
    let record = ApiService::update(state.store.as_ref(), id, entity).await?;
    Ok(Json(record.into()))
}

/// Delete an API
#[utoipa::path(
    delete,
    path = "/apis/{id}",
    params(
        ("id" = Uuid, Path, description = "API ID")
    ),
    responses(
        (status = 204, description = "API deleted"),
        (status = 404, description = "API not found")
    ),
    tag = "APIs"
)]
pub async fn delete_api(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    ApiService::delete(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: ApiRequest =
            serde_json::from_value(serde_json::json!({"name": " Ping ", "endpoint": "/ping"}))
                .unwrap();
        let entity = request.into_entity().unwrap();

        assert_eq!(entity.name, "Ping");
        assert_eq!(entity.method, HttpMethod::Get);
        assert_eq!(entity.data_type, DataType::Raw);
        assert_eq!(entity.headers, None);
    }

    #[test]
    fn test_request_bad_enums_name_field() {
        let request = ApiRequest {
            method: Some("YEET".to_string()),
            ..Default::default()
        };
        assert!(request.into_entity().unwrap_err().to_string().contains("method"));

        let request = ApiRequest {
            data_type: Some("xml".to_string()),
            ..Default::default()
        };
        assert!(request.into_entity().unwrap_err().to_string().contains("dataType"));
    }
}
