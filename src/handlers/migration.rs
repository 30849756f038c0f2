use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::handlers::common::AppJson;
use crate::models::{LegacyApi, LegacyApiRecord};
use crate::services::{MigrationReport, MigrationService};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LegacyApiRequest {
    /// Legacy document id; generated when absent
    pub id: Option<String>,
    #[serde(flatten)]
    pub api: LegacyApi,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LegacyApiResponse {
    pub id: String,
    #[serde(flatten)]
    pub api: LegacyApi,
}

impl From<LegacyApiRecord> for LegacyApiResponse {
    fn from(r: LegacyApiRecord) -> Self {
        Self { id: r.id, api: r.api }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LegacyApiListResponse {
    pub data: Vec<LegacyApiResponse>,
    pub total: usize,
}

/// Copy every legacy API into the current shape (safe to re-run)
#[utoipa::path(
    post,
    path = "/migrations/legacy-apis",
    responses(
        (status = 200, description = "Migration report", body = MigrationReport)
    ),
    tag = "Migration"
)]
pub async fn migrate_legacy_apis(State(state): State<AppState>) -> AppResult<Json<MigrationReport>> {
    let report = MigrationService::migrate_legacy(state.store.as_ref()).await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/legacy-apis",
    responses(
        (status = 200, description = "Legacy API records", body = LegacyApiListResponse)
    ),
    tag = "Migration"
)]
pub async fn list_legacy_apis(
    State(state): State<AppState>,
) -> AppResult<Json<LegacyApiListResponse>> {
    let records = state.store.list_legacy_apis().await?;

    Ok(Json(LegacyApiListResponse {
        total: records.len(),
        data: records.into_iter().map(|r| r.into()).collect(),
    }))
}

/// Store a record in the legacy collection
#[utoipa::path(
    post,
    path = "/legacy-apis",
    request_body = LegacyApiRequest,
    responses(
        (status = 201, description = "Legacy record stored", body = LegacyApiResponse),
        (status = 400, description = "Validation error")
    ),
    tag = "Migration"
)]
pub async fn create_legacy_api(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LegacyApiRequest>,
) -> AppResult<(StatusCode, Json<LegacyApiResponse>)> {
    let record =
        MigrationService::insert_legacy(state.store.as_ref(), payload.id, payload.api).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}
