use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::handlers::common::AppJson;
use crate::models::ApiDraft;
use crate::services::{CommitReport, FileImportResult, ImportService, UploadedFile};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ImportPreviewResponse {
    pub files: Vec<FileImportResult>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ImportCommitRequest {
    pub drafts: Vec<ApiDraft>,
}

/// Parse uploaded files into drafts without storing anything.
///
/// Accepts any number of file fields. Each file gets its own result; a file
/// that fails to parse carries an `error` and does not affect the others.
#[utoipa::path(
    post,
    path = "/import/preview",
    request_body(content_type = "multipart/form-data", description = "CSV, PDF or Postman collection files"),
    responses(
        (status = 200, description = "Drafts per file", body = ImportPreviewResponse),
        (status = 400, description = "Malformed upload")
    ),
    tag = "Import"
)]
pub async fn preview_import(
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<ImportPreviewResponse>> {
    let mut multipart = multipart?;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::import(&file_name, format!("upload failed ({e})")))?;

        files.push(UploadedFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    if files.is_empty() {
        return Err(AppError::invalid_field("files", "at least one file is required"));
    }

    Ok(Json(ImportPreviewResponse {
        files: ImportService::preview(files).await,
    }))
}

/// Create API entities from reviewed drafts
#[utoipa::path(
    post,
    path = "/import/commit",
    request_body = ImportCommitRequest,
    responses(
        (status = 200, description = "Created ids and per-draft failures", body = CommitReport)
    ),
    tag = "Import"
)]
pub async fn commit_import(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ImportCommitRequest>,
) -> AppResult<Json<CommitReport>> {
    let report = ImportService::commit(state.store.as_ref(), payload.drafts).await;
    Ok(Json(report))
}
