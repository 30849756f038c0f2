//! Bulk import: uploaded files are parsed into [`ApiDraft`]s for review,
//! then committed as API entities in a separate step.

pub mod csv;
pub mod pdf;
pub mod postman;

use std::path::Path;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::validate::non_blank;
use crate::models::ApiDraft;
use crate::repositories::CatalogStore;
use crate::services::{ApiService, CategoryService};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImportFormat {
    Csv,
    Pdf,
    Postman,
}

impl ImportFormat {
    /// Declared content type first, then the file extension
    pub fn detect(content_type: Option<&str>, file_name: &str) -> Option<Self> {
        let essence = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase());

        match essence.as_deref() {
            Some("text/csv") | Some("application/csv") => return Some(ImportFormat::Csv),
            Some("application/pdf") => return Some(ImportFormat::Pdf),
            Some("application/json") => return Some(ImportFormat::Postman),
            _ => {}
        }

        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => Some(ImportFormat::Csv),
            Some("pdf") => Some(ImportFormat::Pdf),
            Some("json") => Some(ImportFormat::Postman),
            _ => None,
        }
    }
}

/// One file taken from a multipart upload
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Preview outcome for one file; `error` is set when it could not be parsed
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileImportResult {
    pub file_name: String,
    pub format: Option<ImportFormat>,
    pub drafts: Vec<ApiDraft>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftFailure {
    /// Position of the draft in the committed list
    pub index: usize,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommitReport {
    pub created: Vec<Uuid>,
    pub failures: Vec<DraftFailure>,
}

pub struct ImportService;

impl ImportService {
    /// Parse every file independently; one bad file never hides the others
    pub async fn preview(files: Vec<UploadedFile>) -> Vec<FileImportResult> {
        let mut results = Vec::with_capacity(files.len());
        for file in files {
            results.push(Self::preview_file(file).await);
        }
        results
    }

    pub async fn preview_file(file: UploadedFile) -> FileImportResult {
        let file_name = file.file_name.clone();
        let format = ImportFormat::detect(file.content_type.as_deref(), &file.file_name);

        let parsed = match format {
            Some(format) => Self::parse(format, file).await,
            None => Err(AppError::import(
                &file_name,
                "unsupported file type (expected CSV, PDF or Postman JSON)",
            )),
        };

        match parsed {
            Ok(drafts) => {
                tracing::info!(file = %file_name, ?format, drafts = drafts.len(), "Import file parsed");
                FileImportResult {
                    file_name,
                    format,
                    drafts,
                    error: None,
                }
            }
            Err(err) => {
                tracing::warn!(file = %file_name, error = %err, "Import file rejected");
                FileImportResult {
                    file_name,
                    format,
                    drafts: Vec::new(),
                    error: Some(err.to_string()),
                }
            }
        }
    }

    async fn parse(format: ImportFormat, file: UploadedFile) -> AppResult<Vec<ApiDraft>> {
        match format {
            ImportFormat::Csv => csv::parse(&file.file_name, &file.bytes),
            ImportFormat::Postman => postman::parse(&file.file_name, &file.bytes),
            ImportFormat::Pdf => {
                let name = file.file_name.clone();
                tokio::task::spawn_blocking(move || pdf::parse(&file.file_name, &file.bytes))
                    .await
                    .map_err(|e| AppError::import(name, format!("text extraction failed ({e})")))?
            }
        }
    }

    /// Create an entity per draft. Categories named by drafts are matched
    /// case-insensitively and created when missing.
    pub async fn commit(store: &dyn CatalogStore, drafts: Vec<ApiDraft>) -> CommitReport {
        let mut report = CommitReport::default();

        for (index, draft) in drafts.into_iter().enumerate() {
            match Self::commit_one(store, draft).await {
                Ok(id) => report.created.push(id),
                Err(err) => {
                    tracing::warn!(index, error = %err, "Draft not imported");
                    report.failures.push(DraftFailure {
                        index,
                        error: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            created = report.created.len(),
            failed = report.failures.len(),
            "Import committed"
        );
        report
    }

    async fn commit_one(store: &dyn CatalogStore, mut draft: ApiDraft) -> AppResult<Uuid> {
        let category = non_blank(draft.category.take());
        let mut entity = draft.into_entity()?;
        entity.validate()?;

        if let Some(name) = category {
            entity.category_id = Some(CategoryService::resolve_or_create(store, &name).await?.id);
        }

        Ok(ApiService::create(store, entity).await?.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApiFilter;
    use crate::repositories::InMemoryStore;

    fn upload(name: &str, content_type: Option<&str>, body: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: content_type.map(str::to_string),
            bytes: body.as_bytes().to_vec(),
        }
    }

    fn draft(name: &str, category: Option<&str>) -> ApiDraft {
        ApiDraft {
            name: Some(name.to_string()),
            endpoint: Some(format!("/{}", name.to_lowercase())),
            category: category.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(
            ImportFormat::detect(Some("text/csv; charset=utf-8"), "x.bin"),
            Some(ImportFormat::Csv)
        );
        assert_eq!(
            ImportFormat::detect(Some("application/octet-stream"), "Spec.PDF"),
            Some(ImportFormat::Pdf)
        );
        assert_eq!(ImportFormat::detect(None, "coll.json"), Some(ImportFormat::Postman));
        assert_eq!(ImportFormat::detect(None, "notes.txt"), None);
    }

    #[tokio::test]
    async fn test_preview_isolates_failures() {
        let results = ImportService::preview(vec![
            upload("bad.json", None, "{ nope"),
            upload("good.csv", Some("text/csv"), "name,endpoint\nA,/a\n"),
            upload("notes.txt", None, "hello"),
        ])
        .await;

        assert_eq!(results.len(), 3);
        assert!(results[0].error.is_some());
        assert!(results[1].error.is_none());
        assert_eq!(results[1].drafts.len(), 1);
        assert_eq!(results[2].format, None);
        assert!(results[2].error.as_deref().unwrap().contains("unsupported"));
    }

    #[tokio::test]
    async fn test_commit_resolves_categories() {
        let store = InMemoryStore::new();
        let existing = CategoryService::create(
            &store,
            crate::models::CategoryInput::new("Payments", None),
        )
        .await
        .unwrap();

        let report = ImportService::commit(
            &store,
            vec![
                draft("Charge", Some("payments")),
                draft("Login", Some("Auth")),
                draft("Logout", Some("AUTH")),
                ApiDraft::from_raw_text("page one"),
            ],
        )
        .await;

        assert_eq!(report.created.len(), 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 3);

        let categories = store.list_categories().await.unwrap();
        assert_eq!(categories.len(), 2);

        let charge = store.find_api(report.created[0]).await.unwrap();
        assert_eq!(charge.entity.category_id, Some(existing.id));

        let login = store.find_api(report.created[1]).await.unwrap();
        let logout = store.find_api(report.created[2]).await.unwrap();
        assert_eq!(login.entity.category_id, logout.entity.category_id);
        assert_ne!(login.entity.category_id, Some(existing.id));
    }

    #[tokio::test]
    async fn test_invalid_draft_creates_nothing() {
        let store = InMemoryStore::new();
        let mut bad = draft("Broken", Some("New"));
        bad.response_example = Some("{".to_string());

        let report = ImportService::commit(&store, vec![bad]).await;

        assert!(report.created.is_empty());
        assert!(report.failures[0].error.contains("exampleResponseBody"));
        assert!(store.list_categories().await.unwrap().is_empty());
        assert!(store
            .list_apis(&ApiFilter::default())
            .await
            .unwrap()
            .is_empty());
    }
}
