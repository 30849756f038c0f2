use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{migrated_id, LegacyApi, LegacyApiRecord};
use crate::repositories::CatalogStore;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MigrationFailure {
    pub legacy_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub total: usize,
    pub migrated: usize,
    pub failures: Vec<MigrationFailure>,
}

pub struct MigrationService;

impl MigrationService {
    /// Copy every legacy record into the current shape.
    ///
    /// Each record is upserted under an id derived from its legacy id, so
    /// running this again overwrites instead of duplicating. Records are
    /// written one at a time; a failure is reported and the rest continue.
    /// Legacy records are left in place.
    pub async fn migrate_legacy(store: &dyn CatalogStore) -> AppResult<MigrationReport> {
        let records = store.list_legacy_apis().await?;
        let mut report = MigrationReport {
            total: records.len(),
            ..Default::default()
        };

        for record in records {
            match Self::migrate_one(store, &record).await {
                Ok(id) => {
                    tracing::debug!(legacy_id = %record.id, api_id = %id, "Legacy API migrated");
                    report.migrated += 1;
                }
                Err(err) => {
                    tracing::warn!(legacy_id = %record.id, error = %err, "Legacy API not migrated");
                    report.failures.push(MigrationFailure {
                        legacy_id: record.id.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            total = report.total,
            migrated = report.migrated,
            failed = report.failures.len(),
            "Legacy migration finished"
        );
        Ok(report)
    }

    async fn migrate_one(store: &dyn CatalogStore, record: &LegacyApiRecord) -> AppResult<Uuid> {
        let entity = record.api.clone().upgrade()?;
        entity.validate()?;

        let id = migrated_id(&record.id);
        store.upsert_api(id, &entity).await?;
        Ok(id)
    }

    /// Store a record in the legacy collection (seeding and backfill)
    pub async fn insert_legacy(
        store: &dyn CatalogStore,
        id: Option<String>,
        api: LegacyApi,
    ) -> AppResult<LegacyApiRecord> {
        api.validate()?;
        let id = id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let record = store.insert_legacy_api(&id, &api).await?;
        tracing::info!(legacy_id = %record.id, "Legacy API stored");
        Ok(record)
    }
}
