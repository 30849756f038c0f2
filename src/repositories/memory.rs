use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    ApiDocument, ApiEntity, ApiFilter, ApiRecord, Category, CategoryInput, LegacyApi,
    LegacyApiRecord, SchemaDefinition, SchemaTemplate,
};
use crate::repositories::CatalogStore;

/// In-process store for tests and local runs
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<InMemoryStoreInner>>,
}

#[derive(Default)]
struct InMemoryStoreInner {
    next_seq: u64,
    categories: HashMap<Uuid, (u64, Category)>,
    schemas: HashMap<Uuid, (u64, SchemaTemplate)>,
    apis: HashMap<Uuid, StoredApi>,
    legacy: HashMap<String, (u64, LegacyApi)>,
}

struct StoredApi {
    seq: u64,
    document: ApiDocument,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl StoredApi {
    fn to_record(&self, id: Uuid) -> AppResult<ApiRecord> {
        Ok(ApiRecord {
            id,
            entity: self.document.clone().into_current()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl InMemoryStoreInner {
    fn seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

/// Values sorted by insertion sequence
fn ordered<T: Clone>(items: impl Iterator<Item = (u64, T)>) -> Vec<T> {
    let mut items: Vec<(u64, T)> = items.collect();
    items.sort_by_key(|(seq, _)| *seq);
    items.into_iter().map(|(_, item)| item).collect()
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let inner = self.inner.read().await;
        Ok(ordered(inner.categories.values().map(|(s, c)| (*s, c.clone()))))
    }

    async fn find_category(&self, id: Uuid) -> AppResult<Category> {
        let inner = self.inner.read().await;
        inner
            .categories
            .get(&id)
            .map(|(_, c)| c.clone())
            .ok_or_else(|| AppError::NotFound("Category".to_string()))
    }

    async fn find_category_by_name(&self, name: &str) -> AppResult<Option<Category>> {
        let needle = name.trim().to_lowercase();
        let categories = self.list_categories().await?;
        Ok(categories
            .into_iter()
            .find(|c| c.name.to_lowercase() == needle))
    }

    async fn insert_category(&self, input: &CategoryInput) -> AppResult<Category> {
        let mut inner = self.inner.write().await;
        let now = OffsetDateTime::now_utc();
        let category = Category {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            introduction: input.introduction.clone(),
            created_at: now,
            updated_at: now,
        };
        let seq = inner.seq();
        inner.categories.insert(category.id, (seq, category.clone()));
        Ok(category)
    }

    async fn update_category(&self, id: Uuid, input: &CategoryInput) -> AppResult<Category> {
        let mut inner = self.inner.write().await;
        let (_, category) = inner
            .categories
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Category".to_string()))?;
        category.name = input.name.clone();
        category.introduction = input.introduction.clone();
        category.updated_at = OffsetDateTime::now_utc();
        Ok(category.clone())
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .categories
            .remove(&id)
            .ok_or_else(|| AppError::NotFound("Category".to_string()))?;
        Ok(())
    }

    async fn list_schemas(&self) -> AppResult<Vec<SchemaTemplate>> {
        let inner = self.inner.read().await;
        Ok(ordered(inner.schemas.values().map(|(s, t)| (*s, t.clone()))))
    }

    async fn find_schema(&self, id: Uuid) -> AppResult<SchemaTemplate> {
        let inner = self.inner.read().await;
        inner
            .schemas
            .get(&id)
            .map(|(_, t)| t.clone())
            .ok_or_else(|| AppError::NotFound("Schema".to_string()))
    }

    async fn insert_schema(&self, definition: &SchemaDefinition) -> AppResult<SchemaTemplate> {
        let mut inner = self.inner.write().await;
        let now = OffsetDateTime::now_utc();
        let template = SchemaTemplate {
            id: Uuid::new_v4(),
            definition: definition.clone(),
            created_at: now,
            updated_at: now,
        };
        let seq = inner.seq();
        inner.schemas.insert(template.id, (seq, template.clone()));
        Ok(template)
    }

    async fn update_schema(
        &self,
        id: Uuid,
        definition: &SchemaDefinition,
    ) -> AppResult<SchemaTemplate> {
        let mut inner = self.inner.write().await;
        let (_, template) = inner
            .schemas
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Schema".to_string()))?;
        template.definition = definition.clone();
        template.updated_at = OffsetDateTime::now_utc();
        Ok(template.clone())
    }

    async fn delete_schema(&self, id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .schemas
            .remove(&id)
            .ok_or_else(|| AppError::NotFound("Schema".to_string()))?;
        Ok(())
    }

    async fn list_apis(&self, filter: &ApiFilter) -> AppResult<Vec<ApiRecord>> {
        let inner = self.inner.read().await;
        let mut stored: Vec<(&Uuid, &StoredApi)> = inner.apis.iter().collect();
        stored.sort_by_key(|(_, api)| api.seq);

        let mut records = Vec::with_capacity(stored.len());
        for (id, api) in stored {
            let record = api.to_record(*id)?;
            if filter.matches(&record.entity) {
                records.push(record);
            }
        }
        Ok(records)
    }

    async fn find_api(&self, id: Uuid) -> AppResult<ApiRecord> {
        let inner = self.inner.read().await;
        inner
            .apis
            .get(&id)
            .ok_or_else(|| AppError::NotFound("Api".to_string()))?
            .to_record(id)
    }

    async fn insert_api(&self, entity: &ApiEntity) -> AppResult<ApiRecord> {
        self.upsert_api(Uuid::new_v4(), entity).await
    }

    async fn upsert_api(&self, id: Uuid, entity: &ApiEntity) -> AppResult<ApiRecord> {
        let mut inner = self.inner.write().await;
        let now = OffsetDateTime::now_utc();
        let existing = inner.apis.get(&id).map(|api| (api.seq, api.created_at));
        let (seq, created_at) = match existing {
            Some(kept) => kept,
            None => (inner.seq(), now),
        };
        let stored = StoredApi {
            seq,
            document: ApiDocument::current(entity.clone()),
            created_at,
            updated_at: now,
        };
        let record = stored.to_record(id)?;
        inner.apis.insert(id, stored);
        Ok(record)
    }

    async fn replace_api(&self, id: Uuid, entity: &ApiEntity) -> AppResult<ApiRecord> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .apis
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Api".to_string()))?;
        stored.document = ApiDocument::current(entity.clone());
        stored.updated_at = OffsetDateTime::now_utc();
        stored.to_record(id)
    }

    async fn delete_api(&self, id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .apis
            .remove(&id)
            .ok_or_else(|| AppError::NotFound("Api".to_string()))?;
        Ok(())
    }

    async fn count_apis(&self) -> AppResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner.apis.len() as u64)
    }

    async fn list_legacy_apis(&self) -> AppResult<Vec<LegacyApiRecord>> {
        let inner = self.inner.read().await;
        Ok(ordered(inner.legacy.iter().map(|(id, (seq, api))| {
            (
                *seq,
                LegacyApiRecord {
                    id: id.clone(),
                    api: api.clone(),
                },
            )
        })))
    }

    async fn insert_legacy_api(&self, id: &str, api: &LegacyApi) -> AppResult<LegacyApiRecord> {
        let mut inner = self.inner.write().await;
        let existing = inner.legacy.get(id).map(|(seq, _)| *seq);
        let seq = match existing {
            Some(seq) => seq,
            None => inner.seq(),
        };
        inner.legacy.insert(id.to_string(), (seq, api.clone()));
        Ok(LegacyApiRecord {
            id: id.to_string(),
            api: api.clone(),
        })
    }
}
