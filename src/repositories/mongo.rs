use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    ApiDocument, ApiEntity, ApiFilter, ApiRecord, Category, CategoryInput, LegacyApi,
    LegacyApiRecord, SchemaDefinition, SchemaTemplate,
};
use crate::repositories::CatalogStore;

const CATEGORIES: &str = "categories";
const SCHEMAS: &str = "schema_templates";
const APIS: &str = "apis";
const LEGACY_APIS: &str = "legacy_apis";

/// Document backend (MongoDB)
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryDoc {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    introduction: Option<String>,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaDoc {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    definition: SchemaDefinition,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

/// `name` and `categoryId` are copied out of the document for querying
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiDoc {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    category_id: Option<String>,
    document: ApiDocument,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

/// Legacy entries may carry either string or ObjectId ids
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyApiDoc {
    #[serde(rename = "_id")]
    id: Bson,
    #[serde(flatten)]
    api: LegacyApi,
}

fn from_bson_time(at: bson::DateTime) -> AppResult<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(at.timestamp_millis() as i128 * 1_000_000)
        .map_err(|e| AppError::Database(format!("Invalid timestamp: {}", e)))
}

fn parse_id(raw: &str) -> AppResult<Uuid> {
    raw.parse()
        .map_err(|_| AppError::Database(format!("Invalid document id: {}", raw)))
}

fn legacy_id(id: &Bson) -> String {
    match id {
        Bson::String(s) => s.clone(),
        Bson::ObjectId(oid) => oid.to_hex(),
        other => other.to_string(),
    }
}

/// Escape regex metacharacters so the term matches literally
fn regex_escape(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if "\\^$.|?*+()[]{}".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn api_filter_doc(filter: &ApiFilter) -> Document {
    let mut query = Document::new();
    if let Some(category_id) = filter.category_id {
        query.insert("categoryId", category_id.to_string());
    }
    if let Some(term) = filter.search.as_deref() {
        query.insert(
            "name",
            doc! { "$regex": regex_escape(term), "$options": "i" },
        );
    }
    query
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn categories(&self) -> Collection<CategoryDoc> {
        self.db.collection(CATEGORIES)
    }

    fn schemas(&self) -> Collection<SchemaDoc> {
        self.db.collection(SCHEMAS)
    }

    fn apis(&self) -> Collection<ApiDoc> {
        self.db.collection(APIS)
    }

    fn legacy(&self) -> Collection<LegacyApiDoc> {
        self.db.collection(LEGACY_APIS)
    }

    async fn write_api(
        &self,
        id: Uuid,
        entity: &ApiEntity,
        created_at: bson::DateTime,
    ) -> AppResult<ApiRecord> {
        let row = ApiDoc {
            id: id.to_string(),
            name: entity.name.clone(),
            category_id: entity.category_id.map(|c| c.to_string()),
            document: ApiDocument::current(entity.clone()),
            created_at,
            updated_at: bson::DateTime::now(),
        };

        self.apis()
            .replace_one(doc! { "_id": id.to_string() }, &row)
            .upsert(true)
            .await?;

        row.try_into()
    }
}

#[async_trait]
impl CatalogStore for MongoStore {
    fn backend(&self) -> &'static str {
        "mongo"
    }

    async fn ping(&self) -> AppResult<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let rows: Vec<CategoryDoc> = self
            .categories()
            .find(doc! {})
            .sort(doc! { "createdAt": 1 })
            .await?
            .try_collect()
            .await?;

        rows.into_iter().map(Category::try_from).collect()
    }

    async fn find_category(&self, id: Uuid) -> AppResult<Category> {
        self.categories()
            .find_one(doc! { "_id": id.to_string() })
            .await?
            .ok_or_else(|| AppError::NotFound("Category".to_string()))?
            .try_into()
    }

    async fn find_category_by_name(&self, name: &str) -> AppResult<Option<Category>> {
        let pattern = format!("^{}$", regex_escape(name.trim()));
        let row = self
            .categories()
            .find_one(doc! { "name": { "$regex": pattern, "$options": "i" } })
            .sort(doc! { "createdAt": 1 })
            .await?;

        row.map(Category::try_from).transpose()
    }

    async fn insert_category(&self, input: &CategoryInput) -> AppResult<Category> {
        let now = bson::DateTime::now();
        let row = CategoryDoc {
            id: Uuid::new_v4().to_string(),
            name: input.name.clone(),
            introduction: input.introduction.clone(),
            created_at: now,
            updated_at: now,
        };

        self.categories().insert_one(&row).await?;
        row.try_into()
    }

    async fn update_category(&self, id: Uuid, input: &CategoryInput) -> AppResult<Category> {
        let mut row = self
            .categories()
            .find_one(doc! { "_id": id.to_string() })
            .await?
            .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        row.name = input.name.clone();
        row.introduction = input.introduction.clone();
        row.updated_at = bson::DateTime::now();

        self.categories()
            .replace_one(doc! { "_id": id.to_string() }, &row)
            .await?;
        row.try_into()
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        let result = self
            .categories()
            .delete_one(doc! { "_id": id.to_string() })
            .await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound("Category".to_string()));
        }

        Ok(())
    }

    async fn list_schemas(&self) -> AppResult<Vec<SchemaTemplate>> {
        let rows: Vec<SchemaDoc> = self
            .schemas()
            .find(doc! {})
            .sort(doc! { "createdAt": 1 })
            .await?
            .try_collect()
            .await?;

        rows.into_iter().map(SchemaTemplate::try_from).collect()
    }

    async fn find_schema(&self, id: Uuid) -> AppResult<SchemaTemplate> {
        self.schemas()
            .find_one(doc! { "_id": id.to_string() })
            .await?
            .ok_or_else(|| AppError::NotFound("Schema".to_string()))?
            .try_into()
    }

    async fn insert_schema(&self, definition: &SchemaDefinition) -> AppResult<SchemaTemplate> {
        let now = bson::DateTime::now();
        let row = SchemaDoc {
            id: Uuid::new_v4().to_string(),
            name: definition.name.clone(),
            definition: definition.clone(),
            created_at: now,
            updated_at: now,
        };

        self.schemas().insert_one(&row).await?;
        row.try_into()
    }

    async fn update_schema(
        &self,
        id: Uuid,
        definition: &SchemaDefinition,
    ) -> AppResult<SchemaTemplate> {
        let mut row = self
            .schemas()
            .find_one(doc! { "_id": id.to_string() })
            .await?
            .ok_or_else(|| AppError::NotFound("Schema".to_string()))?;

        row.name = definition.name.clone();
        row.definition = definition.clone();
        row.updated_at = bson::DateTime::now();

        self.schemas()
            .replace_one(doc! { "_id": id.to_string() }, &row)
            .await?;
        row.try_into()
    }

    async fn delete_schema(&self, id: Uuid) -> AppResult<()> {
        let result = self
            .schemas()
            .delete_one(doc! { "_id": id.to_string() })
            .await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound("Schema".to_string()));
        }

        Ok(())
    }

    async fn list_apis(&self, filter: &ApiFilter) -> AppResult<Vec<ApiRecord>> {
        let rows: Vec<ApiDoc> = self
            .apis()
            .find(api_filter_doc(filter))
            .sort(doc! { "createdAt": 1 })
            .await?
            .try_collect()
            .await?;

        rows.into_iter().map(ApiRecord::try_from).collect()
    }

    async fn find_api(&self, id: Uuid) -> AppResult<ApiRecord> {
        self.apis()
            .find_one(doc! { "_id": id.to_string() })
            .await?
            .ok_or_else(|| AppError::NotFound("Api".to_string()))?
            .try_into()
    }

    async fn insert_api(&self, entity: &ApiEntity) -> AppResult<ApiRecord> {
        self.write_api(Uuid::new_v4(), entity, bson::DateTime::now())
            .await
    }

    async fn upsert_api(&self, id: Uuid, entity: &ApiEntity) -> AppResult<ApiRecord> {
        let created_at = self
            .apis()
            .find_one(doc! { "_id": id.to_string() })
            .await?
            .map(|row| row.created_at)
            .unwrap_or_else(bson::DateTime::now);

        self.write_api(id, entity, created_at).await
    }

    async fn replace_api(&self, id: Uuid, entity: &ApiEntity) -> AppResult<ApiRecord> {
        let existing = self
            .apis()
            .find_one(doc! { "_id": id.to_string() })
            .await?
            .ok_or_else(|| AppError::NotFound("Api".to_string()))?;

        self.write_api(id, entity, existing.created_at).await
    }

    async fn delete_api(&self, id: Uuid) -> AppResult<()> {
        let result = self
            .apis()
            .delete_one(doc! { "_id": id.to_string() })
            .await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound("Api".to_string()));
        }

        Ok(())
    }

    async fn count_apis(&self) -> AppResult<u64> {
        let count = self.apis().count_documents(doc! {}).await?;
        Ok(count)
    }

    async fn list_legacy_apis(&self) -> AppResult<Vec<LegacyApiRecord>> {
        let rows: Vec<LegacyApiDoc> = self.legacy().find(doc! {}).await?.try_collect().await?;

        Ok(rows
            .into_iter()
            .map(|row| LegacyApiRecord {
                id: legacy_id(&row.id),
                api: row.api,
            })
            .collect())
    }

    async fn insert_legacy_api(&self, id: &str, api: &LegacyApi) -> AppResult<LegacyApiRecord> {
        let row = LegacyApiDoc {
            id: Bson::String(id.to_string()),
            api: api.clone(),
        };

        self.legacy()
            .replace_one(doc! { "_id": id }, &row)
            .upsert(true)
            .await?;

        Ok(LegacyApiRecord {
            id: id.to_string(),
            api: api.clone(),
        })
    }
}

impl TryFrom<CategoryDoc> for Category {
    type Error = AppError;

    fn try_from(row: CategoryDoc) -> AppResult<Self> {
        Ok(Self {
            id: parse_id(&row.id)?,
            name: row.name,
            introduction: row.introduction,
            created_at: from_bson_time(row.created_at)?,
            updated_at: from_bson_time(row.updated_at)?,
        })
    }
}

impl TryFrom<SchemaDoc> for SchemaTemplate {
    type Error = AppError;

    fn try_from(row: SchemaDoc) -> AppResult<Self> {
        Ok(Self {
            id: parse_id(&row.id)?,
            definition: row.definition,
            created_at: from_bson_time(row.created_at)?,
            updated_at: from_bson_time(row.updated_at)?,
        })
    }
}

impl TryFrom<ApiDoc> for ApiRecord {
    type Error = AppError;

    fn try_from(row: ApiDoc) -> AppResult<Self> {
        Ok(Self {
            id: parse_id(&row.id)?,
            entity: row.document.into_current()?,
            created_at: from_bson_time(row.created_at)?,
            updated_at: from_bson_time(row.updated_at)?,
        })
    }
}
