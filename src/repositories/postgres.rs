use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, LikeExpr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select, Set,
};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::entity::api::{self, Entity as ApiTable};
use crate::entity::category::{self, Entity as CategoryTable};
use crate::entity::legacy_api::{self, Entity as LegacyApiTable};
use crate::entity::schema_template::{self, Entity as SchemaTable};
use crate::error::{AppError, AppResult};
use crate::models::{
    ApiDocument, ApiEntity, ApiFilter, ApiRecord, Category, CategoryInput, LegacyApi,
    LegacyApiRecord, SchemaDefinition, SchemaTemplate,
};
use crate::repositories::CatalogStore;

/// Relational backend (PostgreSQL through SeaORM)
#[derive(Clone)]
pub struct PostgresStore {
    db: DatabaseConnection,
}

impl PostgresStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// `%term%` with LIKE wildcards in the term escaped
fn like_pattern(term: &str) -> LikeExpr {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    LikeExpr::new(format!("%{}%", escaped)).escape('\\')
}

/// Filtered API query, oldest first
fn api_query(filter: &ApiFilter) -> Select<ApiTable> {
    let mut query = ApiTable::find();

    if let Some(category_id) = filter.category_id {
        query = query.filter(api::Column::CategoryId.eq(category_id));
    }
    if let Some(term) = filter.search.as_deref() {
        query = query.filter(
            Expr::expr(Func::lower(Expr::col(api::Column::Name))).like(like_pattern(term)),
        );
    }

    query.order_by_asc(api::Column::CreatedAt)
}

fn encode<T: serde::Serialize>(value: &T) -> AppResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(format!("JSON encode: {}", e)))
}

fn decode<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> AppResult<T> {
    serde_json::from_value(value).map_err(|e| AppError::Database(format!("JSON decode: {}", e)))
}

#[async_trait]
impl CatalogStore for PostgresStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> AppResult<()> {
        self.db.ping().await?;
        Ok(())
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let models = CategoryTable::find()
            .order_by_asc(category::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn find_category(&self, id: Uuid) -> AppResult<Category> {
        let model = CategoryTable::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        Ok(model.into())
    }

    async fn find_category_by_name(&self, name: &str) -> AppResult<Option<Category>> {
        let model = CategoryTable::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(category::Column::Name)))
                    .eq(name.trim().to_lowercase()),
            )
            .order_by_asc(category::Column::CreatedAt)
            .one(&self.db)
            .await?;

        Ok(model.map(|m| m.into()))
    }

    async fn insert_category(&self, input: &CategoryInput) -> AppResult<Category> {
        let now = OffsetDateTime::now_utc();
        let model = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.clone()),
            introduction: Set(input.introduction.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model.insert(&self.db).await?;
        Ok(result.into())
    }

    async fn update_category(&self, id: Uuid, input: &CategoryInput) -> AppResult<Category> {
        let model = CategoryTable::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        let mut active: category::ActiveModel = model.into();
        active.name = Set(input.name.clone());
        active.introduction = Set(input.introduction.clone());
        active.updated_at = Set(OffsetDateTime::now_utc());

        let result = active.update(&self.db).await?;
        Ok(result.into())
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        let result = CategoryTable::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Category".to_string()));
        }

        Ok(())
    }

    async fn list_schemas(&self) -> AppResult<Vec<SchemaTemplate>> {
        let models = SchemaTable::find()
            .order_by_asc(schema_template::Column::CreatedAt)
            .all(&self.db)
            .await?;

        models.into_iter().map(SchemaTemplate::try_from).collect()
    }

    async fn find_schema(&self, id: Uuid) -> AppResult<SchemaTemplate> {
        let model = SchemaTable::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Schema".to_string()))?;

        model.try_into()
    }

    async fn insert_schema(&self, definition: &SchemaDefinition) -> AppResult<SchemaTemplate> {
        let now = OffsetDateTime::now_utc();
        let model = schema_template::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(definition.name.clone()),
            definition: Set(encode(definition)?),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model.insert(&self.db).await?;
        result.try_into()
    }

    async fn update_schema(
        &self,
        id: Uuid,
        definition: &SchemaDefinition,
    ) -> AppResult<SchemaTemplate> {
        let model = SchemaTable::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Schema".to_string()))?;

        let mut active: schema_template::ActiveModel = model.into();
        active.name = Set(definition.name.clone());
        active.definition = Set(encode(definition)?);
        active.updated_at = Set(OffsetDateTime::now_utc());

        let result = active.update(&self.db).await?;
        result.try_into()
    }

    async fn delete_schema(&self, id: Uuid) -> AppResult<()> {
        let result = SchemaTable::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Schema".to_string()));
        }

        Ok(())
    }

    async fn list_apis(&self, filter: &ApiFilter) -> AppResult<Vec<ApiRecord>> {
        let models = api_query(filter).all(&self.db).await?;

        models.into_iter().map(ApiRecord::try_from).collect()
    }

    async fn find_api(&self, id: Uuid) -> AppResult<ApiRecord> {
        let model = ApiTable::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Api".to_string()))?;

        model.try_into()
    }

    async fn insert_api(&self, entity: &ApiEntity) -> AppResult<ApiRecord> {
        let now = OffsetDateTime::now_utc();
        let model = api::ActiveModel {
            id: Set(Uuid::new_v4()),
            schema_version: Set(ApiDocument::CURRENT_VERSION),
            name: Set(entity.name.clone()),
            category_id: Set(entity.category_id),
            document: Set(encode(&ApiDocument::current(entity.clone()))?),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model.insert(&self.db).await?;
        result.try_into()
    }

    async fn upsert_api(&self, id: Uuid, entity: &ApiEntity) -> AppResult<ApiRecord> {
        let now = OffsetDateTime::now_utc();
        let model = api::ActiveModel {
            id: Set(id),
            schema_version: Set(ApiDocument::CURRENT_VERSION),
            name: Set(entity.name.clone()),
            category_id: Set(entity.category_id),
            document: Set(encode(&ApiDocument::current(entity.clone()))?),
            created_at: Set(now),
            updated_at: Set(now),
        };

        ApiTable::insert(model)
            .on_conflict(
                OnConflict::column(api::Column::Id)
                    .update_columns([
                        api::Column::SchemaVersion,
                        api::Column::Name,
                        api::Column::CategoryId,
                        api::Column::Document,
                        api::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        self.find_api(id).await
    }

    async fn replace_api(&self, id: Uuid, entity: &ApiEntity) -> AppResult<ApiRecord> {
        let model = ApiTable::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Api".to_string()))?;

        let mut active: api::ActiveModel = model.into();
        active.schema_version = Set(ApiDocument::CURRENT_VERSION);
        active.name = Set(entity.name.clone());
        active.category_id = Set(entity.category_id);
        active.document = Set(encode(&ApiDocument::current(entity.clone()))?);
        active.updated_at = Set(OffsetDateTime::now_utc());

        let result = active.update(&self.db).await?;
        result.try_into()
    }

    async fn delete_api(&self, id: Uuid) -> AppResult<()> {
        let result = ApiTable::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Api".to_string()));
        }

        Ok(())
    }

    async fn count_apis(&self) -> AppResult<u64> {
        let count = ApiTable::find().count(&self.db).await?;
        Ok(count)
    }

    async fn list_legacy_apis(&self) -> AppResult<Vec<LegacyApiRecord>> {
        let models = LegacyApiTable::find()
            .order_by_asc(legacy_api::Column::CreatedAt)
            .all(&self.db)
            .await?;

        models
            .into_iter()
            .map(|m| {
                Ok(LegacyApiRecord {
                    id: m.id,
                    api: decode(m.document)?,
                })
            })
            .collect()
    }

    async fn insert_legacy_api(&self, id: &str, api: &LegacyApi) -> AppResult<LegacyApiRecord> {
        let model = legacy_api::ActiveModel {
            id: Set(id.to_string()),
            document: Set(encode(api)?),
            created_at: Set(OffsetDateTime::now_utc()),
        };

        LegacyApiTable::insert(model)
            .on_conflict(
                OnConflict::column(legacy_api::Column::Id)
                    .update_column(legacy_api::Column::Document)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(LegacyApiRecord {
            id: id.to_string(),
            api: api.clone(),
        })
    }
}

// Conversions from SeaORM models to our domain models

impl From<category::Model> for Category {
    fn from(m: category::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            introduction: m.introduction,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl TryFrom<schema_template::Model> for SchemaTemplate {
    type Error = AppError;

    fn try_from(m: schema_template::Model) -> AppResult<Self> {
        Ok(Self {
            id: m.id,
            definition: decode(m.definition)?,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

impl TryFrom<api::Model> for ApiRecord {
    type Error = AppError;

    fn try_from(m: api::Model) -> AppResult<Self> {
        let document: ApiDocument = decode(m.document)?;
        Ok(Self {
            id: m.id,
            entity: document.into_current()?,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}
