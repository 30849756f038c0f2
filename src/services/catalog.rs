use std::collections::{HashMap, HashSet};

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{ApiFilter, ApiRecord, HttpMethod, UNCATEGORIZED};
use crate::repositories::CatalogStore;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiSummary {
    pub id: Uuid,
    pub name: String,
    pub endpoint: String,
    pub method: HttpMethod,
    pub description: Option<String>,
}

impl From<ApiRecord> for ApiSummary {
    fn from(record: ApiRecord) -> Self {
        Self {
            id: record.id,
            name: record.entity.name,
            endpoint: record.entity.endpoint,
            method: record.entity.method,
            description: record.entity.description,
        }
    }
}

/// A category with its APIs. `categoryId` is null for the uncategorized group.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogGroup {
    pub category_id: Option<Uuid>,
    pub name: String,
    pub introduction: Option<String>,
    pub apis: Vec<ApiSummary>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub categories: usize,
    pub apis: u64,
    pub schemas: usize,
    pub legacy_apis: usize,
}

pub struct CatalogService;

impl CatalogService {
    /// Categories by name, then an uncategorized group collecting APIs
    /// whose category is missing or no longer exists
    pub async fn browse(store: &dyn CatalogStore) -> AppResult<Vec<CatalogGroup>> {
        let mut categories = store.list_categories().await?;
        categories.sort_by_key(|c| c.name.to_lowercase());
        let known: HashSet<Uuid> = categories.iter().map(|c| c.id).collect();

        let mut by_category: HashMap<Uuid, Vec<ApiSummary>> = HashMap::new();
        let mut uncategorized = Vec::new();
        for record in store.list_apis(&ApiFilter::default()).await? {
            match record.entity.category_id {
                Some(id) if known.contains(&id) => {
                    by_category.entry(id).or_default().push(record.into())
                }
                _ => uncategorized.push(record.into()),
            }
        }

        let mut groups: Vec<CatalogGroup> = categories
            .into_iter()
            .map(|category| CatalogGroup {
                apis: by_category.remove(&category.id).unwrap_or_default(),
                category_id: Some(category.id),
                name: category.name,
                introduction: category.introduction,
            })
            .collect();

        if !uncategorized.is_empty() {
            groups.push(CatalogGroup {
                category_id: None,
                name: UNCATEGORIZED.to_string(),
                introduction: None,
                apis: uncategorized,
            });
        }

        Ok(groups)
    }

    pub async fn dashboard(store: &dyn CatalogStore) -> AppResult<DashboardStats> {
        Ok(DashboardStats {
            categories: store.list_categories().await?.len(),
            apis: store.count_apis().await?,
            schemas: store.list_schemas().await?.len(),
            legacy_apis: store.list_legacy_apis().await?.len(),
        })
    }
}
