use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Category, CategoryInput};
use crate::repositories::CatalogStore;

pub struct CategoryService;

impl CategoryService {
    pub async fn create(store: &dyn CatalogStore, input: CategoryInput) -> AppResult<Category> {
        let input = input.normalized()?;
        let category = store.insert_category(&input).await?;

        tracing::info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn update(
        store: &dyn CatalogStore,
        id: Uuid,
        input: CategoryInput,
    ) -> AppResult<Category> {
        let input = input.normalized()?;
        let category = store.update_category(id, &input).await?;

        tracing::info!(category_id = %id, name = %category.name, "Category updated");
        Ok(category)
    }

    /// APIs referencing the category are left as they are
    pub async fn delete(store: &dyn CatalogStore, id: Uuid) -> AppResult<()> {
        store.delete_category(id).await?;

        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }

    /// Case-insensitive lookup by name, creating the category when missing
    pub async fn resolve_or_create(store: &dyn CatalogStore, name: &str) -> AppResult<Category> {
        if let Some(existing) = store.find_category_by_name(name).await? {
            return Ok(existing);
        }
        Self::create(store, CategoryInput::new(name, None)).await
    }
}
