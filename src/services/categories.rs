use crate::{
    db::DbPool,
    entities::{
        category::{
            self, ActiveModel as CategoryActiveModel, Entity as CategoryEntity,
            Model as CategoryModel,
        },
        product,
    },
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Category name is required"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Category name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Service for menu categories.
#[derive(Clone)]
pub struct CategoryService {
    db_pool: Arc<DbPool>,
}

impl CategoryService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_category(
        &self,
        request: CreateCategoryRequest,
    ) -> Result<CategoryModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let model = CategoryActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            description: Set(request.description),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model.insert(&*self.db_pool).await?;
        info!(category_id = %created.id, "category created");
        Ok(created)
    }

    pub async fn get_category(&self, category_id: Uuid) -> Result<CategoryModel, ServiceError> {
        CategoryEntity::find_by_id(category_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Category not found".to_string()))
    }

    /// Categories are few; the list is unpaginated and name-ordered.
    pub async fn list_categories(&self) -> Result<Vec<CategoryModel>, ServiceError> {
        Ok(CategoryEntity::find()
            .order_by_asc(category::Column::Name)
            .all(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self, request), fields(category_id = %category_id))]
    pub async fn update_category(
        &self,
        category_id: Uuid,
        request: UpdateCategoryRequest,
    ) -> Result<CategoryModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let existing = self.get_category(category_id).await?;
        let mut active: CategoryActiveModel = existing.into();

        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(Some(Utc::now()));

        Ok(active.update(&*self.db_pool).await?)
    }

    /// A category that still has products cannot be removed.
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn delete_category(&self, category_id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_category(category_id).await?;

        let product_count = product::Entity::find()
            .filter(product::Column::CategoryId.eq(category_id))
            .count(&*self.db_pool)
            .await?;
        if product_count > 0 {
            return Err(ServiceError::Conflict(
                "Cannot delete a category that still has products".to_string(),
            ));
        }

        let active: CategoryActiveModel = existing.into();
        active.delete(&*self.db_pool).await?;
        info!(category_id = %category_id, "category deleted");
        Ok(())
    }
}
