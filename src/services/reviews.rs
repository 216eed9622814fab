use crate::{
    db::DbPool,
    entities::{
        product,
        review::{
            self, ActiveModel as ReviewActiveModel, Entity as ReviewEntity, Model as ReviewModel,
        },
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
pub struct CreateReviewRequest {
    pub product_id: Uuid,
    pub customer_id: Option<Uuid>,
    #[validate(length(min = 1, max = 100, message = "Reviewer name is required"))]
    pub reviewer_name: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewListResponse {
    pub reviews: Vec<ReviewModel>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for product reviews.
#[derive(Clone)]
pub struct ReviewService {
    db_pool: Arc<DbPool>,
}

impl ReviewService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(product_id = %request.product_id))]
    pub async fn create_review(
        &self,
        request: CreateReviewRequest,
    ) -> Result<ReviewModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        // A review must point at an existing product
        product::Entity::find_by_id(request.product_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        let model = ReviewActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(request.product_id),
            customer_id: Set(request.customer_id),
            reviewer_name: Set(request.reviewer_name),
            rating: Set(request.rating),
            comment: Set(request.comment),
            created_at: Set(Utc::now()),
        };

        let created = model.insert(&*self.db_pool).await?;
        info!(review_id = %created.id, "review created");
        Ok(created)
    }

    pub async fn get_review(&self, review_id: Uuid) -> Result<ReviewModel, ServiceError> {
        ReviewEntity::find_by_id(review_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Review not found".to_string()))
    }

    /// Lists reviews, newest first, optionally restricted to one product.
    #[instrument(skip(self))]
    pub async fn list_reviews(
        &self,
        page: u64,
        per_page: u64,
        product_id: Option<Uuid>,
    ) -> Result<ReviewListResponse, ServiceError> {
        let mut query = ReviewEntity::find().order_by_desc(review::Column::CreatedAt);
        if let Some(product_id) = product_id {
            query = query.filter(review::Column::ProductId.eq(product_id));
        }

        let paginator = query.paginate(&*self.db_pool, per_page.max(1));
        let total = paginator.num_items().await?;
        let reviews = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok(ReviewListResponse {
            reviews,
            total,
            page,
            per_page,
        })
    }

    #[instrument(skip(self), fields(review_id = %review_id))]
    pub async fn delete_review(&self, review_id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_review(review_id).await?;
        let active: ReviewActiveModel = existing.into();
        active.delete(&*self.db_pool).await?;
        info!(review_id = %review_id, "review deleted");
        Ok(())
    }
}
