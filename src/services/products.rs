use crate::{
    db::DbPool,
    entities::product::{
        self, ActiveModel as ProductActiveModel, Entity as ProductEntity, Model as ProductModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200, message = "Product name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200, message = "Product name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductListResponse {
    pub products: Vec<ProductModel>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for the product catalog.
#[derive(Clone)]
pub struct ProductService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ProductService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<ProductModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        if request.price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Price cannot be negative".to_string(),
            ));
        }

        let model = ProductActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            description: Set(request.description),
            price: Set(request.price),
            image_url: Set(request.image_url),
            category_id: Set(request.category_id),
            is_available: Set(request.is_available),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model.insert(&*self.db_pool).await.map_err(|e| {
            error!(error = %e, "failed to create product");
            ServiceError::DatabaseError(e)
        })?;

        info!(product_id = %created.id, "product created");
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(Event::ProductCreated(created.id)).await {
                warn!(error = %e, "failed to send product created event");
            }
        }

        Ok(created)
    }

    pub async fn get_product(&self, product_id: Uuid) -> Result<ProductModel, ServiceError> {
        ProductEntity::find_by_id(product_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))
    }

    /// Lists products with pagination. The storefront passes
    /// `available_only = true`; the back office sees everything.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        page: u64,
        per_page: u64,
        category_id: Option<Uuid>,
        search: Option<&str>,
        available_only: bool,
    ) -> Result<ProductListResponse, ServiceError> {
        let mut query = ProductEntity::find().order_by_desc(product::Column::CreatedAt);
        if let Some(category_id) = category_id {
            query = query.filter(product::Column::CategoryId.eq(category_id));
        }
        if let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(product::Column::Name.contains(term));
        }
        if available_only {
            query = query.filter(product::Column::IsAvailable.eq(true));
        }

        let paginator = query.paginate(&*self.db_pool, per_page.max(1));
        let total = paginator.num_items().await?;
        let products = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok(ProductListResponse {
            products,
            total,
            page,
            per_page,
        })
    }

    #[instrument(skip(self, request), fields(product_id = %product_id))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        request: UpdateProductRequest,
    ) -> Result<ProductModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        if matches!(request.price, Some(p) if p < Decimal::ZERO) {
            return Err(ServiceError::ValidationError(
                "Price cannot be negative".to_string(),
            ));
        }

        let existing = self.get_product(product_id).await?;
        let mut active: ProductActiveModel = existing.into();

        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(price) = request.price {
            active.price = Set(price);
        }
        if let Some(image_url) = request.image_url {
            active.image_url = Set(Some(image_url));
        }
        if let Some(category_id) = request.category_id {
            active.category_id = Set(Some(category_id));
        }
        if let Some(is_available) = request.is_available {
            active.is_available = Set(is_available);
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db_pool).await?;

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(Event::ProductUpdated(product_id)).await {
                warn!(error = %e, "failed to send product updated event");
            }
        }

        Ok(updated)
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn delete_product(&self, product_id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_product(product_id).await?;
        let active: ProductActiveModel = existing.into();
        active.delete(&*self.db_pool).await?;

        info!(product_id = %product_id, "product deleted");
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(Event::ProductDeleted(product_id)).await {
                warn!(error = %e, "failed to send product deleted event");
            }
        }

        Ok(())
    }
}
