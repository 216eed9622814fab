use crate::{
    db::DbPool,
    entities::{
        flash_sale::{
            self, ActiveModel as FlashSaleActiveModel, Entity as FlashSaleEntity,
            Model as FlashSaleModel,
        },
        product,
    },
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateFlashSaleRequest {
    pub product_id: Uuid,
    pub sale_price: Decimal,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateFlashSaleRequest {
    pub sale_price: Option<Decimal>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

/// Service for time-boxed flash sales on single products.
#[derive(Clone)]
pub struct FlashSaleService {
    db_pool: Arc<DbPool>,
}

impl FlashSaleService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(product_id = %request.product_id))]
    pub async fn create_flash_sale(
        &self,
        request: CreateFlashSaleRequest,
    ) -> Result<FlashSaleModel, ServiceError> {
        if request.sale_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Sale price cannot be negative".to_string(),
            ));
        }
        if request.end_time <= request.start_time {
            return Err(ServiceError::ValidationError(
                "End time must be after start time".to_string(),
            ));
        }

        product::Entity::find_by_id(request.product_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        let model = FlashSaleActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(request.product_id),
            sale_price: Set(request.sale_price),
            start_time: Set(request.start_time),
            end_time: Set(request.end_time),
            is_active: Set(request.is_active),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model.insert(&*self.db_pool).await?;
        info!(flash_sale_id = %created.id, "flash sale created");
        Ok(created)
    }

    pub async fn get_flash_sale(&self, flash_sale_id: Uuid) -> Result<FlashSaleModel, ServiceError> {
        FlashSaleEntity::find_by_id(flash_sale_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Flash sale not found".to_string()))
    }

    /// All flash sales, newest first. Admin view.
    pub async fn list_flash_sales(&self) -> Result<Vec<FlashSaleModel>, ServiceError> {
        Ok(FlashSaleEntity::find()
            .order_by_desc(flash_sale::Column::StartTime)
            .all(&*self.db_pool)
            .await?)
    }

    /// Sales that are active and inside their time window right now.
    #[instrument(skip(self))]
    pub async fn list_current_flash_sales(&self) -> Result<Vec<FlashSaleModel>, ServiceError> {
        let now = Utc::now();
        Ok(FlashSaleEntity::find()
            .filter(flash_sale::Column::IsActive.eq(true))
            .filter(flash_sale::Column::StartTime.lte(now))
            .filter(flash_sale::Column::EndTime.gte(now))
            .order_by_asc(flash_sale::Column::EndTime)
            .all(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self, request), fields(flash_sale_id = %flash_sale_id))]
    pub async fn update_flash_sale(
        &self,
        flash_sale_id: Uuid,
        request: UpdateFlashSaleRequest,
    ) -> Result<FlashSaleModel, ServiceError> {
        if matches!(request.sale_price, Some(p) if p < Decimal::ZERO) {
            return Err(ServiceError::ValidationError(
                "Sale price cannot be negative".to_string(),
            ));
        }

        let existing = self.get_flash_sale(flash_sale_id).await?;
        let start = request.start_time.unwrap_or(existing.start_time);
        let end = request.end_time.unwrap_or(existing.end_time);
        if end <= start {
            return Err(ServiceError::ValidationError(
                "End time must be after start time".to_string(),
            ));
        }

        let mut active: FlashSaleActiveModel = existing.into();
        if let Some(sale_price) = request.sale_price {
            active.sale_price = Set(sale_price);
        }
        active.start_time = Set(start);
        active.end_time = Set(end);
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Some(Utc::now()));

        Ok(active.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self), fields(flash_sale_id = %flash_sale_id))]
    pub async fn delete_flash_sale(&self, flash_sale_id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_flash_sale(flash_sale_id).await?;
        let active: FlashSaleActiveModel = existing.into();
        active.delete(&*self.db_pool).await?;
        info!(flash_sale_id = %flash_sale_id, "flash sale deleted");
        Ok(())
    }
}
