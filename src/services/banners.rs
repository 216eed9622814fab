use crate::{
    db::DbPool,
    entities::banner::{
        self, ActiveModel as BannerActiveModel, Entity as BannerEntity, Model as BannerModel,
    },
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateBannerRequest {
    #[validate(length(min = 1, max = 200, message = "Banner title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Image URL is required"))]
    pub image_url: String,
    pub link_url: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateBannerRequest {
    #[validate(length(min = 1, max = 200, message = "Banner title cannot be empty"))]
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub position: Option<i32>,
    pub is_active: Option<bool>,
}

/// Service for storefront hero banners.
#[derive(Clone)]
pub struct BannerService {
    db_pool: Arc<DbPool>,
}

impl BannerService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create_banner(
        &self,
        request: CreateBannerRequest,
    ) -> Result<BannerModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let model = BannerActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(request.title),
            image_url: Set(request.image_url),
            link_url: Set(request.link_url),
            position: Set(request.position),
            is_active: Set(request.is_active),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model.insert(&*self.db_pool).await?;
        info!(banner_id = %created.id, "banner created");
        Ok(created)
    }

    pub async fn get_banner(&self, banner_id: Uuid) -> Result<BannerModel, ServiceError> {
        BannerEntity::find_by_id(banner_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Banner not found".to_string()))
    }

    /// The storefront only sees active banners, in display order.
    pub async fn list_banners(&self, active_only: bool) -> Result<Vec<BannerModel>, ServiceError> {
        let mut query = BannerEntity::find().order_by_asc(banner::Column::Position);
        if active_only {
            query = query.filter(banner::Column::IsActive.eq(true));
        }
        Ok(query.all(&*self.db_pool).await?)
    }

    #[instrument(skip(self, request), fields(banner_id = %banner_id))]
    pub async fn update_banner(
        &self,
        banner_id: Uuid,
        request: UpdateBannerRequest,
    ) -> Result<BannerModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let existing = self.get_banner(banner_id).await?;
        let mut active: BannerActiveModel = existing.into();

        if let Some(title) = request.title {
            active.title = Set(title);
        }
        if let Some(image_url) = request.image_url {
            active.image_url = Set(image_url);
        }
        if let Some(link_url) = request.link_url {
            active.link_url = Set(Some(link_url));
        }
        if let Some(position) = request.position {
            active.position = Set(position);
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Some(Utc::now()));

        Ok(active.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self), fields(banner_id = %banner_id))]
    pub async fn delete_banner(&self, banner_id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_banner(banner_id).await?;
        let active: BannerActiveModel = existing.into();
        active.delete(&*self.db_pool).await?;
        info!(banner_id = %banner_id, "banner deleted");
        Ok(())
    }
}
