use crate::{
    db::DbPool,
    entities::promotion::{
        self, ActiveModel as PromotionActiveModel, DiscountType, Entity as PromotionEntity,
        Model as PromotionModel, PromotionStatus,
    },
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;
use validator::Validate;

/// Result of a successful voucher validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherQuote {
    pub code: String,
    pub title: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub discount_amount: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreatePromotionRequest {
    #[validate(length(min = 1, max = 50, message = "Promo code is required"))]
    pub promo_code: String,
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    #[serde(default)]
    pub min_order_value: Decimal,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub status: Option<PromotionStatus>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdatePromotionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<Decimal>,
    pub min_order_value: Option<Decimal>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<PromotionStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PromotionListResponse {
    pub promotions: Vec<PromotionModel>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for voucher validation and promotion management.
#[derive(Clone)]
pub struct PromotionService {
    db_pool: Arc<DbPool>,
}

impl PromotionService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Validate a voucher code against an order subtotal.
    ///
    /// Checks short-circuit in a fixed order: missing code, unknown/inactive
    /// code, window not started, window ended, below minimum. Pure read;
    /// nothing is decremented or reserved.
    #[instrument(skip(self), fields(code = %code))]
    pub async fn validate_voucher(
        &self,
        code: &str,
        subtotal: Decimal,
    ) -> Result<VoucherQuote, ServiceError> {
        let normalized = code.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Voucher code is required".to_string(),
            ));
        }
        if subtotal < Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Subtotal cannot be negative".to_string(),
            ));
        }

        let promotion = PromotionEntity::find()
            .filter(promotion::Column::PromoCode.eq(normalized.as_str()))
            .filter(promotion::Column::Status.eq(PromotionStatus::Active))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound("Invalid or expired voucher code".to_string())
            })?;

        let now = Utc::now();
        if now < promotion.start_date {
            return Err(ServiceError::BadRequest(
                "This voucher is not valid yet".to_string(),
            ));
        }
        if now > promotion.end_date {
            return Err(ServiceError::BadRequest(
                "This voucher has expired".to_string(),
            ));
        }

        if subtotal < promotion.min_order_value {
            return Err(ServiceError::BadRequest(format!(
                "A minimum order of {} is required to use this voucher",
                format_vnd(promotion.min_order_value)
            )));
        }

        let discount_amount = compute_discount(&promotion, subtotal);
        debug!(
            code = %promotion.promo_code,
            %subtotal,
            %discount_amount,
            "voucher validated"
        );

        Ok(VoucherQuote {
            code: promotion.promo_code,
            title: promotion.title,
            discount_type: promotion.discount_type,
            discount_value: promotion.discount_value,
            discount_amount,
        })
    }

    /// Creates a promotion (admin)
    #[instrument(skip(self, request), fields(promo_code = %request.promo_code))]
    pub async fn create_promotion(
        &self,
        request: CreatePromotionRequest,
    ) -> Result<PromotionModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        if request.end_date <= request.start_date {
            return Err(ServiceError::ValidationError(
                "end_date must be after start_date".to_string(),
            ));
        }

        let now = Utc::now();
        let model = PromotionActiveModel {
            id: Set(Uuid::new_v4()),
            promo_code: Set(request.promo_code.trim().to_uppercase()),
            title: Set(request.title),
            description: Set(request.description),
            discount_type: Set(request.discount_type),
            discount_value: Set(request.discount_value),
            min_order_value: Set(request.min_order_value),
            start_date: Set(request.start_date),
            end_date: Set(request.end_date),
            status: Set(request.status.unwrap_or(PromotionStatus::Active)),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let created = model.insert(&*self.db_pool).await.map_err(|e| {
            if e.sql_err()
                .map(|s| matches!(s, sea_orm::SqlErr::UniqueConstraintViolation(_)))
                .unwrap_or(false)
            {
                ServiceError::Conflict("Promo code already exists".to_string())
            } else {
                ServiceError::DatabaseError(e)
            }
        })?;

        info!(promotion_id = %created.id, promo_code = %created.promo_code, "promotion created");
        Ok(created)
    }

    pub async fn get_promotion(&self, id: Uuid) -> Result<PromotionModel, ServiceError> {
        PromotionEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Promotion not found".to_string()))
    }

    pub async fn list_promotions(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<PromotionListResponse, ServiceError> {
        let paginator = PromotionEntity::find()
            .order_by_desc(promotion::Column::CreatedAt)
            .paginate(&*self.db_pool, per_page.max(1));

        let total = paginator.num_items().await?;
        let promotions = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok(PromotionListResponse {
            promotions,
            total,
            page,
            per_page,
        })
    }

    #[instrument(skip(self, request), fields(promotion_id = %id))]
    pub async fn update_promotion(
        &self,
        id: Uuid,
        request: UpdatePromotionRequest,
    ) -> Result<PromotionModel, ServiceError> {
        let existing = self.get_promotion(id).await?;

        let mut active: PromotionActiveModel = existing.into();
        if let Some(title) = request.title {
            active.title = Set(title);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(discount_type) = request.discount_type {
            active.discount_type = Set(discount_type);
        }
        if let Some(discount_value) = request.discount_value {
            active.discount_value = Set(discount_value);
        }
        if let Some(min_order_value) = request.min_order_value {
            active.min_order_value = Set(min_order_value);
        }
        if let Some(start_date) = request.start_date {
            active.start_date = Set(start_date);
        }
        if let Some(end_date) = request.end_date {
            active.end_date = Set(end_date);
        }
        if let Some(status) = request.status {
            active.status = Set(status);
        }
        active.updated_at = Set(Some(Utc::now()));

        Ok(active.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self), fields(promotion_id = %id))]
    pub async fn delete_promotion(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_promotion(id).await?;
        let active: PromotionActiveModel = existing.into();
        active.delete(&*self.db_pool).await?;
        info!(promotion_id = %id, "promotion deleted");
        Ok(())
    }
}

/// Compute the discount a promotion grants on a subtotal.
///
/// The result is clamped to `[0, subtotal]`: a fixed voucher larger than the
/// order never produces a negative total.
pub fn compute_discount(promotion: &PromotionModel, subtotal: Decimal) -> Decimal {
    let discount = match promotion.discount_type {
        DiscountType::Percentage => (subtotal * promotion.discount_value / Decimal::from(100))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        DiscountType::Fixed => promotion.discount_value,
        // No subtotal discount; shipping is settled outside the evaluator
        DiscountType::FreeShipping => Decimal::ZERO,
    };

    discount.min(subtotal).max(Decimal::ZERO)
}

/// Format an amount as Vietnamese đồng with dot thousands separators,
/// e.g. `1500000 -> "1.500.000đ"`.
pub fn format_vnd(amount: Decimal) -> String {
    let whole = amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .trunc()
        .to_string();
    let negative = whole.starts_with('-');
    let digits = whole.trim_start_matches('-');

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}{}đ", if negative { "-" } else { "" }, grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    fn promotion(discount_type: DiscountType, discount_value: Decimal) -> PromotionModel {
        let now = Utc::now();
        PromotionModel {
            id: Uuid::new_v4(),
            promo_code: "TEST".to_string(),
            title: "Test promotion".to_string(),
            description: None,
            discount_type,
            discount_value,
            min_order_value: Decimal::ZERO,
            start_date: now - chrono::Duration::days(1),
            end_date: now + chrono::Duration::days(30),
            status: PromotionStatus::Active,
            created_at: now,
            updated_at: Some(now),
        }
    }

    #[test]
    fn percentage_discount_rounds_to_whole_dong() {
        // 10% of 200,000 = 20,000
        let promo = promotion(DiscountType::Percentage, dec!(10));
        assert_eq!(compute_discount(&promo, dec!(200000)), dec!(20000));
    }

    #[test]
    fn fixed_discount_is_clamped_to_subtotal() {
        let promo = promotion(DiscountType::Fixed, dec!(50000));
        assert_eq!(compute_discount(&promo, dec!(30000)), dec!(30000));
        assert_eq!(compute_discount(&promo, dec!(80000)), dec!(50000));
    }

    #[test]
    fn free_shipping_grants_no_subtotal_discount() {
        let promo = promotion(DiscountType::FreeShipping, dec!(25000));
        assert_eq!(compute_discount(&promo, dec!(120000)), Decimal::ZERO);
    }

    #[test_case(dec!(7.5), dec!(150000), dec!(11250) ; "fractional percentage")]
    #[test_case(dec!(100), dec!(99000), dec!(99000) ; "full percentage equals subtotal")]
    #[test_case(dec!(10), dec!(0), dec!(0) ; "zero subtotal")]
    fn percentage_cases(value: Decimal, subtotal: Decimal, expected: Decimal) {
        let promo = promotion(DiscountType::Percentage, value);
        assert_eq!(compute_discount(&promo, subtotal), expected);
    }

    #[test]
    fn discount_is_never_negative() {
        let promo = promotion(DiscountType::Fixed, dec!(-5000));
        assert_eq!(compute_discount(&promo, dec!(10000)), Decimal::ZERO);
    }

    #[test_case(dec!(0), "0đ")]
    #[test_case(dec!(999), "999đ")]
    #[test_case(dec!(100000), "100.000đ")]
    #[test_case(dec!(1500000), "1.500.000đ")]
    #[test_case(dec!(-25000), "-25.000đ")]
    fn vnd_formatting(amount: Decimal, expected: &str) {
        assert_eq!(format_vnd(amount), expected);
    }
}
