use crate::{
    db::DbPool,
    entities::order::{
        self, ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel,
        OrderStatus,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::promotions::PromotionService,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Bounded attempts for the collision pre-check loop.
const MAX_CODE_ATTEMPTS: usize = 20;

/// Bounded attempts for the insert itself. The unique index on `order_code`
/// is the authoritative collision signal; a conflicting insert regenerates
/// and retries instead of failing the order.
const MAX_INSERT_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemInput {
    #[validate(length(min = 1, max = 200, message = "Item name is required"))]
    pub name: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,
    pub unit_price: Decimal,
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, max = 100, message = "Recipient name is required"))]
    pub recipient_name: String,
    #[validate(length(min = 1, max = 20, message = "Phone number is required"))]
    pub phone_number: String,
    #[validate(length(min = 1, max = 255, message = "Delivery address is required"))]
    pub delivery_address: String,
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<OrderItemInput>,
    pub customer_id: Option<Uuid>,
    pub promo_code: Option<String>,
    /// Requested delivery date; combined with `delivery_time` into the order time.
    pub delivery_date: Option<NaiveDate>,
    pub delivery_time: Option<NaiveTime>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateOrderRequest {
    pub recipient_name: Option<String>,
    pub phone_number: Option<String>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    /// Replacing the items recomputes the order total (keeping any discount).
    pub items: Option<Vec<OrderItemInput>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderModel>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for placing and managing storefront orders.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    promotions: Arc<PromotionService>,
}

impl OrderService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        promotions: Arc<PromotionService>,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            promotions,
        }
    }

    /// Generate a candidate order code that is free in the store at the time
    /// of the check.
    ///
    /// The generator never writes; the unique index on `order_code` is what
    /// ultimately guarantees uniqueness at insert time.
    pub async fn generate_order_code(&self) -> String {
        self.generate_order_code_with_attempts(MAX_CODE_ATTEMPTS)
            .await
    }

    /// Bounded variant of [`Self::generate_order_code`]. With a zero budget the
    /// timestamp fallback is returned directly.
    pub async fn generate_order_code_with_attempts(&self, max_attempts: usize) -> String {
        let now = Utc::now();

        for _ in 0..max_attempts {
            let candidate = candidate_code(now, rand::thread_rng().gen_range(0..10_000));

            match OrderEntity::find()
                .filter(order::Column::OrderCode.eq(candidate.as_str()))
                .one(&*self.db_pool)
                .await
            {
                Ok(None) => return candidate,
                Ok(Some(_)) => continue,
                Err(e) => {
                    // Treated like a collision: keep trying the next candidate.
                    // The insert path still catches a duplicate if the store
                    // was actually unreachable here.
                    warn!(error = %e, candidate = %candidate, "order code existence check failed");
                    continue;
                }
            }
        }

        let fallback = fallback_code(Utc::now());
        warn!(code = %fallback, "order code attempts exhausted, using timestamp fallback");
        fallback
    }

    /// Places a new order. The order starts in the pending status.
    #[instrument(skip(self, request), fields(recipient = %request.recipient_name))]
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<OrderModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        for item in &request.items {
            item.validate()
                .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        }

        let subtotal: Decimal = request
            .items
            .iter()
            .map(|item| Decimal::from(item.quantity) * item.unit_price)
            .sum();
        if subtotal < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Order subtotal cannot be negative".to_string(),
            ));
        }

        // An invalid voucher rejects the whole order rather than silently
        // dropping the discount.
        let (promo_code, discount_amount) = match request.promo_code.as_deref() {
            Some(code) if !code.trim().is_empty() => {
                let quote = self.promotions.validate_voucher(code, subtotal).await?;
                (Some(quote.code), quote.discount_amount)
            }
            _ => (None, Decimal::ZERO),
        };
        let total_amount = subtotal - discount_amount;

        let order_time = order_time_from_request(
            request.delivery_date,
            request.delivery_time,
            Utc::now(),
        );
        let items_list = serde_json::to_string(&request.items)?;
        let order_id = Uuid::new_v4();
        let now = Utc::now();

        for attempt in 0..MAX_INSERT_ATTEMPTS {
            let order_code = self.generate_order_code().await;

            let model = OrderActiveModel {
                id: Set(order_id),
                order_code: Set(order_code.clone()),
                customer_id: Set(request.customer_id),
                status: Set(OrderStatus::Pending),
                order_time: Set(order_time),
                total_amount: Set(total_amount),
                discount_amount: Set(discount_amount),
                promo_code: Set(promo_code.clone()),
                items_list: Set(items_list.clone()),
                recipient_name: Set(request.recipient_name.clone()),
                phone_number: Set(request.phone_number.clone()),
                delivery_address: Set(request.delivery_address.clone()),
                notes: Set(request.notes.clone()),
                created_at: Set(now),
                updated_at: Set(Some(now)),
            };

            match self.try_insert_order(model).await? {
                Some(created) => {
                    info!(order_id = %created.id, order_code = %created.order_code, "order created");

                    if let Some(sender) = &self.event_sender {
                        if let Err(e) = sender.send(Event::OrderCreated(created.id)).await {
                            warn!(error = %e, order_id = %created.id, "failed to send order created event");
                        }
                        if let Some(code) = &created.promo_code {
                            if let Err(e) = sender
                                .send(Event::VoucherApplied {
                                    order_id: created.id,
                                    promo_code: code.clone(),
                                })
                                .await
                            {
                                warn!(error = %e, order_id = %created.id, "failed to send voucher applied event");
                            }
                        }
                    }

                    return Ok(created);
                }
                None => {
                    warn!(
                        order_code = %order_code,
                        attempt = attempt + 1,
                        "order code collided at insert, regenerating"
                    );
                }
            }
        }

        error!(order_id = %order_id, "exhausted order code insert attempts");
        Err(ServiceError::InternalError(
            "could not allocate a unique order code".to_string(),
        ))
    }

    /// Inserts a fully built order row. A unique violation on `order_code`
    /// comes back as `Ok(None)` so the caller can regenerate the code and
    /// try again; any other database failure is an error.
    pub async fn try_insert_order(
        &self,
        model: OrderActiveModel,
    ) -> Result<Option<OrderModel>, ServiceError> {
        match model.insert(&*self.db_pool).await {
            Ok(created) => Ok(Some(created)),
            Err(e)
                if e.sql_err()
                    .map(|s| matches!(s, sea_orm::SqlErr::UniqueConstraintViolation(_)))
                    .unwrap_or(false) =>
            {
                Ok(None)
            }
            Err(e) => {
                error!(error = %e, "failed to insert order");
                Err(ServiceError::DatabaseError(e))
            }
        }
    }

    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderModel, ServiceError> {
        OrderEntity::find_by_id(order_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))
    }

    /// Customer-facing lookup by the human-readable code.
    pub async fn get_order_by_code(&self, order_code: &str) -> Result<OrderModel, ServiceError> {
        OrderEntity::find()
            .filter(order::Column::OrderCode.eq(order_code.trim().to_uppercase().as_str()))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))
    }

    /// Lists orders with pagination, newest first, optionally filtered by status.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        page: u64,
        per_page: u64,
        status: Option<OrderStatus>,
    ) -> Result<OrderListResponse, ServiceError> {
        let mut query = OrderEntity::find().order_by_desc(order::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(order::Column::Status.eq(status));
        }

        let paginator = query.paginate(&*self.db_pool, per_page.max(1));
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok(OrderListResponse {
            orders,
            total,
            page,
            per_page,
        })
    }

    /// Admin edit of order fields. The order code is immutable.
    #[instrument(skip(self, request), fields(order_id = %order_id))]
    pub async fn update_order(
        &self,
        order_id: Uuid,
        request: UpdateOrderRequest,
    ) -> Result<OrderModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let existing = self.get_order(order_id).await?;
        let discount_amount = existing.discount_amount;

        let mut active: OrderActiveModel = existing.into();
        if let Some(recipient_name) = request.recipient_name {
            active.recipient_name = Set(recipient_name);
        }
        if let Some(phone_number) = request.phone_number {
            active.phone_number = Set(phone_number);
        }
        if let Some(delivery_address) = request.delivery_address {
            active.delivery_address = Set(delivery_address);
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }
        if let Some(items) = request.items {
            if items.is_empty() {
                return Err(ServiceError::ValidationError(
                    "At least one item is required".to_string(),
                ));
            }
            for item in &items {
                item.validate()
                    .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
            }
            let subtotal: Decimal = items
                .iter()
                .map(|item| Decimal::from(item.quantity) * item.unit_price)
                .sum();
            active.items_list = Set(serde_json::to_string(&items)?);
            active.total_amount = Set((subtotal - discount_amount).max(Decimal::ZERO));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db_pool).await?;

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(Event::OrderUpdated(order_id)).await {
                warn!(error = %e, order_id = %order_id, "failed to send order updated event");
            }
        }

        Ok(updated)
    }

    /// Admin status transition.
    #[instrument(skip(self, request), fields(order_id = %order_id))]
    pub async fn update_order_status(
        &self,
        order_id: Uuid,
        request: UpdateOrderStatusRequest,
    ) -> Result<OrderModel, ServiceError> {
        let existing = self.get_order(order_id).await?;
        let old_status = existing.status;

        let mut active: OrderActiveModel = existing.into();
        active.status = Set(request.status);
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db_pool).await?;

        info!(
            order_id = %order_id,
            old_status = ?old_status,
            new_status = ?updated.status,
            "order status updated"
        );

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender
                .send(Event::OrderStatusChanged {
                    order_id,
                    old_status: format!("{:?}", old_status),
                    new_status: format!("{:?}", updated.status),
                })
                .await
            {
                warn!(error = %e, order_id = %order_id, "failed to send status changed event");
            }
        }

        Ok(updated)
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn delete_order(&self, order_id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_order(order_id).await?;
        let active: OrderActiveModel = existing.into();
        active.delete(&*self.db_pool).await?;

        info!(order_id = %order_id, "order deleted");
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(Event::OrderDeleted(order_id)).await {
                warn!(error = %e, order_id = %order_id, "failed to send order deleted event");
            }
        }

        Ok(())
    }
}

/// `DH-{YY}{MM}{RRRR}` with a zero-padded random suffix in [0, 9999].
fn candidate_code(now: DateTime<Utc>, random: u32) -> String {
    format!("DH-{}{:04}", now.format("%y%m"), random % 10_000)
}

/// Last resort when every candidate collided: the last four digits of the
/// Unix-millisecond clock. Not guaranteed collision-free, but the insert path
/// still refuses a duplicate.
fn fallback_code(now: DateTime<Utc>) -> String {
    let suffix = (now.timestamp_millis().rem_euclid(10_000)) as u32;
    format!("DH-{}{:04}", now.format("%y%m"), suffix)
}

fn order_time_from_request(
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    match date {
        Some(d) => {
            let t = time.unwrap_or(NaiveTime::MIN);
            DateTime::<Utc>::from_naive_utc_and_offset(d.and_time(t), Utc)
        }
        None => now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn candidate_code_matches_pattern() {
        let now = Utc.with_ymd_and_hms(2025, 7, 9, 12, 0, 0).unwrap();
        assert_eq!(candidate_code(now, 7), "DH-25070007");
        assert_eq!(candidate_code(now, 9_999), "DH-25079999");
        // Values beyond four digits wrap into range
        assert_eq!(candidate_code(now, 10_001), "DH-25070001");
    }

    #[test]
    fn candidate_code_embeds_current_year_month() {
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let code = candidate_code(now, 123);
        assert!(code.starts_with("DH-2412"));
        assert_eq!(code.len(), "DH-".len() + 8);
    }

    #[test]
    fn fallback_code_keeps_prefix_and_shape() {
        let now = Utc.with_ymd_and_hms(2025, 7, 9, 12, 34, 56).unwrap();
        let code = fallback_code(now);
        assert!(code.starts_with("DH-2507"));
        assert_eq!(code.len(), "DH-".len() + 8);
        assert!(code["DH-".len()..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn order_time_defaults_to_now() {
        let now = Utc.with_ymd_and_hms(2025, 7, 9, 10, 0, 0).unwrap();
        assert_eq!(order_time_from_request(None, None, now), now);
        // A bare time without a date is ignored
        assert_eq!(
            order_time_from_request(None, NaiveTime::from_hms_opt(18, 30, 0), now),
            now
        );
    }

    #[test]
    fn order_time_combines_requested_date_and_time() {
        let now = Utc.with_ymd_and_hms(2025, 7, 9, 10, 0, 0).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();
        let time = NaiveTime::from_hms_opt(18, 30, 0).unwrap();

        let combined = order_time_from_request(Some(date), Some(time), now);
        assert_eq!(
            combined,
            Utc.with_ymd_and_hms(2025, 7, 10, 18, 30, 0).unwrap()
        );

        let midnight = order_time_from_request(Some(date), None, now);
        assert_eq!(midnight, Utc.with_ymd_and_hms(2025, 7, 10, 0, 0, 0).unwrap());
    }
}
