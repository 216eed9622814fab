use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Lifecycle of a storefront order. Stored and serialized as the Vietnamese
/// display strings the storefront renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum OrderStatus {
    #[sea_orm(string_value = "Chờ xác nhận")]
    #[serde(rename = "Chờ xác nhận")]
    Pending,
    #[sea_orm(string_value = "Đã xác nhận")]
    #[serde(rename = "Đã xác nhận")]
    Confirmed,
    #[sea_orm(string_value = "Đang vận chuyển")]
    #[serde(rename = "Đang vận chuyển")]
    Shipping,
    #[sea_orm(string_value = "Hoàn thành")]
    #[serde(rename = "Hoàn thành")]
    Completed,
    #[sea_orm(string_value = "Đã hủy")]
    #[serde(rename = "Đã hủy")]
    Canceled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Human-readable order identifier (`DH-YYMM####`), immutable after creation.
    #[sea_orm(unique)]
    #[validate(length(min = 1, max = 20))]
    pub order_code: String,

    pub customer_id: Option<Uuid>,
    pub status: OrderStatus,
    pub order_time: DateTime<Utc>,
    pub total_amount: Decimal,
    pub discount_amount: Decimal,
    pub promo_code: Option<String>,

    /// Serialized line items (JSON array)
    pub items_list: String,

    #[validate(length(min = 1, max = 100, message = "Recipient name is required"))]
    pub recipient_name: String,
    #[validate(length(min = 1, max = 20, message = "Phone number is required"))]
    pub phone_number: String,
    #[validate(length(min = 1, max = 255, message = "Delivery address is required"))]
    pub delivery_address: String,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
