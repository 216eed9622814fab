use crate::{
    db::DbPool,
    entities::{
        customer,
        order::{self, OrderStatus},
        product,
    },
    errors::ServiceError,
};
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Serialize, Deserialize)]
pub struct RevenuePoint {
    pub date: NaiveDate,
    pub revenue: Decimal,
    pub order_count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_orders: u64,
    pub pending_orders: u64,
    pub completed_orders: u64,
    pub total_customers: u64,
    pub total_products: u64,
    /// Revenue of completed orders over the reporting window.
    pub total_revenue: Decimal,
    /// Per-day revenue over the reporting window, oldest day first.
    pub revenue_by_day: Vec<RevenuePoint>,
}

/// Back-office overview numbers.
#[derive(Clone)]
pub struct DashboardService {
    db_pool: Arc<DbPool>,
    window_days: i64,
}

impl DashboardService {
    pub fn new(db_pool: Arc<DbPool>, window_days: i64) -> Self {
        Self {
            db_pool,
            window_days: window_days.max(1),
        }
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<DashboardStats, ServiceError> {
        let total_orders = order::Entity::find().count(&*self.db_pool).await?;
        let pending_orders = order::Entity::find()
            .filter(order::Column::Status.eq(OrderStatus::Pending))
            .count(&*self.db_pool)
            .await?;
        let total_customers = customer::Entity::find().count(&*self.db_pool).await?;
        let total_products = product::Entity::find().count(&*self.db_pool).await?;

        let since = Utc::now() - Duration::days(self.window_days);
        // Revenue is aggregated here rather than in SQL so the same query
        // works on both backends.
        let completed = order::Entity::find()
            .filter(order::Column::Status.eq(OrderStatus::Completed))
            .filter(order::Column::CreatedAt.gte(since))
            .order_by_asc(order::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?;

        let completed_orders = completed.len() as u64;
        let mut total_revenue = Decimal::ZERO;
        let mut by_day: BTreeMap<NaiveDate, (Decimal, u64)> = BTreeMap::new();
        for order in &completed {
            total_revenue += order.total_amount;
            let entry = by_day
                .entry(order.created_at.date_naive())
                .or_insert((Decimal::ZERO, 0));
            entry.0 += order.total_amount;
            entry.1 += 1;
        }

        let revenue_by_day = by_day
            .into_iter()
            .map(|(date, (revenue, order_count))| RevenuePoint {
                date,
                revenue,
                order_count,
            })
            .collect();

        Ok(DashboardStats {
            total_orders,
            pending_orders,
            completed_orders,
            total_customers,
            total_products,
            total_revenue,
            revenue_by_day,
        })
    }
}
