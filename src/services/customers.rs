use crate::{
    db::{self, DbPool},
    entities::{
        customer::{
            self, ActiveModel as CustomerActiveModel, Entity as CustomerEntity,
            Model as CustomerModel,
        },
        order, review,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub full_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub provider: Option<String>,
    pub provider_id: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, max = 100, message = "Name cannot be empty"))]
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerListResponse {
    pub customers: Vec<CustomerModel>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for customer accounts.
#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl CustomerService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<CustomerModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let model = CustomerActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(request.email.trim().to_lowercase()),
            full_name: Set(request.full_name),
            phone: Set(request.phone),
            address: Set(request.address),
            provider: Set(request.provider),
            provider_id: Set(request.provider_id),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model.insert(&*self.db_pool).await.map_err(|e| {
            if matches!(
                e.sql_err(),
                Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
            ) {
                ServiceError::Conflict("A customer with this email already exists".to_string())
            } else {
                ServiceError::DatabaseError(e)
            }
        })?;

        info!(customer_id = %created.id, "customer created");
        Ok(created)
    }

    pub async fn get_customer(&self, customer_id: Uuid) -> Result<CustomerModel, ServiceError> {
        CustomerEntity::find_by_id(customer_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Customer not found".to_string()))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<CustomerModel>, ServiceError> {
        Ok(CustomerEntity::find()
            .filter(customer::Column::Email.eq(email.trim().to_lowercase().as_str()))
            .one(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn list_customers(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<CustomerListResponse, ServiceError> {
        let paginator = CustomerEntity::find()
            .order_by_desc(customer::Column::CreatedAt)
            .paginate(&*self.db_pool, per_page.max(1));
        let total = paginator.num_items().await?;
        let customers = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok(CustomerListResponse {
            customers,
            total,
            page,
            per_page,
        })
    }

    #[instrument(skip(self, request), fields(customer_id = %customer_id))]
    pub async fn update_customer(
        &self,
        customer_id: Uuid,
        request: UpdateCustomerRequest,
    ) -> Result<CustomerModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let existing = self.get_customer(customer_id).await?;
        let mut active: CustomerActiveModel = existing.into();

        if let Some(full_name) = request.full_name {
            active.full_name = Set(full_name);
        }
        if let Some(phone) = request.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = request.address {
            active.address = Set(Some(address));
        }
        active.updated_at = Set(Some(Utc::now()));

        Ok(active.update(&*self.db_pool).await?)
    }

    /// Removes a customer together with their reviews. Orders are kept for
    /// the books; their customer reference is cleared instead.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn delete_customer(&self, customer_id: Uuid) -> Result<(), ServiceError> {
        self.get_customer(customer_id).await?;

        db::with_transaction(&self.db_pool, move |txn| {
            Box::pin(async move {
                review::Entity::delete_many()
                    .filter(review::Column::CustomerId.eq(customer_id))
                    .exec(txn)
                    .await?;

                order::Entity::update_many()
                    .col_expr(
                        order::Column::CustomerId,
                        sea_orm::sea_query::Expr::value(Option::<Uuid>::None),
                    )
                    .filter(order::Column::CustomerId.eq(customer_id))
                    .exec(txn)
                    .await?;

                CustomerEntity::delete_by_id(customer_id).exec(txn).await?;
                Ok(())
            })
        })
        .await?;

        info!(customer_id = %customer_id, "customer deleted");
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(Event::CustomerDeleted(customer_id)).await {
                warn!(error = %e, "failed to send customer deleted event");
            }
        }

        Ok(())
    }
}
