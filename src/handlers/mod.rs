use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::DbPool,
    events::EventSender,
    services::{
        BannerService, CategoryService, CustomerService, DashboardService, FlashSaleService,
        OrderService, ProductService, PromotionService, ReviewService,
    },
};

pub mod auth;
pub mod banners;
pub mod categories;
pub mod common;
pub mod customers;
pub mod dashboard;
pub mod flash_sales;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod vouchers;

/// All business services, built once at startup and shared through [`crate::AppState`].
pub struct AppServices {
    pub orders: Arc<OrderService>,
    pub promotions: Arc<PromotionService>,
    pub products: Arc<ProductService>,
    pub categories: Arc<CategoryService>,
    pub customers: Arc<CustomerService>,
    pub reviews: Arc<ReviewService>,
    pub banners: Arc<BannerService>,
    pub flash_sales: Arc<FlashSaleService>,
    pub dashboard: Arc<DashboardService>,
}

impl AppServices {
    pub fn build(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        config: &AppConfig,
    ) -> Self {
        let promotions = Arc::new(PromotionService::new(db_pool.clone()));

        Self {
            orders: Arc::new(OrderService::new(
                db_pool.clone(),
                event_sender.clone(),
                promotions.clone(),
            )),
            promotions,
            products: Arc::new(ProductService::new(db_pool.clone(), event_sender.clone())),
            categories: Arc::new(CategoryService::new(db_pool.clone())),
            customers: Arc::new(CustomerService::new(db_pool.clone(), event_sender)),
            reviews: Arc::new(ReviewService::new(db_pool.clone())),
            banners: Arc::new(BannerService::new(db_pool.clone())),
            flash_sales: Arc::new(FlashSaleService::new(db_pool.clone())),
            dashboard: Arc::new(DashboardService::new(
                db_pool,
                config.dashboard_window_days,
            )),
        }
    }
}
