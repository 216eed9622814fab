pub mod banners;
pub mod categories;
pub mod customers;
pub mod dashboard;
pub mod flash_sales;
pub mod orders;
pub mod products;
pub mod promotions;
pub mod reviews;

pub use banners::BannerService;
pub use categories::CategoryService;
pub use customers::CustomerService;
pub use dashboard::DashboardService;
pub use flash_sales::FlashSaleService;
pub use orders::OrderService;
pub use products::ProductService;
pub use promotions::PromotionService;
pub use reviews::ReviewService;
