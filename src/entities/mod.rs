pub mod admin_user;
pub mod banner;
pub mod category;
pub mod customer;
pub mod flash_sale;
pub mod order;
pub mod product;
pub mod promotion;
pub mod review;
