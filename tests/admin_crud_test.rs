mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

use common::{json_body, TestApp};
use foodstore_api::entities::review;

#[tokio::test]
async fn category_crud_round_trip() {
    let app = TestApp::new().await;

    let created = json_body(
        app.request_authenticated(
            Method::POST,
            "/api/v1/admin/categories",
            Some(json!({ "name": "Noodles", "description": "Pho and friends" })),
        )
        .await,
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let updated = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/admin/categories/{}", id),
            Some(json!({ "name": "Noodle dishes" })),
        )
        .await;
    assert_eq!(updated.status(), StatusCode::OK);
    let body = json_body(updated).await;
    assert_eq!(body["data"]["name"], json!("Noodle dishes"));

    // Public listing sees the category without a session
    let listing = json_body(
        app.request(Method::GET, "/api/v1/categories", None, None)
            .await,
    )
    .await;
    assert_eq!(listing["data"][0]["name"], json!("Noodle dishes"));

    let deleted = app
        .request_authenticated(
            Method::DELETE,
            &format!("/api/v1/admin/categories/{}", id),
            None,
        )
        .await;
    assert_eq!(deleted.status(), StatusCode::OK);

    let after = json_body(
        app.request(Method::GET, "/api/v1/categories", None, None)
            .await,
    )
    .await;
    assert_eq!(after["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn category_with_products_cannot_be_deleted() {
    let app = TestApp::new().await;
    let category = app.seed_category("Drinks").await;
    app.seed_product("Tra da", dec!(10000), Some(category.id))
        .await;

    let response = app
        .request_authenticated(
            Method::DELETE,
            &format!("/api/v1/admin/categories/{}", category.id),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn storefront_only_sees_available_products() {
    let app = TestApp::new().await;

    let product = app.seed_product("Pho bo", dec!(60000), None).await;
    app.request_authenticated(
        Method::PUT,
        &format!("/api/v1/admin/products/{}", product.id),
        Some(json!({ "is_available": false })),
    )
    .await;

    let public = json_body(
        app.request(Method::GET, "/api/v1/products", None, None)
            .await,
    )
    .await;
    assert_eq!(public["data"]["total"], json!(0));

    let admin = json_body(
        app.request_authenticated(Method::GET, "/api/v1/admin/products", None)
            .await,
    )
    .await;
    assert_eq!(admin["data"]["total"], json!(1));
}

#[tokio::test]
async fn deleting_a_customer_also_removes_their_reviews() {
    let app = TestApp::new().await;

    let product = app.seed_product("Bun cha", dec!(45000), None).await;
    let customer = json_body(
        app.request_authenticated(
            Method::POST,
            "/api/v1/admin/customers",
            Some(json!({ "email": "an@example.com", "full_name": "Tran Thi An" })),
        )
        .await,
    )
    .await;
    let customer_id = customer["data"]["id"].as_str().unwrap().to_string();

    let review_resp = app
        .request(
            Method::POST,
            "/api/v1/reviews",
            Some(json!({
                "product_id": product.id,
                "customer_id": customer_id,
                "reviewer_name": "Tran Thi An",
                "rating": 5,
                "comment": "Ngon!"
            })),
            None,
        )
        .await;
    assert_eq!(review_resp.status(), StatusCode::CREATED);

    let deleted = app
        .request_authenticated(
            Method::DELETE,
            &format!("/api/v1/admin/customers/{}", customer_id),
            None,
        )
        .await;
    assert_eq!(deleted.status(), StatusCode::OK);

    let remaining = review::Entity::find()
        .filter(review::Column::ProductId.eq(product.id))
        .count(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn review_rating_is_bounded() {
    let app = TestApp::new().await;
    let product = app.seed_product("Com tam", dec!(40000), None).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/reviews",
            Some(json!({
                "product_id": product.id,
                "reviewer_name": "Khach",
                "rating": 6
            })),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn storefront_banner_list_is_filtered_and_ordered() {
    let app = TestApp::new().await;

    app.request_authenticated(
        Method::POST,
        "/api/v1/admin/banners",
        Some(json!({ "title": "Second", "image_url": "/img/b.jpg", "position": 2 })),
    )
    .await;
    app.request_authenticated(
        Method::POST,
        "/api/v1/admin/banners",
        Some(json!({ "title": "First", "image_url": "/img/a.jpg", "position": 1 })),
    )
    .await;
    app.request_authenticated(
        Method::POST,
        "/api/v1/admin/banners",
        Some(json!({ "title": "Hidden", "image_url": "/img/c.jpg", "position": 0, "is_active": false })),
    )
    .await;

    let body = json_body(
        app.request(Method::GET, "/api/v1/banners", None, None)
            .await,
    )
    .await;
    let banners = body["data"].as_array().unwrap();
    assert_eq!(banners.len(), 2);
    assert_eq!(banners[0]["title"], json!("First"));
    assert_eq!(banners[1]["title"], json!("Second"));
}

#[tokio::test]
async fn storefront_flash_sales_are_limited_to_running_ones() {
    let app = TestApp::new().await;
    let product = app.seed_product("Banh mi", dec!(25000), None).await;
    let now = Utc::now();

    // Running now
    app.request_authenticated(
        Method::POST,
        "/api/v1/admin/flash-sales",
        Some(json!({
            "product_id": product.id,
            "sale_price": "19000",
            "start_time": now - Duration::hours(1),
            "end_time": now + Duration::hours(1)
        })),
    )
    .await;
    // Already over
    app.request_authenticated(
        Method::POST,
        "/api/v1/admin/flash-sales",
        Some(json!({
            "product_id": product.id,
            "sale_price": "15000",
            "start_time": now - Duration::days(2),
            "end_time": now - Duration::days(1)
        })),
    )
    .await;

    let body = json_body(
        app.request(Method::GET, "/api/v1/flash-sales", None, None)
            .await,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["sale_price"], json!("19000"));

    let admin_body = json_body(
        app.request_authenticated(Method::GET, "/api/v1/admin/flash-sales", None)
            .await,
    )
    .await;
    assert_eq!(admin_body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn flash_sale_window_must_be_ordered() {
    let app = TestApp::new().await;
    let product = app.seed_product("Xoi", dec!(20000), None).await;
    let now = Utc::now();

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/admin/flash-sales",
            Some(json!({
                "product_id": product.id,
                "sale_price": "15000",
                "start_time": now + Duration::hours(2),
                "end_time": now + Duration::hours(1)
            })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dashboard_reports_counts_and_completed_revenue() {
    let app = TestApp::new().await;
    app.seed_product("Pho ga", dec!(55000), None).await;

    let order = json_body(
        app.request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "recipient_name": "Khach",
                "phone_number": "0900000000",
                "delivery_address": "1 Trang Tien",
                "items": [{ "name": "Pho ga", "quantity": 2, "unit_price": "55000" }]
            })),
            None,
        )
        .await,
    )
    .await;
    let order_id = order["data"]["id"].as_str().unwrap().to_string();

    // Pending orders carry no revenue yet
    let stats = json_body(
        app.request_authenticated(Method::GET, "/api/v1/admin/dashboard/stats", None)
            .await,
    )
    .await;
    assert_eq!(stats["data"]["total_orders"], json!(1));
    assert_eq!(stats["data"]["pending_orders"], json!(1));
    assert_eq!(stats["data"]["total_revenue"], json!("0"));

    app.request_authenticated(
        Method::PUT,
        &format!("/api/v1/admin/orders/{}/status", order_id),
        Some(json!({ "status": "Hoàn thành" })),
    )
    .await;

    let stats = json_body(
        app.request_authenticated(Method::GET, "/api/v1/admin/dashboard/stats", None)
            .await,
    )
    .await;
    assert_eq!(stats["data"]["pending_orders"], json!(0));
    assert_eq!(stats["data"]["completed_orders"], json!(1));
    assert_eq!(stats["data"]["total_revenue"], json!("110000"));
    assert_eq!(stats["data"]["total_products"], json!(1));
    assert_eq!(
        stats["data"]["revenue_by_day"].as_array().unwrap().len(),
        1
    );
}

#[tokio::test]
async fn promotion_management_round_trip() {
    let app = TestApp::new().await;
    let now = Utc::now();

    let payload = json!({
        "promo_code": "tet2025",
        "title": "Tet sale",
        "discount_type": "percentage",
        "discount_value": "20",
        "min_order_value": "0",
        "start_date": now - Duration::days(1),
        "end_date": now + Duration::days(7)
    });

    let created = app
        .request_authenticated(Method::POST, "/api/v1/admin/promotions", Some(payload.clone()))
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let body = json_body(created).await;
    // Codes are stored uppercase
    assert_eq!(body["data"]["promo_code"], json!("TET2025"));
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let duplicate = app
        .request_authenticated(Method::POST, "/api/v1/admin/promotions", Some(payload))
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    // Deactivating makes the voucher invisible to the storefront
    let updated = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/admin/promotions/{}", id),
            Some(json!({ "status": "inactive" })),
        )
        .await;
    assert_eq!(updated.status(), StatusCode::OK);

    let response = app
        .request(
            Method::POST,
            "/api/v1/vouchers/validate",
            Some(json!({ "code": "TET2025", "subtotal": "100000" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_endpoint_pings_the_database() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["database"], json!("up"));
}

#[tokio::test]
async fn admin_can_look_up_a_customer_by_email() {
    let app = TestApp::new().await;

    app.request_authenticated(
        Method::POST,
        "/api/v1/admin/customers",
        Some(json!({ "email": "an.lookup@example.com", "full_name": "Tran Thi An" })),
    )
    .await;

    // Lookup is case-insensitive
    let found = json_body(
        app.request_authenticated(
            Method::GET,
            "/api/v1/admin/customers?email=AN.LOOKUP%40example.com",
            None,
        )
        .await,
    )
    .await;
    assert_eq!(found["data"]["total"], json!(1));
    assert_eq!(
        found["data"]["customers"][0]["email"],
        json!("an.lookup@example.com")
    );

    let missing = json_body(
        app.request_authenticated(
            Method::GET,
            "/api/v1/admin/customers?email=nobody%40example.com",
            None,
        )
        .await,
    )
    .await;
    assert_eq!(missing["data"]["total"], json!(0));
}

#[tokio::test]
async fn duplicate_customer_email_conflicts() {
    let app = TestApp::new().await;

    let first = app
        .request_authenticated(
            Method::POST,
            "/api/v1/admin/customers",
            Some(json!({ "email": "b@example.com", "full_name": "B" })),
        )
        .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .request_authenticated(
            Method::POST,
            "/api/v1/admin/customers",
            Some(json!({ "email": "B@example.com", "full_name": "B2" })),
        )
        .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}
