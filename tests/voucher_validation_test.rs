mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use serde_json::json;

use common::{json_body, TestApp};
use foodstore_api::entities::promotion::{DiscountType, PromotionStatus};

#[tokio::test]
async fn percentage_voucher_quotes_discount() {
    let app = TestApp::new().await;
    let now = Utc::now();
    app.seed_promotion(
        "SUMMER10",
        DiscountType::Percentage,
        dec!(10),
        dec!(100000),
        now - Duration::days(1),
        now + Duration::days(30),
        PromotionStatus::Active,
    )
    .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/vouchers/validate",
            Some(json!({ "code": "SUMMER10", "subtotal": "200000" })),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["voucher"]["code"], json!("SUMMER10"));
    assert_eq!(body["voucher"]["discount_amount"], json!("20000"));
}

#[tokio::test]
async fn code_is_trimmed_and_uppercased_before_lookup() {
    let app = TestApp::new().await;
    let now = Utc::now();
    app.seed_promotion(
        "WELCOME",
        DiscountType::Fixed,
        dec!(20000),
        dec!(0),
        now - Duration::days(1),
        now + Duration::days(1),
        PromotionStatus::Active,
    )
    .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/vouchers/validate",
            Some(json!({ "code": "  welcome  ", "subtotal": "50000" })),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["voucher"]["code"], json!("WELCOME"));
}

#[tokio::test]
async fn unknown_code_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/vouchers/validate",
            Some(json!({ "code": "NOPE", "subtotal": "50000" })),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Invalid or expired voucher code"));
}

#[tokio::test]
async fn inactive_voucher_looks_like_unknown() {
    let app = TestApp::new().await;
    let now = Utc::now();
    app.seed_promotion(
        "PAUSED",
        DiscountType::Fixed,
        dec!(10000),
        dec!(0),
        now - Duration::days(1),
        now + Duration::days(1),
        PromotionStatus::Inactive,
    )
    .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/vouchers/validate",
            Some(json!({ "code": "PAUSED", "subtotal": "50000" })),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn voucher_before_window_is_rejected() {
    let app = TestApp::new().await;
    let now = Utc::now();
    app.seed_promotion(
        "SOON",
        DiscountType::Fixed,
        dec!(10000),
        dec!(0),
        now + Duration::days(1),
        now + Duration::days(10),
        PromotionStatus::Active,
    )
    .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/vouchers/validate",
            Some(json!({ "code": "SOON", "subtotal": "50000" })),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["message"], json!("This voucher is not valid yet"));
}

#[tokio::test]
async fn voucher_after_window_is_rejected() {
    let app = TestApp::new().await;
    let now = Utc::now();
    app.seed_promotion(
        "OLD",
        DiscountType::Fixed,
        dec!(10000),
        dec!(0),
        now - Duration::days(10),
        now - Duration::days(1),
        PromotionStatus::Active,
    )
    .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/vouchers/validate",
            Some(json!({ "code": "OLD", "subtotal": "50000" })),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["message"], json!("This voucher has expired"));
}

#[tokio::test]
async fn below_minimum_reports_formatted_threshold() {
    let app = TestApp::new().await;
    let now = Utc::now();
    app.seed_promotion(
        "BIGSPEND",
        DiscountType::Percentage,
        dec!(15),
        dec!(100000),
        now - Duration::days(1),
        now + Duration::days(1),
        PromotionStatus::Active,
    )
    .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/vouchers/validate",
            Some(json!({ "code": "BIGSPEND", "subtotal": "99999" })),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("100.000đ"), "message was: {message}");
}

#[tokio::test]
async fn fixed_voucher_never_exceeds_subtotal() {
    let app = TestApp::new().await;
    let now = Utc::now();
    app.seed_promotion(
        "BIGFIX",
        DiscountType::Fixed,
        dec!(50000),
        dec!(0),
        now - Duration::days(1),
        now + Duration::days(1),
        PromotionStatus::Active,
    )
    .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/vouchers/validate",
            Some(json!({ "code": "BIGFIX", "subtotal": "30000" })),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["voucher"]["discount_amount"], json!("30000"));
}

#[tokio::test]
async fn free_shipping_voucher_quotes_zero_discount() {
    let app = TestApp::new().await;
    let now = Utc::now();
    app.seed_promotion(
        "FREESHIP",
        DiscountType::FreeShipping,
        dec!(25000),
        dec!(0),
        now - Duration::days(1),
        now + Duration::days(1),
        PromotionStatus::Active,
    )
    .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/vouchers/validate",
            Some(json!({ "code": "FREESHIP", "subtotal": "120000" })),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["voucher"]["discount_type"], json!("free_shipping"));
    assert_eq!(body["voucher"]["discount_amount"], json!("0"));
}

#[tokio::test]
async fn blank_code_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/vouchers/validate",
            Some(json!({ "code": "   ", "subtotal": "50000" })),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["message"], json!("Voucher code is required"));
}
