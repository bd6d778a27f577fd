//! Webhook and order flow tests against a real, throwaway SQLite database.
use actix_web::{http::StatusCode, test, test::TestRequest, App};
use inventory_engine::{
    db_types::{Order, OrderStatusType, Product},
    test_utils::prepare_env::{drop_database, prepare_test_env, random_db_path},
    SqliteDatabase,
};
use serde_json::json;

use super::helpers::{configure_live, response_parts, sign_body, SIGNATURE_HEADER};

async fn live_database() -> (String, SqliteDatabase) {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error connecting to test database");
    (url, db)
}

fn payment_request(body: &str, signature: Option<&str>) -> TestRequest {
    let mut req = TestRequest::post()
        .uri("/webhooks/payment")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(body.to_string());
    if let Some(sig) = signature {
        req = req.insert_header((SIGNATURE_HEADER, sig));
    }
    req
}

// Sets up a product with 10 units and a PENDING order for 3 of them (order #1).
macro_rules! seeded_app {
    ($db:expr) => {{
        let app = test::init_service(App::new().configure(configure_live($db.clone()))).await;
        let req = TestRequest::post()
            .uri("/products")
            .set_json(json!({"sku": "WIDGET-1", "name": "Widget", "price": 999, "stock": 10}))
            .to_request();
        let (status, _) = response_parts(test::call_service(&app, req).await).await;
        assert_eq!(status, StatusCode::CREATED);
        let req = TestRequest::post().uri("/orders").set_json(json!({"product_id": 1, "quantity": 3})).to_request();
        let (status, _) = response_parts(test::call_service(&app, req).await).await;
        assert_eq!(status, StatusCode::CREATED);
        app
    }};
}

macro_rules! fetch_json {
    ($app:expr, $uri:expr, $t:ty) => {{
        let req = TestRequest::get().uri($uri).to_request();
        let (status, body) = response_parts(test::call_service(&$app, req).await).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        serde_json::from_str::<$t>(&body).expect("Unexpected response body")
    }};
}

#[actix_web::test]
async fn payment_marks_order_paid_once() {
    let (url, db) = live_database().await;
    let app = seeded_app!(db);

    let body = r#"{"event":"payment.succeeded","order_id":1}"#;
    let signature = sign_body(body);
    for _ in 0..2 {
        let req = payment_request(body, Some(signature.as_str())).to_request();
        let (status, response) = response_parts(test::call_service(&app, req).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response, r#"{"detail":"Payment processed","order_id":1}"#);
    }

    let order = fetch_json!(app, "/orders/1", Order);
    assert_eq!(order.status, OrderStatusType::Paid);
    assert_eq!(order.quantity, 3);
    let product = fetch_json!(app, "/products/1", Product);
    assert_eq!(product.stock, 7);
    drop_database(&url).await;
}

#[actix_web::test]
async fn order_id_may_be_a_string() {
    let (url, db) = live_database().await;
    let app = seeded_app!(db);

    let body = r#"{"event":"payment.succeeded","order_id":"1"}"#;
    let req = payment_request(body, Some(sign_body(body).to_uppercase().as_str())).to_request();
    let (status, response) = response_parts(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, r#"{"detail":"Payment processed","order_id":1}"#);
    drop_database(&url).await;
}

#[actix_web::test]
async fn unsigned_payments_are_rejected() {
    let (url, db) = live_database().await;
    let app = seeded_app!(db);

    let body = r#"{"event":"payment.succeeded","order_id":1}"#;
    let req = payment_request(body, None).to_request();
    let (status, response) = response_parts(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response, r#"{"error":"Missing signature"}"#);

    let req = payment_request(body, Some("   ")).to_request();
    let (status, _) = response_parts(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let order = fetch_json!(app, "/orders/1", Order);
    assert_eq!(order.status, OrderStatusType::Pending);
    drop_database(&url).await;
}

#[actix_web::test]
async fn tampered_payments_are_rejected() {
    let (url, db) = live_database().await;
    let app = seeded_app!(db);

    let signature = sign_body(r#"{"event":"payment.succeeded","order_id":2}"#);
    let body = r#"{"event":"payment.succeeded","order_id":1}"#;
    let req = payment_request(body, Some(signature.as_str())).to_request();
    let (status, response) = response_parts(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response, r#"{"error":"Invalid signature"}"#);

    let order = fetch_json!(app, "/orders/1", Order);
    assert_eq!(order.status, OrderStatusType::Pending);
    drop_database(&url).await;
}

#[actix_web::test]
async fn other_events_are_ignored() {
    let (url, db) = live_database().await;
    let app = seeded_app!(db);

    let body = r#"{"event":"payment.failed","order_id":1}"#;
    let req = payment_request(body, Some(sign_body(body).as_str())).to_request();
    let (status, response) = response_parts(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, r#"{"detail":"Ignored"}"#);

    let body = r#"{"event":5,"order_id":1}"#;
    let req = payment_request(body, Some(sign_body(body).as_str())).to_request();
    let (status, response) = response_parts(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, r#"{"detail":"Ignored"}"#);

    let order = fetch_json!(app, "/orders/1", Order);
    assert_eq!(order.status, OrderStatusType::Pending);
    drop_database(&url).await;
}

#[actix_web::test]
async fn malformed_payments_are_rejected() {
    let (url, db) = live_database().await;
    let app = seeded_app!(db);

    let body = r#"{"event":"payment.succeeded"}"#;
    let req = payment_request(body, Some(sign_body(body).as_str())).to_request();
    let (status, response) = response_parts(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, r#"{"error":"Could not read request body: Malformed payload. order_id is missing"}"#);

    let body = "this is not json";
    let req = payment_request(body, Some(sign_body(body).as_str())).to_request();
    let (status, _) = response_parts(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    drop_database(&url).await;
}

#[actix_web::test]
async fn payment_for_unknown_order() {
    let (url, db) = live_database().await;
    let app = seeded_app!(db);

    let body = r#"{"event":"payment.succeeded","order_id":42}"#;
    let req = payment_request(body, Some(sign_body(body).as_str())).to_request();
    let (status, response) = response_parts(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response, r#"{"error":"The requested order #42 does not exist"}"#);
    drop_database(&url).await;
}

#[actix_web::test]
async fn payment_for_shipped_order() {
    let (url, db) = live_database().await;
    let app = seeded_app!(db);

    for status in ["PAID", "SHIPPED"] {
        let req = TestRequest::put().uri("/orders/1").set_json(json!({ "status": status })).to_request();
        let (code, body) = response_parts(test::call_service(&app, req).await).await;
        assert_eq!(code, StatusCode::OK, "{body}");
    }
    let body = r#"{"event":"payment.succeeded","order_id":1}"#;
    let req = payment_request(body, Some(sign_body(body).as_str())).to_request();
    let (status, response) = response_parts(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(response, r#"{"error":"Order #1 cannot change from SHIPPED to PAID"}"#);
    drop_database(&url).await;
}

#[actix_web::test]
async fn order_lifecycle_keeps_stock_consistent() {
    let (url, db) = live_database().await;
    let app = seeded_app!(db);

    // Growing the order reserves more stock
    let req = TestRequest::put().uri("/orders/1").set_json(json!({"quantity": 5})).to_request();
    let (status, _) = response_parts(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetch_json!(app, "/products/1", Product).stock, 5);

    // Asking for more than is left fails and changes nothing
    let req = TestRequest::put().uri("/orders/1").set_json(json!({"quantity": 11})).to_request();
    let (status, _) = response_parts(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(fetch_json!(app, "/orders/1", Order).quantity, 5);
    assert_eq!(fetch_json!(app, "/products/1", Product).stock, 5);

    // The product cannot be deleted while the order exists
    let req = TestRequest::delete().uri("/products/1").to_request();
    let (status, _) = response_parts(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Deleting the pending order returns its stock
    let req = TestRequest::delete().uri("/orders/1").to_request();
    let (status, _) = response_parts(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(fetch_json!(app, "/products/1", Product).stock, 10);
    let req = TestRequest::get().uri("/orders/1").to_request();
    let (status, _) = response_parts(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = TestRequest::get().uri("/health").to_request();
    let (status, _) = response_parts(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::OK);
    drop_database(&url).await;
}
