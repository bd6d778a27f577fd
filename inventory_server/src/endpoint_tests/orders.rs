use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use inventory_engine::{
    db_types::{Order, OrderStatusType, Price, Product},
    order_objects::OrderChanged,
    InventoryError,
    OrderFlowApi,
};

use super::{helpers::send_request, mocks::MockOrderManager};
use crate::routes::{CreateOrderRoute, DeleteOrderRoute, OrderByIdRoute, OrdersRoute, UpdateOrderRoute};

fn order(id: i64, quantity: i64, status: OrderStatusType) -> Order {
    Order { id, product_id: 1, quantity, status, created_at: Utc.with_ymd_and_hms(2026, 3, 15, 18, 30, 0).unwrap() }
}

fn product(stock: i64) -> Product {
    Product { id: 1, sku: "WIDGET-1".into(), name: "Widget".into(), price: Price::from(999), stock }
}

fn configure_with(manager: MockOrderManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(CreateOrderRoute::<MockOrderManager>::new())
            .service(OrdersRoute::<MockOrderManager>::new())
            .service(OrderByIdRoute::<MockOrderManager>::new())
            .service(UpdateOrderRoute::<MockOrderManager>::new())
            .service(DeleteOrderRoute::<MockOrderManager>::new())
            .app_data(web::Data::new(OrderFlowApi::new(manager)));
    }
}

#[actix_web::test]
async fn create_order() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_place_order().times(1).returning(|o| {
        assert_eq!(o.product_id, 1);
        assert_eq!(o.quantity, 3);
        Ok((order(10, 3, OrderStatusType::Pending), product(7)))
    });
    let req = TestRequest::post().uri("/orders").set_json(serde_json::json!({"product_id": 1, "quantity": 3}));
    let (status, body) = send_request(req, configure_with(manager)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        r#"{"id":10,"product_id":1,"quantity":3,"status":"PENDING","created_at":"2026-03-15T18:30:00Z"}"#
    );
}

#[actix_web::test]
async fn create_order_with_zero_quantity() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_place_order().never();
    let req = TestRequest::post().uri("/orders").set_json(serde_json::json!({"product_id": 1, "quantity": 0}));
    let (status, body) = send_request(req, configure_with(manager)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, r#"{"error":"Quantity must be greater than zero, but 0 was given"}"#);
}

#[actix_web::test]
async fn create_order_without_enough_stock() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_place_order().returning(|o| {
        Err(InventoryError::InsufficientStock { product_id: o.product_id, requested: o.quantity, available: 2 })
    });
    let req = TestRequest::post().uri("/orders").set_json(serde_json::json!({"product_id": 1, "quantity": 3}));
    let (status, body) = send_request(req, configure_with(manager)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body,
        r#"{"error":"Insufficient stock for product #1. 3 units requested, but only 2 available"}"#
    );
}

#[actix_web::test]
async fn create_order_for_unknown_product() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_place_order().returning(|o| Err(InventoryError::ProductNotFound(o.product_id)));
    let req = TestRequest::post().uri("/orders").set_json(serde_json::json!({"product_id": 99, "quantity": 1}));
    let (status, _) = send_request(req, configure_with(manager)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn fetch_order() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_fetch_order().returning(|id| Ok(Some(order(id, 2, OrderStatusType::Paid))));
    let (status, body) = send_request(TestRequest::get().uri("/orders/4"), configure_with(manager)).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(fetched, order(4, 2, OrderStatusType::Paid));
}

#[actix_web::test]
async fn fetch_missing_order() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_fetch_order().returning(|_| Ok(None));
    let (status, body) = send_request(TestRequest::get().uri("/orders/4"), configure_with(manager)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The requested order #4 does not exist"}"#);
}

#[actix_web::test]
async fn search_orders_by_status() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_search_orders().times(1).returning(|query| {
        assert_eq!(query.product_id, Some(1));
        assert_eq!(query.status, Some(vec![OrderStatusType::Paid, OrderStatusType::Shipped]));
        Ok(vec![order(1, 1, OrderStatusType::Paid), order(2, 5, OrderStatusType::Shipped)])
    });
    let req = TestRequest::get().uri("/orders?product_id=1&status=PAID,SHIPPED");
    let (status, body) = send_request(req, configure_with(manager)).await;
    assert_eq!(status, StatusCode::OK);
    let orders: Vec<Order> = serde_json::from_str(&body).unwrap();
    assert_eq!(orders.len(), 2);
}

#[actix_web::test]
async fn search_orders_with_unknown_status() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_search_orders().never();
    let (status, body) =
        send_request(TestRequest::get().uri("/orders?status=REFUNDED"), configure_with(manager)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Could not read request query: Invalid order status: REFUNDED"}"#);
}

#[actix_web::test]
async fn update_order_status() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_modify_order().times(1).returning(|id, request| {
        assert_eq!(request.new_status, Some(OrderStatusType::Shipped));
        assert_eq!(request.new_quantity, None);
        Ok(OrderChanged::new(order(id, 2, OrderStatusType::Paid), order(id, 2, OrderStatusType::Shipped)))
    });
    let req = TestRequest::put().uri("/orders/3").set_json(serde_json::json!({"status": "SHIPPED"}));
    let (status, body) = send_request(req, configure_with(manager)).await;
    assert_eq!(status, StatusCode::OK);
    let updated: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(updated.status, OrderStatusType::Shipped);
}

#[actix_web::test]
async fn update_order_with_rejected_transition() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_modify_order().returning(|id, _| {
        Err(InventoryError::InvalidTransition {
            order_id: id,
            from: OrderStatusType::Pending,
            to: OrderStatusType::Shipped,
        })
    });
    let req = TestRequest::put().uri("/orders/3").set_json(serde_json::json!({"status": "SHIPPED"}));
    let (status, body) = send_request(req, configure_with(manager)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, r#"{"error":"Order #3 cannot change from PENDING to SHIPPED"}"#);
}

#[actix_web::test]
async fn delete_order() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_remove_order().times(1).returning(|id| Ok(order(id, 2, OrderStatusType::Canceled)));
    let (status, body) = send_request(TestRequest::delete().uri("/orders/3"), configure_with(manager)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}

#[actix_web::test]
async fn delete_paid_order() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_remove_order().returning(|id| Err(InventoryError::OrderNotPending(id, OrderStatusType::Paid)));
    let (status, body) = send_request(TestRequest::delete().uri("/orders/3"), configure_with(manager)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, r#"{"error":"Order #3 is PAID. Only PENDING orders can be deleted"}"#);
}
