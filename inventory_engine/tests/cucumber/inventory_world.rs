use cucumber::World;
use inv_common::Secret;
use inventory_engine::{
    db_types::{Order, Product},
    helpers::{RetryPolicy, SignatureVerifier},
    test_utils::prepare_env::{create_database, random_db_path, run_migrations},
    webhook_objects::{WebhookError, WebhookOutcome},
    InventoryError,
    OrderFlowApi,
    PaymentWebhookApi,
    ProductApi,
    SqliteDatabase,
};
use log::*;

pub const WEBHOOK_SECRET: &str = "cucumber-webhook-secret";

#[derive(Default, Debug, World)]
pub struct InventoryWorld {
    pub system: Option<InventorySystem>,
    pub last_order: Option<Order>,
    pub last_error: Option<InventoryError>,
    pub last_webhook: Option<Result<WebhookOutcome, WebhookError>>,
}

#[derive(Debug)]
pub struct InventorySystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub products: ProductApi<SqliteDatabase>,
    pub orders: OrderFlowApi<SqliteDatabase>,
    pub webhooks: PaymentWebhookApi<SqliteDatabase>,
    pub verifier: SignatureVerifier,
}

impl InventoryWorld {
    pub fn system(&self) -> &InventorySystem {
        self.system.as_ref().expect("Inventory system not initialised")
    }

    pub fn last_order(&self) -> &Order {
        self.last_order.as_ref().expect("No order has been created yet")
    }

    pub async fn product_by_sku(&self, sku: &str) -> Product {
        let products = self.system().products.products().await.expect("Error fetching products");
        products.into_iter().find(|p| p.sku == sku).unwrap_or_else(|| panic!("No product with SKU {sku}"))
    }

    /// Remembers the outcome of an order operation for later `Then` steps.
    pub fn record(&mut self, result: Result<Order, InventoryError>) {
        match result {
            Ok(order) => {
                self.last_order = Some(order);
                self.last_error = None;
            },
            Err(e) => {
                debug!("🚀️ Operation failed: {e}");
                self.last_error = Some(e);
            },
        }
    }
}

impl InventorySystem {
    pub async fn new() -> Self {
        let url = prepare_test_env().await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
        debug!("Created database: {url}");
        let retry = RetryPolicy::new(20);
        let products = ProductApi::new(db.clone()).with_retry_policy(retry);
        let orders = OrderFlowApi::new(db.clone()).with_retry_policy(retry);
        let verifier = SignatureVerifier::new(Secret::new(WEBHOOK_SECRET.to_string()));
        let webhooks =
            PaymentWebhookApi::new(OrderFlowApi::new(db.clone()).with_retry_policy(retry), verifier.clone());
        Self { db_path: url, db, products, orders, webhooks, verifier }
    }
}

pub async fn prepare_test_env() -> String {
    let path = random_db_path();
    create_database(&path).await;
    run_migrations(&path).await;
    path
}
