use std::time::Duration;

use actix_web::{
    dev::Server,
    error::JsonPayloadError,
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpRequest,
    HttpServer,
};
use inventory_engine::{
    helpers::{RetryPolicy, SignatureVerifier},
    OrderFlowApi,
    PaymentWebhookApi,
    ProductApi,
    SqliteDatabase,
};
use log::*;

use crate::{
    config::ServerConfig,
    data_objects::SignatureHeader,
    errors::ServerError,
    routes::{
        health,
        CreateOrderRoute,
        CreateProductRoute,
        DeleteOrderRoute,
        DeleteProductRoute,
        OrderByIdRoute,
        OrdersRoute,
        PaymentWebhookRoute,
        ProductByIdRoute,
        ProductsRoute,
        UpdateOrderRoute,
        UpdateProductRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    if config.create_database {
        SqliteDatabase::create_if_missing(&config.database_url)
            .await
            .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    }
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🗃️ Database ready at {}", config.database_url);
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let retry = RetryPolicy::new(config.conflict_retries);
    let srv = HttpServer::new(move || {
        let products_api = ProductApi::new(db.clone()).with_retry_policy(retry);
        let orders_api = OrderFlowApi::new(db.clone()).with_retry_policy(retry);
        let verifier = SignatureVerifier::new(config.webhook.secret.clone());
        let webhook_api = PaymentWebhookApi::new(OrderFlowApi::new(db.clone()).with_retry_policy(retry), verifier);
        let signature_header = SignatureHeader(config.webhook.signature_header.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("inventory::access_log"))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::Data::new(products_api))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(webhook_api))
            .app_data(web::Data::new(signature_header))
            .service(health)
            .service(CreateProductRoute::<SqliteDatabase>::new())
            .service(ProductsRoute::<SqliteDatabase>::new())
            .service(ProductByIdRoute::<SqliteDatabase>::new())
            .service(UpdateProductRoute::<SqliteDatabase>::new())
            .service(DeleteProductRoute::<SqliteDatabase>::new())
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(OrdersRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(UpdateOrderRoute::<SqliteDatabase>::new())
            .service(DeleteOrderRoute::<SqliteDatabase>::new())
            .service(PaymentWebhookRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Malformed JSON bodies get the same `{"error": ...}` shape as every other failure.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!("💻️ Rejected request body. {err}");
    ServerError::InvalidRequestBody(err.to_string()).into()
}
