//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use inventory_engine::{
    db_types::{NewOrder, NewProduct, ProductUpdate},
    order_objects::{ModifyOrderRequest, OrderQueryFilter},
    traits::{OrderManagement, ProductManagement},
    OrderFlowApi,
    PaymentWebhookApi,
    ProductApi,
};
use log::*;

use crate::{
    data_objects::{OrderUpdateParams, OrdersQuery, SignatureHeader, WebhookResponse},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Products  ----------------------------------------------------
route!(create_product => Post "/products" impl ProductManagement);
/// Creates a product. `price` is an integer number of minor units (cents), so `{"price": 999}` is 9.99. Decimal
/// prices are rejected as a malformed body.
pub async fn create_product<B: ProductManagement>(
    body: web::Json<NewProduct>,
    api: web::Data<ProductApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product = body.into_inner();
    debug!("💻️ POST new product [{}]", product.sku);
    let product = api.create_product(product).await?;
    Ok(HttpResponse::Created().json(product))
}

route!(products => Get "/products" impl ProductManagement);
pub async fn products<B: ProductManagement>(api: web::Data<ProductApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET products");
    let products = api.products().await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(product_by_id => Get "/products/{id}" impl ProductManagement);
pub async fn product_by_id<B: ProductManagement>(
    path: web::Path<i64>,
    api: web::Data<ProductApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET product #{id}");
    let product = api.product(id).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(update_product => Put "/products/{id}" impl ProductManagement);
pub async fn update_product<B: ProductManagement>(
    path: web::Path<i64>,
    body: web::Json<ProductUpdate>,
    api: web::Data<ProductApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ PUT product #{id}");
    let product = api.update_product(id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(delete_product => Delete "/products/{id}" impl ProductManagement);
pub async fn delete_product<B: ProductManagement>(
    path: web::Path<i64>,
    api: web::Data<ProductApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ DELETE product #{id}");
    api.delete_product(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl OrderManagement);
pub async fn create_order<B: OrderManagement>(
    body: web::Json<NewOrder>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order = body.into_inner();
    debug!("💻️ POST new order for {order}");
    let order = api.create_order(order).await?;
    Ok(HttpResponse::Created().json(order))
}

route!(orders => Get "/orders" impl OrderManagement);
/// Lists orders, oldest first. Both query parameters are optional:
/// * `product_id`: only orders for this product
/// * `status`: a comma-separated list of statuses, e.g. `PAID,SHIPPED`
pub async fn orders<B: OrderManagement>(
    query: web::Query<OrdersQuery>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let filter = OrderQueryFilter::try_from(query.into_inner())?;
    debug!("💻️ GET orders. {filter}");
    let orders = api.search_orders(filter).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{id}" impl OrderManagement);
pub async fn order_by_id<B: OrderManagement>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET order #{id}");
    let order = api.order(id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(update_order => Put "/orders/{id}" impl OrderManagement);
pub async fn update_order<B: OrderManagement>(
    path: web::Path<i64>,
    body: web::Json<OrderUpdateParams>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let request = ModifyOrderRequest::from(body.into_inner());
    debug!("💻️ PUT order #{id}. {request}");
    let order = api.update_order(id, request).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(delete_order => Delete "/orders/{id}" impl OrderManagement);
pub async fn delete_order<B: OrderManagement>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ DELETE order #{id}");
    api.delete_order(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

//----------------------------------------------   Webhooks  ----------------------------------------------------
route!(payment_webhook => Post "/webhooks/payment" impl OrderManagement);
/// Route handler for payment provider notifications.
///
/// The body is taken as raw bytes, because the signature in the configured header (`X-Signature` by default) covers
/// the exact bytes that were sent. Nothing is parsed until the signature has been checked.
pub async fn payment_webhook<B: OrderManagement>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<PaymentWebhookApi<B>>,
    header: web::Data<SignatureHeader>,
) -> Result<HttpResponse, ServerError> {
    trace!("🪝️ Received payment webhook ({} bytes)", body.len());
    let signature = req.headers().get(header.as_str()).and_then(|v| v.to_str().ok());
    let outcome = api.process_payment_webhook(body.as_ref(), signature).await?;
    Ok(HttpResponse::Ok().json(WebhookResponse::from(outcome)))
}
