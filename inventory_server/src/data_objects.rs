use inventory_engine::{
    db_types::OrderStatusType,
    order_objects::{ModifyOrderRequest, OrderQueryFilter},
    webhook_objects::WebhookOutcome,
};
use serde::{Deserialize, Serialize};

use crate::errors::ServerError;

/// The name of the request header that carries webhook signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader(pub String);

impl SignatureHeader {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// The body of `PUT /orders/{id}`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OrderUpdateParams {
    pub quantity: Option<i64>,
    pub status: Option<OrderStatusType>,
}

impl From<OrderUpdateParams> for ModifyOrderRequest {
    fn from(params: OrderUpdateParams) -> Self {
        ModifyOrderRequest { new_status: params.status, new_quantity: params.quantity }
    }
}

/// Query parameters for `GET /orders`. `status` takes a comma-separated list, e.g. `?status=PAID,SHIPPED`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrdersQuery {
    pub product_id: Option<i64>,
    pub status: Option<String>,
}

impl TryFrom<OrdersQuery> for OrderQueryFilter {
    type Error = ServerError;

    fn try_from(query: OrdersQuery) -> Result<Self, Self::Error> {
        let mut filter = OrderQueryFilter::default();
        if let Some(product_id) = query.product_id {
            filter = filter.with_product_id(product_id);
        }
        if let Some(statuses) = query.status {
            for s in statuses.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                let status = s.parse::<OrderStatusType>().map_err(|e| ServerError::InvalidQuery(e.to_string()))?;
                filter = filter.with_status(status);
            }
        }
        Ok(filter)
    }
}

/// The response to an accepted payment webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
}

impl From<WebhookOutcome> for WebhookResponse {
    fn from(outcome: WebhookOutcome) -> Self {
        match outcome {
            WebhookOutcome::Ignored { .. } => Self { detail: "Ignored".into(), order_id: None },
            WebhookOutcome::Processed { order, .. } => {
                Self { detail: "Payment processed".into(), order_id: Some(order.id) }
            },
        }
    }
}
