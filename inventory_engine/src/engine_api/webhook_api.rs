use std::fmt::Debug;

use log::*;

use crate::{
    engine_api::{
        order_flow_api::OrderFlowApi,
        webhook_objects::{PaymentEvent, WebhookError, WebhookOutcome},
    },
    helpers::SignatureVerifier,
    traits::OrderManagement,
};

/// `PaymentWebhookApi` turns signed payment notifications into order state transitions.
///
/// Processing happens in a strict order: the signature is checked against the raw bytes before anything else is done
/// with them, and only an authentic `payment.succeeded` event reaches the order flow. Marking an order as paid is
/// idempotent, so providers that deliver the same event several times get the same answer every time.
pub struct PaymentWebhookApi<B> {
    orders: OrderFlowApi<B>,
    verifier: SignatureVerifier,
}

impl<B> Debug for PaymentWebhookApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentWebhookApi ({:?})", self.orders)
    }
}

impl<B> PaymentWebhookApi<B> {
    pub fn new(orders: OrderFlowApi<B>, verifier: SignatureVerifier) -> Self {
        Self { orders, verifier }
    }
}

impl<B> PaymentWebhookApi<B>
where B: OrderManagement
{
    pub async fn process_payment_webhook(
        &self,
        raw: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookOutcome, WebhookError> {
        let signature = signature.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| {
            warn!("🪝️ Payment webhook received without a signature. Rejecting it.");
            WebhookError::MissingSignature
        })?;
        if !self.verifier.verify(raw, signature)? {
            warn!("🪝️ Payment webhook signature is invalid. Rejecting it.");
            return Err(WebhookError::InvalidSignature);
        }
        let event = PaymentEvent::from_slice(raw)?;
        if !event.is_payment_succeeded() {
            let name = event.event_name();
            debug!("🪝️ Ignoring payment webhook event {name:?}");
            return Ok(WebhookOutcome::Ignored { event: name });
        }
        let order_id = event.order_id()?;
        let changed = self.orders.mark_order_paid(order_id).await?;
        let newly_paid = changed.is_changed();
        info!("🪝️ Payment received for order #{order_id}{}", if newly_paid { "" } else { " (repeat delivery)" });
        Ok(WebhookOutcome::Processed { order: changed.new_order, newly_paid })
    }
}
