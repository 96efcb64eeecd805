//! Best-effort settlement events.
//!
//! When a NATS url is configured, every successful settlement publishes a
//! `pos.sale.settled` message. Publishing is fire-and-forget: a missing or
//! failing broker never changes a request outcome.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct SaleSettled {
    pub sale_id: Uuid,
    pub user_id: Uuid,
    pub transaction_id: String,
    pub payment_method: String,
    pub total: Decimal,
}

pub async fn publish_sale_settled(nats: &Option<async_nats::Client>, event: SaleSettled) {
    let Some(client) = nats else { return };
    let payload = match serde_json::to_vec(&event) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(error = %e, "could not serialize sale.settled event");
            return;
        }
    };
    if let Err(e) = client.publish("pos.sale.settled", payload.into()).await {
        tracing::warn!(error = %e, sale_id = %event.sale_id, "sale.settled publish failed");
    }
}
