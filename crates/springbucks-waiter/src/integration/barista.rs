//! Binding names shared with the barista service, and the outbound side of
//! that integration.

use crate::model::OrderId;
use springbucks_framework::{FrameworkError, Message, Publisher};
use tracing::{info, instrument};

/// Paid orders waiting to be brewed.
pub const NEW_ORDERS: &str = "newOrders";
/// Orders the barista has finished brewing.
pub const FINISHED_ORDERS: &str = "finishedOrders";
/// Customer notifications produced by [`OrderListener`](crate::integration::OrderListener).
pub const NOTIFY_ORDERS_OUT: &str = "notifyOrders-out-0";
/// Header carrying the customer on notifications.
pub const CUSTOMER_HEADER: &str = "customer";

/// Hands paid orders over to the barista service.
#[derive(Clone)]
pub struct Barista<P: Publisher> {
    publisher: P,
    new_orders: String,
}

impl<P: Publisher> Barista<P> {
    pub fn new(publisher: P) -> Self {
        Self {
            publisher,
            new_orders: NEW_ORDERS.to_string(),
        }
    }

    pub fn with_binding(mut self, binding: impl Into<String>) -> Self {
        self.new_orders = binding.into();
        self
    }

    /// Publishes `id` on the new-orders binding.
    #[instrument(skip(self))]
    pub async fn new_order(&self, id: OrderId) -> Result<usize, FrameworkError> {
        let delivered = self
            .publisher
            .send(&self.new_orders, Message::with_payload(id))
            .await?;
        info!(order_id = %id, delivered, "Sent order to barista");
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use springbucks_framework::mock::RecordingPublisher;

    #[tokio::test]
    async fn test_new_order_publishes_id_on_configured_binding() {
        let publisher = RecordingPublisher::new();
        let barista = Barista::new(publisher.clone()).with_binding("barista-in");

        barista.new_order(OrderId(12)).await.unwrap();

        let published = publisher.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "barista-in");
        assert_eq!(published[0].1.payload, serde_json::json!(12));
        assert!(published[0].1.headers.is_empty());
    }
}
