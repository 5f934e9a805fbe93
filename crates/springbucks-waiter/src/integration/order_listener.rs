//! # Order Listener
//!
//! Forwards "finished order" events as customer notifications: each inbound
//! order id is looked up and republished with the customer attached.
//!
//! The listener receives its lookup gateway and its publisher explicitly and
//! holds no other state, so concurrent invocations are independent. It does
//! not retry, deduplicate or order anything; a failed lookup is returned to
//! the consumer runtime, whose [`FailurePolicy`](springbucks_framework::FailurePolicy)
//! decides what happens next.

use crate::clients::OrderLookup;
use crate::integration::barista::{CUSTOMER_HEADER, NOTIFY_ORDERS_OUT};
use crate::model::{CoffeeOrder, OrderId};
use crate::order_actor::OrderError;
use async_trait::async_trait;
use springbucks_framework::{Consumer, FrameworkError, Message, Publisher};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};

/// Why a finished order could not be forwarded.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("Order lookup failed: {0}")]
    Lookup(#[from] OrderError),

    #[error("Notification publish failed: {0}")]
    Publish(#[from] FrameworkError),
}

pub struct OrderListener<L, P> {
    lookup: L,
    publisher: P,
    output: String,
    lookup_timeout: Option<Duration>,
}

impl<L: OrderLookup, P: Publisher> OrderListener<L, P> {
    /// Publishes to `notifyOrders-out-0` with no lookup timeout.
    pub fn new(lookup: L, publisher: P) -> Self {
        Self {
            lookup,
            publisher,
            output: NOTIFY_ORDERS_OUT.to_string(),
            lookup_timeout: None,
        }
    }

    pub fn with_output_binding(mut self, binding: impl Into<String>) -> Self {
        self.output = binding.into();
        self
    }

    /// Bounds each lookup; `None` waits indefinitely.
    pub fn with_lookup_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Publishes one notification for `id`, with the same id as payload.
    #[instrument(skip(self))]
    pub async fn on_finished_order(&self, id: OrderId) -> Result<(), ForwardError> {
        info!(order_id = %id, "We've finished an order");
        let order = self.lookup_order(id).await?;

        let message = Message::with_payload(id).header(CUSTOMER_HEADER, order.customer.as_str());
        info!(customer = %order.customer, "Notify the customer");
        self.publisher.send(&self.output, message).await?;
        Ok(())
    }

    async fn lookup_order(&self, id: OrderId) -> Result<CoffeeOrder, OrderError> {
        match self.lookup_timeout {
            Some(limit) => tokio::time::timeout(limit, self.lookup.get(id))
                .await
                .map_err(|_| OrderError::Timeout(id))?,
            None => self.lookup.get(id).await,
        }
    }
}

#[async_trait]
impl<L, P> Consumer for OrderListener<L, P>
where
    L: OrderLookup + 'static,
    P: Publisher + 'static,
{
    type Payload = OrderId;
    type Error = ForwardError;

    async fn accept(&self, message: Message<OrderId>) -> Result<(), ForwardError> {
        self.on_finished_order(message.payload).await
    }
}
