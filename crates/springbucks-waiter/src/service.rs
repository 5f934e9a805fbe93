//! # Coffee Order Service
//!
//! The waiter's order operations. Reads and writes go to the order store; a
//! transition to [`OrderState::Paid`] also sends the order to the barista.

use crate::clients::OrderClient;
use crate::integration::Barista;
use crate::model::{CoffeeOrder, OrderId, OrderState};
use crate::order_actor::OrderError;
use springbucks_framework::Publisher;
use tracing::{info, instrument, warn};

#[derive(Clone)]
pub struct CoffeeOrderService<P: Publisher> {
    orders: OrderClient,
    barista: Barista<P>,
}

impl<P: Publisher> CoffeeOrderService<P> {
    pub fn new(orders: OrderClient, barista: Barista<P>) -> Self {
        Self { orders, barista }
    }

    #[instrument(skip(self, items))]
    pub async fn create_order(
        &self,
        customer: &str,
        items: Vec<String>,
    ) -> Result<OrderId, OrderError> {
        let id = self.orders.create_order(customer, items).await?;
        info!(order_id = %id, "New order");
        Ok(id)
    }

    pub async fn get(&self, id: OrderId) -> Result<CoffeeOrder, OrderError> {
        self.orders.get(id).await
    }

    /// Moves the order forward. Paying also notifies the barista; the state
    /// change is kept even if that publish fails.
    #[instrument(skip(self))]
    pub async fn update_state(
        &self,
        id: OrderId,
        state: OrderState,
    ) -> Result<CoffeeOrder, OrderError> {
        let order = self.orders.update_state(id, state).await?;
        info!(order_id = %id, state = %order.state, "Updated order state");

        if order.state == OrderState::Paid {
            if let Err(e) = self.barista.new_order(id).await {
                warn!(order_id = %id, error = %e, "Could not send order to barista");
            }
        }
        Ok(order)
    }
}
