//! [`ActorEntity`] implementation for [`CoffeeOrder`].

use crate::model::{CoffeeOrder, OrderCreate, OrderId, OrderStateUpdate};
use crate::order_actor::OrderError;
use async_trait::async_trait;
use springbucks_framework::ActorEntity;
use tracing::warn;

#[async_trait]
impl ActorEntity for CoffeeOrder {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = OrderStateUpdate;
    type Context = ();
    type Error = OrderError;

    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, Self::Error> {
        let customer = params.customer.trim();
        if customer.is_empty() {
            return Err(OrderError::ValidationError(
                "customer must not be blank".to_string(),
            ));
        }
        Ok(Self::new(id, customer, params.items))
    }

    async fn on_update(
        &mut self,
        update: OrderStateUpdate,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error> {
        if update.state <= self.state {
            warn!(order_id = %self.id, requested = %update.state, current = %self.state, "Wrong state order");
            return Err(OrderError::InvalidState {
                current: self.state,
                requested: update.state,
            });
        }
        self.state = update.state;
        Ok(())
    }
}
