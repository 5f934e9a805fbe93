//! # Order Client
//!
//! High-level API over a `ResourceClient<CoffeeOrder>`. Framework errors are
//! turned back into [`OrderError`]s here, so callers never see the actor
//! plumbing.
use crate::clients::OrderLookup;
use crate::model::{CoffeeOrder, OrderCreate, OrderId, OrderState, OrderStateUpdate};
use crate::order_actor::OrderError;
use async_trait::async_trait;
use springbucks_framework::{FrameworkError, ResourceClient};
use tracing::{debug, instrument};

/// Client for interacting with the order store actor.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<CoffeeOrder>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<CoffeeOrder>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, items))]
    pub async fn create_order(
        &self,
        customer: &str,
        items: Vec<String>,
    ) -> Result<OrderId, OrderError> {
        debug!(?items, "Sending request");
        let params = OrderCreate {
            customer: customer.to_string(),
            items,
        };
        self.inner.create(params).await.map_err(|e| map_error(None, e))
    }

    /// Fetches an order; a missing record is `OrderError::NotFound`.
    #[instrument(skip(self))]
    pub async fn get(&self, id: OrderId) -> Result<CoffeeOrder, OrderError> {
        debug!("Sending request");
        self.inner
            .get(id)
            .await
            .map_err(|e| map_error(Some(id), e))?
            .ok_or(OrderError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn update_state(
        &self,
        id: OrderId,
        state: OrderState,
    ) -> Result<CoffeeOrder, OrderError> {
        debug!("Sending request");
        self.inner
            .update(id, OrderStateUpdate { state })
            .await
            .map_err(|e| map_error(Some(id), e))
    }
}

#[async_trait]
impl OrderLookup for OrderClient {
    async fn get(&self, id: OrderId) -> Result<CoffeeOrder, OrderError> {
        OrderClient::get(self, id).await
    }
}

/// Recovers the entity's own error from the framework wrapper.
fn map_error(id: Option<OrderId>, e: FrameworkError) -> OrderError {
    match (e, id) {
        (FrameworkError::NotFound(_), Some(id)) => OrderError::NotFound(id),
        (FrameworkError::EntityError(inner), _) => match inner.downcast::<OrderError>() {
            Ok(order_error) => *order_error,
            Err(other) => OrderError::ActorCommunicationError(other.to_string()),
        },
        (other, _) => OrderError::ActorCommunicationError(other.to_string()),
    }
}
