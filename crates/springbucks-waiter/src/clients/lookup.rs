use crate::model::{CoffeeOrder, OrderId};
use crate::order_actor::OrderError;
use async_trait::async_trait;

/// Read-only gateway to the order-record store. Implemented by
/// [`OrderClient`](crate::clients::OrderClient).
#[async_trait]
pub trait OrderLookup: Send + Sync {
    /// Fails with [`OrderError::NotFound`] when no record exists for `id`.
    async fn get(&self, id: OrderId) -> Result<CoffeeOrder, OrderError>;
}
