//! # Order Actor
//!
//! The order-record store: a [`ResourceActor`] keeping [`CoffeeOrder`]s.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](springbucks_framework::ActorEntity) implementation
//!   for [`CoffeeOrder`] (blank customers rejected, state only moves forward)
//! - [`error`] - [`OrderError`], also the failure type of order lookups
//! - [`new()`] - factory returning the actor and its generic client
//!
//! ## Usage
//!
//! ```rust
//! use springbucks_waiter::clients::OrderClient;
//! use springbucks_waiter::model::OrderState;
//! use springbucks_waiter::order_actor;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (actor, generic_client) = order_actor::new(32);
//!     let client = OrderClient::new(generic_client);
//!     tokio::spawn(actor.run(()));
//!
//!     let id = client.create_order("Alice", vec!["espresso".to_string()]).await?;
//!     let order = client.update_state(id, OrderState::Paid).await?;
//!     assert_eq!(order.customer, "Alice");
//!     Ok(())
//! }
//! ```

pub mod entity;
pub mod error;

pub use error::*;

use crate::model::CoffeeOrder;
use springbucks_framework::{ResourceActor, ResourceClient};

/// Creates a new order store actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<CoffeeOrder>, ResourceClient<CoffeeOrder>) {
    ResourceActor::new(buffer_size)
}
