use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for orders. Travels on the wire as a plain integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order lifecycle. Declaration order is the only allowed direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    Init,
    Paid,
    Brewing,
    Brewed,
    Taken,
    Cancelled,
}

impl Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OrderState::Init => "INIT",
            OrderState::Paid => "PAID",
            OrderState::Brewing => "BREWING",
            OrderState::Brewed => "BREWED",
            OrderState::Taken => "TAKEN",
            OrderState::Cancelled => "CANCELLED",
        };
        f.write_str(name)
    }
}

/// Represents a customer's coffee order.
///
/// # Actor Framework
/// This struct implements the [`ActorEntity`](springbucks_framework::ActorEntity) trait,
/// allowing it to be kept by a [`ResourceActor`](springbucks_framework::ResourceActor).
/// See [`crate::order_actor`] for creation and state-change rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoffeeOrder {
    pub id: OrderId,
    pub customer: String,
    pub items: Vec<String>,
    pub state: OrderState,
}

/// Payload for creating a new order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub customer: String,
    pub items: Vec<String>,
}

/// Requested state change for an existing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderStateUpdate {
    pub state: OrderState,
}

impl CoffeeOrder {
    /// New orders always start in [`OrderState::Init`].
    pub fn new(id: OrderId, customer: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            id,
            customer: customer.into(),
            items,
            state: OrderState::Init,
        }
    }
}
