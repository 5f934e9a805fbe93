//! # Broker Integration
//!
//! Everything that crosses a channel binding:
//!
//! - [`barista`] - binding names and [`Barista`], which publishes paid orders
//! - [`order_listener`] - [`OrderListener`], which turns finished orders into
//!   customer notifications

pub mod barista;
pub mod order_listener;

pub use barista::*;
pub use order_listener::*;
