//! # SpringBucks Waiter
//!
//! The order-taking side of SpringBucks. Besides keeping orders, it forwards
//! "finished order" events from the barista to customers.
//!
//! - [`model`] - [`CoffeeOrder`](model::CoffeeOrder), ids and states
//! - [`order_actor`] - the order-record store
//! - [`clients`] - [`OrderClient`](clients::OrderClient) and the read-only
//!   [`OrderLookup`](clients::OrderLookup) gateway
//! - [`integration`] - binding names, [`Barista`](integration::Barista) and
//!   [`OrderListener`](integration::OrderListener)
//! - [`service`] - order operations, paying hands the order to the barista
//! - [`config`] - `WAITER_*` environment settings
//! - [`lifecycle`] - [`WaiterSystem`](lifecycle::WaiterSystem)

pub mod clients;
pub mod config;
pub mod integration;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod service;
