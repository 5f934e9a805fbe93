//! # System Lifecycle
//!
//! [`WaiterSystem`] creates the actors, wires the clients into the service
//! and the listener, and tears everything down again.
//!
//! ## Shutdown with a cycle
//!
//! The listener publishes through a bridge client while the bridge holds the
//! listener's subscription, so neither side would ever see its channel close
//! on its own. Shutdown first unsubscribes the finished-orders binding, lets
//! the listener finish every event it already took, and only then calls
//! `close()` on the bridge. The order store, which nothing cycles through,
//! stops when its last client is dropped.
//!
//! ## Observability
//!
//! Call [`setup_tracing`](springbucks_framework::tracing::setup_tracing) once
//! before [`WaiterSystem::start`]:
//!
//! ```bash
//! RUST_LOG=info cargo run      # orders, notifications, lifecycle
//! RUST_LOG=debug cargo run     # full payloads and envelopes
//! ```

pub mod waiter_system;

pub use waiter_system::*;
