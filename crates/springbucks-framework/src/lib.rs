//! # SpringBucks Framework
//!
//! Building blocks for the SpringBucks services, all built on the same actor
//! recipe: one Tokio task owns the state and processes requests sequentially,
//! while cheap cloneable clients send requests over an mpsc channel and wait
//! on a oneshot for the answer.
//!
//! ## Record stores
//!
//! - [`ActorEntity`] - the record type and its create/update rules
//! - [`ResourceActor`] - the task that owns the records
//! - [`ResourceClient`] - typed `create` / `get` / `update` handle
//!
//! ## Messaging
//!
//! - [`Message`] / [`Envelope`] - typed message with headers and its JSON wire form
//! - [`StreamBridge`] / [`BridgeClient`] - in-process broker with named bindings
//! - [`Publisher`] - the publishing seam, so code that sends can be tested
//!   against [`mock::RecordingPublisher`]
//! - [`consumer`] - binds a [`Consumer`] to a binding and applies a
//!   [`FailurePolicy`] when handling fails
//!
//! ## Dependency wiring
//!
//! Nothing is registered globally. A store receives its dependencies through
//! `run(context)`, and a consumer receives its collaborators through its own
//! constructor before it is passed to [`consumer::bind`]:
//!
//! ```rust
//! use springbucks_framework::{Message, Publisher, StreamBridge};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (bridge, client) = StreamBridge::new(32);
//!     tokio::spawn(bridge.run());
//!
//!     let mut notifications = client.subscribe("notifyOrders-out-0").await.unwrap();
//!     client
//!         .send("notifyOrders-out-0", Message::with_payload(42u64).header("customer", "Alice"))
//!         .await
//!         .unwrap();
//!
//!     let envelope = notifications.recv().await.unwrap();
//!     assert_eq!(envelope.header_value("customer"), Some("Alice"));
//! }
//! ```
//!
//! ## Concurrency Model
//!
//! - Each store and the bridge run in their own task; no locks guard their state
//! - Consumers handle every message in a separate task, so invocations overlap
//! - Clients are `Clone + Send + Sync` and can be shared by in-flight handlers
//!
//! ## Testing
//!
//! See [`mock`] for [`mock::MockClient`], the raw channel helpers and
//! [`mock::RecordingPublisher`].

pub mod actor;
pub mod bridge;
pub mod client;
pub mod consumer;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod message;
pub mod mock;
pub mod tracing;

pub use actor::ResourceActor;
pub use bridge::{BridgeClient, Publisher, StreamBridge, Subscription};
pub use client::ResourceClient;
pub use consumer::{BindingStats, Consumer, FailurePolicy};
pub use entity::ActorEntity;
pub use envelope::{Envelope, Message};
pub use error::FrameworkError;
pub use message::{BridgeRequest, ResourceRequest, Response};
