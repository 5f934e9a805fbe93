//! # Consumer Runtime
//!
//! Registers a [`Consumer`] on a bridge binding. The runtime owns everything
//! the consumer itself does not decide: decoding, per-message task dispatch
//! and what happens when a message cannot be handled ([`FailurePolicy`]).
//!
//! ```rust
//! use springbucks_framework::consumer::{self, Consumer, FailurePolicy};
//! use springbucks_framework::{Message, Publisher, StreamBridge};
//! use async_trait::async_trait;
//!
//! struct Printer;
//!
//! #[async_trait]
//! impl Consumer for Printer {
//!     type Payload = u64;
//!     type Error = std::io::Error;
//!
//!     async fn accept(&self, message: Message<u64>) -> Result<(), Self::Error> {
//!         println!("order {}", message.payload);
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (bridge, client) = StreamBridge::new(16);
//!     let bridge_handle = tokio::spawn(bridge.run());
//!
//!     let binding = consumer::bind(&client, "finishedOrders", Printer, FailurePolicy::LogAndDrop)
//!         .await
//!         .unwrap();
//!     client.send("finishedOrders", Message::with_payload(1u64)).await.unwrap();
//!
//!     client.close().await.unwrap();
//!     bridge_handle.await.unwrap();
//!     let stats = binding.await.unwrap();
//!     assert_eq!(stats.received, 1);
//! }
//! ```

use crate::bridge::{BridgeClient, Publisher};
use crate::envelope::{Envelope, Message};
use crate::error::FrameworkError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

/// Header carrying the failure reason on dead-lettered envelopes.
pub const EXCEPTION_MESSAGE_HEADER: &str = "x-exception-message";

/// Message handler bound to one binding.
#[async_trait]
pub trait Consumer: Send + Sync + 'static {
    type Payload: DeserializeOwned + Send + Debug + 'static;
    type Error: std::error::Error + Send + Sync + 'static;

    async fn accept(&self, message: Message<Self::Payload>) -> Result<(), Self::Error>;
}

/// What the runtime does with a message the consumer failed to handle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log the failure and move on.
    #[default]
    LogAndDrop,
    /// Log the failure and republish the original envelope on this binding.
    DeadLetter(String),
}

/// Counters returned when a binding stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindingStats {
    pub received: u64,
    pub succeeded: u64,
    pub failed: u64,
}

impl BindingStats {
    fn record(&mut self, ok: bool) {
        if ok {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Handlers allowed to run at once by [`bind`].
pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;

/// Subscribes `consumer` to `binding` with [`DEFAULT_MAX_IN_FLIGHT`].
pub async fn bind<C: Consumer>(
    bridge: &BridgeClient,
    binding: &str,
    consumer: C,
    policy: FailurePolicy,
) -> Result<JoinHandle<BindingStats>, FrameworkError> {
    bind_with_limit(bridge, binding, consumer, policy, DEFAULT_MAX_IN_FLIGHT).await
}

/// Subscribes `consumer` to `binding` and starts dispatching.
///
/// Each envelope is handled in its own task, at most `max_in_flight` at a
/// time; further envelopes wait in the subscription queue. The returned task
/// ends once the subscription ends (bridge shutdown or
/// [`BridgeClient::unsubscribe`]) and every in-flight handler has finished.
pub async fn bind_with_limit<C: Consumer>(
    bridge: &BridgeClient,
    binding: &str,
    consumer: C,
    policy: FailurePolicy,
    max_in_flight: usize,
) -> Result<JoinHandle<BindingStats>, FrameworkError> {
    let mut subscription = bridge.subscribe(binding).await?;
    let consumer = Arc::new(consumer);
    let bridge = bridge.clone();
    let binding = binding.to_string();
    let limit = Arc::new(Semaphore::new(max_in_flight.max(1)));
    info!(%binding, ?policy, max_in_flight, "Consumer bound");

    Ok(tokio::spawn(async move {
        let mut stats = BindingStats::default();
        let mut in_flight = JoinSet::new();

        while let Some(envelope) = subscription.recv().await {
            stats.received += 1;
            while let Some(done) = in_flight.try_join_next() {
                stats.record(matches!(done, Ok(true)));
            }

            let message = match envelope.decode::<C::Payload>(&binding) {
                Ok(message) => message,
                Err(e) => {
                    handle_failure(&bridge, &binding, &policy, envelope, &e).await;
                    stats.failed += 1;
                    continue;
                }
            };

            let Ok(permit) = limit.clone().acquire_owned().await else {
                break;
            };
            let consumer = consumer.clone();
            let bridge = bridge.clone();
            let binding = binding.clone();
            let policy = policy.clone();
            in_flight.spawn(async move {
                let _permit = permit;
                debug!(%binding, payload = ?message.payload, "Dispatching");
                match consumer.accept(message).await {
                    Ok(()) => true,
                    Err(e) => {
                        handle_failure(&bridge, &binding, &policy, envelope, &e).await;
                        false
                    }
                }
            });
        }

        while let Some(done) = in_flight.join_next().await {
            if let Err(e) = &done {
                error!(%binding, error = %e, "Handler task panicked");
            }
            stats.record(matches!(done, Ok(true)));
        }

        info!(
            %binding,
            received = stats.received,
            succeeded = stats.succeeded,
            failed = stats.failed,
            "Consumer stopped"
        );
        stats
    }))
}

async fn handle_failure(
    bridge: &BridgeClient,
    binding: &str,
    policy: &FailurePolicy,
    envelope: Envelope,
    cause: &(dyn std::error::Error + Send + Sync),
) {
    error!(%binding, error = %cause, "Message handling failed");

    if let FailurePolicy::DeadLetter(dead_letter) = policy {
        let envelope = envelope.with_header(EXCEPTION_MESSAGE_HEADER, cause.to_string());
        match bridge.send_envelope(dead_letter, envelope).await {
            Ok(delivered) => info!(%binding, %dead_letter, delivered, "Dead-lettered"),
            Err(e) => warn!(%binding, %dead_letter, error = %e, "Dead-letter publish failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::StreamBridge;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Debug, thiserror::Error)]
    #[error("odd id {0}")]
    struct OddId(u64);

    /// Accepts even ids, rejects odd ones.
    struct EvenOnly {
        seen: Arc<AtomicU64>,
    }

    #[async_trait]
    impl Consumer for EvenOnly {
        type Payload = u64;
        type Error = OddId;

        async fn accept(&self, message: Message<u64>) -> Result<(), OddId> {
            self.seen.fetch_add(1, Ordering::SeqCst);
            if message.payload % 2 == 0 {
                Ok(())
            } else {
                Err(OddId(message.payload))
            }
        }
    }

    #[tokio::test]
    async fn test_bind_counts_successes_and_failures() {
        let (bridge, client) = StreamBridge::new(16);
        let bridge_handle = tokio::spawn(bridge.run());
        let seen = Arc::new(AtomicU64::new(0));

        let handle = bind(
            &client,
            "finishedOrders",
            EvenOnly { seen: seen.clone() },
            FailurePolicy::LogAndDrop,
        )
        .await
        .unwrap();

        for id in 1..=4u64 {
            client
                .send("finishedOrders", Message::with_payload(id))
                .await
                .unwrap();
        }

        client.close().await.unwrap();
        bridge_handle.await.unwrap();
        let stats = handle.await.unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 4);
        assert_eq!(
            stats,
            BindingStats {
                received: 4,
                succeeded: 2,
                failed: 2
            }
        );
    }

    #[tokio::test]
    async fn test_undecodable_payload_is_a_failure() {
        let (bridge, client) = StreamBridge::new(16);
        let bridge_handle = tokio::spawn(bridge.run());
        let seen = Arc::new(AtomicU64::new(0));

        let handle = bind(
            &client,
            "finishedOrders",
            EvenOnly { seen: seen.clone() },
            FailurePolicy::LogAndDrop,
        )
        .await
        .unwrap();

        client
            .send("finishedOrders", Message::with_payload("forty-two"))
            .await
            .unwrap();

        client.close().await.unwrap();
        bridge_handle.await.unwrap();
        let stats = handle.await.unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 0);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.succeeded, 0);
    }

    #[tokio::test]
    async fn test_dead_letter_policy_republishes_with_reason() {
        let (bridge, client) = StreamBridge::new(16);
        let bridge_handle = tokio::spawn(bridge.run());
        let mut dead_letters = client.subscribe("finishedOrders.dlq").await.unwrap();

        let handle = bind(
            &client,
            "finishedOrders",
            EvenOnly {
                seen: Arc::new(AtomicU64::new(0)),
            },
            FailurePolicy::DeadLetter("finishedOrders.dlq".to_string()),
        )
        .await
        .unwrap();

        client
            .send("finishedOrders", Message::with_payload(7u64))
            .await
            .unwrap();

        let envelope = dead_letters.recv().await.unwrap();
        assert_eq!(envelope.payload, serde_json::json!(7));
        assert_eq!(
            envelope.header_value(EXCEPTION_MESSAGE_HEADER),
            Some("odd id 7")
        );

        client.close().await.unwrap();
        bridge_handle.await.unwrap();
        assert_eq!(handle.await.unwrap().failed, 1);
    }

    /// Records the highest number of overlapping `accept` calls.
    struct Slow {
        running: Arc<AtomicU64>,
        peak: Arc<AtomicU64>,
    }

    #[async_trait]
    impl Consumer for Slow {
        type Payload = u64;
        type Error = OddId;

        async fn accept(&self, _message: Message<u64>) -> Result<(), OddId> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            self.running.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_in_flight_handlers_are_limited() {
        let (bridge, client) = StreamBridge::new(16);
        let bridge_handle = tokio::spawn(bridge.run());
        let peak = Arc::new(AtomicU64::new(0));

        let handle = bind_with_limit(
            &client,
            "finishedOrders",
            Slow {
                running: Arc::new(AtomicU64::new(0)),
                peak: peak.clone(),
            },
            FailurePolicy::LogAndDrop,
            2,
        )
        .await
        .unwrap();

        for id in 0..8u64 {
            client
                .send("finishedOrders", Message::with_payload(id))
                .await
                .unwrap();
        }

        client.unsubscribe("finishedOrders").await.unwrap();
        let stats = handle.await.unwrap();
        client.close().await.unwrap();
        bridge_handle.await.unwrap();

        assert_eq!(stats.succeeded, 8);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }
}
