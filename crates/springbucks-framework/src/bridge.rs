//! # Stream Bridge
//!
//! An in-process message broker built the same way as the resource actors: a
//! single task owns the binding table and processes [`BridgeRequest`]s in
//! order, while any number of cloned [`BridgeClient`]s publish and subscribe.
//!
//! Bindings are created on first use. A send fans the envelope out to every
//! live subscriber of the binding; a send with no subscriber is dropped and
//! reports zero deliveries.

use crate::envelope::{Envelope, Message};
use crate::error::FrameworkError;
use crate::message::BridgeRequest;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

/// Publishing side of a channel binding.
///
/// Implemented by [`BridgeClient`] and, for tests, by
/// [`RecordingPublisher`](crate::mock::RecordingPublisher).
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publishes an already encoded envelope and returns the delivery count.
    async fn send_envelope(&self, binding: &str, envelope: Envelope)
        -> Result<usize, FrameworkError>;

    /// Encodes `message` and publishes it on `binding`.
    async fn send<P>(&self, binding: &str, message: Message<P>) -> Result<usize, FrameworkError>
    where
        P: Serialize + Send + 'static,
    {
        let envelope = message.into_envelope(binding)?;
        self.send_envelope(binding, envelope).await
    }
}

/// Receiving side of one subscription to a binding.
#[derive(Debug)]
pub struct Subscription {
    binding: String,
    receiver: mpsc::UnboundedReceiver<Envelope>,
}

impl Subscription {
    pub fn binding(&self) -> &str {
        &self.binding
    }

    /// Next envelope, or `None` once the bridge has shut down.
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.receiver.recv().await
    }
}

/// The broker actor.
pub struct StreamBridge {
    receiver: mpsc::Receiver<BridgeRequest>,
    bindings: HashMap<String, Vec<mpsc::UnboundedSender<Envelope>>>,
    sent: u64,
}

impl StreamBridge {
    /// Creates the bridge and its client. `buffer_size` bounds the request
    /// channel only. Subscriber queues are unbounded so a send never waits
    /// on a slow subscriber; consumers bound their own backlog through the
    /// in-flight limit of [`consumer::bind`](crate::consumer::bind).
    pub fn new(buffer_size: usize) -> (Self, BridgeClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let bridge = Self {
            receiver,
            bindings: HashMap::new(),
            sent: 0,
        };
        (bridge, BridgeClient { sender })
    }

    /// Runs until `Shutdown` is received or every client is dropped.
    pub async fn run(mut self) {
        info!("Stream bridge started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                BridgeRequest::Send {
                    binding,
                    envelope,
                    respond_to,
                } => {
                    let delivered = self.deliver(&binding, envelope);
                    self.sent += 1;
                    if delivered == 0 {
                        debug!(%binding, "No subscribers, message dropped");
                    } else {
                        debug!(%binding, delivered, "Sent");
                    }
                    let _ = respond_to.send(Ok(delivered));
                }
                BridgeRequest::Subscribe {
                    binding,
                    respond_to,
                } => {
                    let (sender, receiver) = mpsc::unbounded_channel();
                    let subscribers = self.bindings.entry(binding.clone()).or_default();
                    subscribers.push(sender);
                    info!(%binding, subscribers = subscribers.len(), "Subscribed");
                    let _ = respond_to.send(Ok(Subscription { binding, receiver }));
                }
                BridgeRequest::Unsubscribe {
                    binding,
                    respond_to,
                } => {
                    let dropped = self.bindings.remove(&binding).map_or(0, |subscribers| subscribers.len());
                    info!(%binding, dropped, "Unsubscribed");
                    let _ = respond_to.send(Ok(dropped));
                }
                BridgeRequest::Shutdown { respond_to } => {
                    self.bindings.clear();
                    let _ = respond_to.send(Ok(()));
                    break;
                }
            }
        }

        info!(sent = self.sent, "Stream bridge shutdown");
    }

    fn deliver(&mut self, binding: &str, envelope: Envelope) -> usize {
        let Some(subscribers) = self.bindings.get_mut(binding) else {
            return 0;
        };
        subscribers.retain(|subscriber| {
            let open = !subscriber.is_closed();
            if !open {
                warn!(%binding, "Pruning closed subscriber");
            }
            open
        });
        subscribers
            .iter()
            .filter(|subscriber| subscriber.send(envelope.clone()).is_ok())
            .count()
    }
}

/// Cloneable handle to the [`StreamBridge`]. Safe for concurrent use.
#[derive(Clone)]
pub struct BridgeClient {
    sender: mpsc::Sender<BridgeRequest>,
}

impl BridgeClient {
    #[instrument(skip(self))]
    pub async fn subscribe(&self, binding: &str) -> Result<Subscription, FrameworkError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(BridgeRequest::Subscribe {
                binding: binding.to_string(),
                respond_to,
            })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    /// Ends every subscription to `binding` while the bridge keeps running.
    /// Subscribers still receive what was queued for them before this call.
    #[instrument(skip(self))]
    pub async fn unsubscribe(&self, binding: &str) -> Result<usize, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(BridgeRequest::Unsubscribe {
                binding: binding.to_string(),
                respond_to,
            })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    /// Stops the bridge. Subscriptions end and later sends fail with
    /// `ActorClosed`.
    #[instrument(skip(self))]
    pub async fn close(&self) -> Result<(), FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(BridgeRequest::Shutdown { respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }
}

#[async_trait]
impl Publisher for BridgeClient {
    #[instrument(skip(self, envelope))]
    async fn send_envelope(
        &self,
        binding: &str,
        envelope: Envelope,
    ) -> Result<usize, FrameworkError> {
        debug!(?envelope, "Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(BridgeRequest::Send {
                binding: binding.to_string(),
                envelope,
                respond_to,
            })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }
}
