//! # Actor Requests
//!
//! Internal request types sent from the cloneable clients to the actors that
//! own state: [`ResourceRequest`] for record stores and [`BridgeRequest`] for
//! the stream bridge. Every request carries a oneshot [`Response`] sender.

use crate::bridge::Subscription;
use crate::entity::ActorEntity;
use crate::envelope::Envelope;
use crate::error::FrameworkError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Requests understood by a [`ResourceActor`](crate::ResourceActor).
///
/// The store only knows how to create, read and update. Records are never
/// deleted through the framework; the order lifecycle ends in a terminal
/// state instead.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
}

/// Requests understood by the [`StreamBridge`](crate::StreamBridge).
#[derive(Debug)]
pub enum BridgeRequest {
    /// Publish to every current subscriber of `binding`; answers with the
    /// number of deliveries.
    Send {
        binding: String,
        envelope: Envelope,
        respond_to: Response<usize>,
    },
    Subscribe {
        binding: String,
        respond_to: Response<Subscription>,
    },
    /// Drop every subscriber of `binding`; answers with how many were dropped.
    /// Their queued envelopes are still delivered.
    Unsubscribe {
        binding: String,
        respond_to: Response<usize>,
    },
    /// Drop every subscription and stop the bridge.
    Shutdown { respond_to: Response<()> },
}
