//! # Generic Resource Actor
//!
//! The `ResourceActor` owns an in-memory record store and processes requests
//! one at a time, so the store needs no lock.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The generic actor that manages a collection of records.
///
/// # Usage Pattern
///
/// 1. **Create**: `ResourceActor::new()` returns the actor and its client.
/// 2. **Wire**: pass dependencies into `actor.run(context)`.
/// 3. **Run**: spawn the run loop in a background task.
///
/// ```rust
/// use springbucks_framework::{ActorEntity, ResourceActor};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Cup { id: u64, size: u32 }
/// #[derive(Debug)] struct CupCreate { size: u32 }
/// #[derive(Debug)] struct CupUpdate { size: u32 }
/// #[derive(Debug, thiserror::Error)] #[error("cup error")] struct CupError;
///
/// #[async_trait]
/// impl ActorEntity for Cup {
///     type Id = u64;
///     type Create = CupCreate;
///     type Update = CupUpdate;
///     type Context = ();
///     type Error = CupError;
///
///     fn from_create_params(id: u64, params: CupCreate) -> Result<Self, Self::Error> {
///         Ok(Self { id, size: params.size })
///     }
///     async fn on_update(&mut self, update: CupUpdate, _: &()) -> Result<(), Self::Error> {
///         self.size = update.size;
///         Ok(())
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = ResourceActor::<Cup>::new(10);
///     tokio::spawn(actor.run(()));
///
///     let id = client.create(CupCreate { size: 12 }).await.unwrap();
///     let cup = client.update(id, CupUpdate { size: 16 }).await.unwrap();
///     assert_eq!(cup.size, 16);
/// }
/// ```
///
/// ## Operations
///
/// * **Create**: takes the next id from the counter (starting at 1), builds the
///   record, runs `on_create`, stores it and answers with the id.
/// * **Get**: answers with a clone of the record, or `None`.
/// * **Update**: runs `on_update` on a copy and stores the copy only if the
///   hook succeeds; unknown ids answer `NotFound`.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id: u64,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a new `ResourceActor` and its associated `ResourceClient`.
    ///
    /// `buffer_size` is the capacity of the request channel; callers wait for
    /// space when it is full.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id: 1,
        };
        (actor, ResourceClient::new(sender))
    }

    /// Runs the event loop until every client has been dropped.
    pub async fn run(mut self, context: T::Context) {
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let id = T::Id::from(self.next_id);
                    self.next_id += 1;

                    let mut item = match T::from_create_params(id.clone(), params) {
                        Ok(item) => item,
                        Err(e) => {
                            warn!(entity_type, error = %e, "Create failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                            continue;
                        }
                    };
                    if let Err(e) = item.on_create(&context).await {
                        warn!(entity_type, error = %e, "on_create failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }
                    self.store.insert(id.clone(), item);
                    info!(entity_type, %id, size = self.store.len(), "Created");
                    let _ = respond_to.send(Ok(id));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    debug!(entity_type, %id, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    let Some(current) = self.store.get(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    let mut next = current.clone();
                    match next.on_update(update, &context).await {
                        Ok(()) => {
                            self.store.insert(id.clone(), next.clone());
                            info!(entity_type, %id, "Updated");
                            let _ = respond_to.send(Ok(next));
                        }
                        Err(e) => {
                            warn!(entity_type, %id, error = %e, "Update failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        }
                    }
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }
}
