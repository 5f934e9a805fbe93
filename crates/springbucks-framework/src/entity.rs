//! # ActorEntity Trait
//!
//! The contract a record type must satisfy to be kept by the generic
//! [`ResourceActor`](crate::ResourceActor). Associated types fix the id, the
//! creation and update DTOs, the injected context and the error type, so a
//! `CoffeeOrder` store can never be handed a payload meant for another store.
//!
//! `on_create` has a default no-op implementation; `on_update` must be written
//! by every entity because it owns the rules for changing its own state.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any record must implement to be managed by `ResourceActor`.
///
/// Hooks are async and receive the runtime `Context`, which is injected when
/// the actor is started (`run(context)`) rather than when it is built.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// Unique identifier. Generated by the actor from a `u64` counter.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + From<u64>;

    /// Data required to create a new record.
    type Create: Send + Sync + Debug;

    /// Data required to change an existing record.
    type Update: Send + Sync + Debug;

    /// Dependencies injected into the actor. Use `()` if none are needed.
    type Context: Send + Sync;

    /// One error type per entity; it crosses the actor boundary boxed inside
    /// [`FrameworkError::EntityError`](crate::FrameworkError::EntityError).
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the record from its id and creation payload.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Called after construction and before the record is stored.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Apply an update. Returning an error leaves the stored record untouched.
    async fn on_update(
        &mut self,
        update: Self::Update,
        ctx: &Self::Context,
    ) -> Result<(), Self::Error>;
}
