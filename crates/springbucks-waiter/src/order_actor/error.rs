//! Error types for the order store and the lookups made against it.

use crate::model::{OrderId, OrderState};
use thiserror::Error;

/// Errors that can occur during order operations.
///
/// `NotFound`, `Timeout` and `ActorCommunicationError` are the ways a lookup
/// can fail; the remaining variants come from the store's own rules.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// No order exists for the id.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// The lookup did not answer within the configured bound.
    #[error("Order lookup timed out: {0}")]
    Timeout(OrderId),

    /// State changes may only move forward through the lifecycle.
    #[error("Wrong state order: requested {requested}, current {current}")]
    InvalidState {
        current: OrderState,
        requested: OrderState,
    },

    /// The order data provided is invalid.
    #[error("Order validation error: {0}")]
    ValidationError(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
