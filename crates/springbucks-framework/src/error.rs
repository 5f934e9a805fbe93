//! # Framework Errors
//!
//! Common error type shared by the resource actors, the stream bridge and the
//! consumer runtime.

/// Errors that can occur within the framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
    #[error("Payload codec error on binding {binding}: {source}")]
    Codec {
        binding: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FrameworkError {
    pub(crate) fn codec(binding: impl Into<String>, source: serde_json::Error) -> Self {
        FrameworkError::Codec {
            binding: binding.into(),
            source,
        }
    }
}
