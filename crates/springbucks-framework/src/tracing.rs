//! # Observability
//!
//! Structured logging for every actor, binding and client call.
//!
//! ```bash
//! RUST_LOG=info cargo run      # lifecycle, deliveries, notifications
//! RUST_LOG=debug cargo run     # full payloads and envelopes
//! RUST_LOG=springbucks_framework=debug,info cargo run
//! ```
//!
//! Log lines use structured fields instead of module paths: store actors tag
//! events with `entity_type`, the bridge and consumers with `binding`.

/// Initializes the global subscriber. Call once, at process start.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
