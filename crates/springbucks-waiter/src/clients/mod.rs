//! Type-safe wrappers around [`ResourceClient`](springbucks_framework::ResourceClient).

pub mod lookup;
pub mod order_client;

pub use lookup::*;
pub use order_client::*;
