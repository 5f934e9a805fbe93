//! Pure data structures; [`CoffeeOrder`] implements [`ActorEntity`](springbucks_framework::ActorEntity).

pub mod order;

pub use order::*;
