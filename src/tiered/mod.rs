//! Tiered Module
//!
//! Asynchronous tier contracts and the coordinator composing a primary with a fallback.

mod contract;
mod coordinator;
mod local;

pub use contract::{AsyncStore, RemoteStore};
pub use coordinator::{TierOutcome, TieredCache};
pub use local::LocalTier;
