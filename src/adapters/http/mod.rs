//! HTTP adapters - REST API implementations.

pub mod rewards;

pub use rewards::{rewards_router, with_request_timeout, RewardsAppState};
