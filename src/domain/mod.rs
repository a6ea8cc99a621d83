//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `rewards` - Ad reward callbacks, verification helpers, and entitlements

pub mod foundation;
pub mod rewards;
