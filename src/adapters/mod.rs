//! Adapters - Implementations of port interfaces.
//!
//! - `ad_networks` - Signature verifiers and the AdMob key cache
//! - `memory` - In-process storage for tests and local development
//! - `postgres` - Entitlements and reward configuration storage
//! - `redis` - Shared idempotency guard
//! - `http` - Axum routes

pub mod ad_networks;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod redis;
