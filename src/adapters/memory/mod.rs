//! In-memory adapters for tests and single-process development.
//!
//! State lives in the process and is lost on restart. Use the Postgres and
//! Redis adapters for anything shared between instances.

mod entitlements_repository;
mod idempotency_guard;
mod reward_config_reader;

pub use entitlements_repository::InMemoryEntitlementsRepository;
pub use idempotency_guard::InMemoryIdempotencyGuard;
pub use reward_config_reader::StaticRewardConfigReader;
