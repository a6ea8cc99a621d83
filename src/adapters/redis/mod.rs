//! Redis adapters.

mod idempotency_guard;

pub use idempotency_guard::RedisIdempotencyGuard;
