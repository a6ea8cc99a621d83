//! Redis-backed idempotency guard for multi-instance deployments.
//!
//! Each processed callback is a key `reward:processed:<platform>:<txid>`
//! holding its processing time. Claims use `SET NX EX`, so exactly one
//! instance wins a race and records expire on their own.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::ports::{ClaimOutcome, IdempotencyGuard};

const KEY_PREFIX: &str = "reward:processed:";

/// Redis implementation of the `IdempotencyGuard` port.
#[derive(Clone)]
pub struct RedisIdempotencyGuard {
    conn: MultiplexedConnection,
    ttl_secs: u64,
}

impl RedisIdempotencyGuard {
    pub fn new(conn: MultiplexedConnection, ttl_secs: u64) -> Self {
        Self { conn, ttl_secs }
    }
}

fn processed_key(id: &str) -> String {
    format!("{}{}", KEY_PREFIX, id)
}

fn cache_error(action: &str, e: redis::RedisError) -> DomainError {
    DomainError::new(
        ErrorCode::CacheError,
        format!("Failed to {} processed callback: {}", action, e),
    )
}

#[async_trait]
impl IdempotencyGuard for RedisIdempotencyGuard {
    async fn is_event_processed(&self, id: &str) -> Result<bool, DomainError> {
        let mut conn = self.conn.clone();
        conn.exists(processed_key(id))
            .await
            .map_err(|e| cache_error("check", e))
    }

    async fn record_event(&self, id: &str) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(processed_key(id))
            .arg(Timestamp::now().as_datetime().to_rfc3339())
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| cache_error("record", e))
    }

    async fn try_claim(&self, id: &str) -> Result<ClaimOutcome, DomainError> {
        let mut conn = self.conn.clone();

        // Nil reply means the key already existed.
        let reply: Option<String> = redis::cmd("SET")
            .arg(processed_key(id))
            .arg(Timestamp::now().as_datetime().to_rfc3339())
            .arg("NX")
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async(&mut conn)
            .await
            .map_err(|e| cache_error("claim", e))?;

        Ok(match reply {
            Some(_) => ClaimOutcome::Claimed,
            None => ClaimOutcome::AlreadyProcessed,
        })
    }

    async fn release(&self, id: &str) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(processed_key(id))
            .await
            .map_err(|e| cache_error("release", e))
    }
}
