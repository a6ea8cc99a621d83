//! IdempotencyGuard port - Durable at-most-once record of processed callbacks.
//!
//! Ad networks retry callbacks on timeouts and 5xx responses, and a captured
//! callback URL can be replayed. Every transaction id is therefore claimed
//! here before any entitlement is written.
//!
//! Records expire after a retention TTL chosen by the adapter.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp};

/// Record of a processed callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyRecord {
    /// Scoped transaction id, e.g. `admob:T1`.
    pub id: String,
    pub created_at: Timestamp,
}

impl IdempotencyRecord {
    pub fn new(id: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            id: id.into(),
            created_at,
        }
    }
}

/// Result of attempting to claim a transaction id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// This caller inserted the record and owns processing.
    Claimed,
    /// A record already existed; the callback is a duplicate.
    AlreadyProcessed,
}

/// Port for tracking which callbacks have been processed.
#[async_trait]
pub trait IdempotencyGuard: Send + Sync {
    /// Returns `true` if a live record exists for `id`.
    async fn is_event_processed(&self, id: &str) -> Result<bool, DomainError>;

    /// Writes a record for `id`, overwriting any existing one.
    async fn record_event(&self, id: &str) -> Result<(), DomainError>;

    /// Atomically inserts a record for `id` if none exists.
    ///
    /// Exactly one of several concurrent callers receives `Claimed`.
    async fn try_claim(&self, id: &str) -> Result<ClaimOutcome, DomainError>;

    /// Removes the record for `id` so a later delivery can be processed.
    ///
    /// Used when processing fails after a successful claim.
    async fn release(&self, id: &str) -> Result<(), DomainError>;
}
