//! In-memory idempotency guard with record expiry.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::{ClaimOutcome, IdempotencyGuard, IdempotencyRecord};

/// Default retention for processed-callback records (30 days).
pub const DEFAULT_RETENTION_SECS: u64 = 30 * 24 * 60 * 60;

/// In-memory implementation of the `IdempotencyGuard` port.
///
/// Expired records are ignored on read. Each claim drops every expired
/// record, so the map stays bounded by the live window.
#[derive(Debug)]
pub struct InMemoryIdempotencyGuard {
    records: RwLock<HashMap<String, IdempotencyRecord>>,
    ttl_secs: u64,
}

impl Default for InMemoryIdempotencyGuard {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_RETENTION_SECS)
    }
}

impl InMemoryIdempotencyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl_secs: u64) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            ttl_secs,
        }
    }

    fn is_live(&self, record: &IdempotencyRecord, now: &Timestamp) -> bool {
        // A TTL past the end of time never expires.
        record
            .created_at
            .checked_plus_secs(self.ttl_secs)
            .map_or(true, |expiry| expiry.is_after(now))
    }

    /// Drops records expired at `now` and returns how many were removed.
    pub async fn purge_expired(&self, now: Timestamp) -> usize {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| self.is_live(record, &now));
        before - records.len()
    }

    /// Number of records held, live or expired.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl IdempotencyGuard for InMemoryIdempotencyGuard {
    async fn is_event_processed(&self, id: &str) -> Result<bool, DomainError> {
        let now = Timestamp::now();
        Ok(self
            .records
            .read()
            .await
            .get(id)
            .map(|record| self.is_live(record, &now))
            .unwrap_or(false))
    }

    async fn record_event(&self, id: &str) -> Result<(), DomainError> {
        self.records
            .write()
            .await
            .insert(id.to_string(), IdempotencyRecord::new(id, Timestamp::now()));
        Ok(())
    }

    async fn try_claim(&self, id: &str) -> Result<ClaimOutcome, DomainError> {
        let now = Timestamp::now();
        let mut records = self.records.write().await;
        records.retain(|_, record| self.is_live(record, &now));

        if records.contains_key(id) {
            return Ok(ClaimOutcome::AlreadyProcessed);
        }

        records.insert(id.to_string(), IdempotencyRecord::new(id, now));
        Ok(ClaimOutcome::Claimed)
    }

    async fn release(&self, id: &str) -> Result<(), DomainError> {
        self.records.write().await.remove(id);
        Ok(())
    }
}
