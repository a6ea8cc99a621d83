//! Time-bounded cache of AdMob verification keys.
//!
//! The key set is held as one immutable snapshot (keys + fetch time) behind
//! an `Arc`, and refreshing replaces the whole snapshot. Readers never see a
//! half-updated map.
//!
//! A key id that is missing from a fresh snapshot is rejected without a
//! refetch, so a rotated key is only picked up once the TTL lapses.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use p256::ecdsa::VerifyingKey;
use p256::pkcs8::DecodePublicKey;
use tokio::sync::RwLock;

use crate::domain::rewards::RewardError;
use crate::ports::PublicKeySource;

/// AdMob recommends caching its key set for no longer than 24 hours.
pub const DEFAULT_KEY_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Parsed key set with expiry tracking.
struct KeySetSnapshot {
    keys: HashMap<String, VerifyingKey>,
    fetched_at: Instant,
    ttl: Duration,
}

impl KeySetSnapshot {
    fn is_expired(&self) -> bool {
        self.fetched_at.elapsed() >= self.ttl
    }
}

/// Caches the AdMob key set and refreshes it inline when stale.
pub struct PublicKeyCache {
    source: Arc<dyn PublicKeySource>,
    ttl: Duration,
    snapshot: RwLock<Option<Arc<KeySetSnapshot>>>,
}

impl PublicKeyCache {
    /// Creates an empty cache. Nothing is fetched until the first lookup.
    pub fn new(source: Arc<dyn PublicKeySource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            snapshot: RwLock::new(None),
        }
    }

    /// Resolves the verifying key for `key_id`.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the key id is not in the current key set
    /// - `OperationFailed` if the key set could not be fetched
    pub async fn key_for(&self, key_id: &str) -> Result<VerifyingKey, RewardError> {
        let snapshot = self.current().await?;

        snapshot.keys.get(key_id).cloned().ok_or_else(|| {
            tracing::warn!(key_id = %key_id, "Unknown AdMob key id");
            RewardError::invalid_input(format!("Unknown key_id: {}", key_id))
        })
    }

    /// Returns a fresh snapshot, refreshing if empty or expired.
    async fn current(&self) -> Result<Arc<KeySetSnapshot>, RewardError> {
        if let Some(snapshot) = self.snapshot.read().await.as_ref() {
            if !snapshot.is_expired() {
                return Ok(Arc::clone(snapshot));
            }
        }

        let mut guard = self.snapshot.write().await;

        // A concurrent request may have refreshed while we waited.
        if let Some(snapshot) = guard.as_ref() {
            if !snapshot.is_expired() {
                return Ok(Arc::clone(snapshot));
            }
        }

        let snapshot = Arc::new(self.refresh().await?);
        *guard = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    async fn refresh(&self) -> Result<KeySetSnapshot, RewardError> {
        let entries = self.source.fetch_key_set().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch AdMob key set");
            RewardError::operation_failed(format!("Failed to fetch AdMob key set: {}", e))
        })?;

        let mut keys = HashMap::with_capacity(entries.len());
        for entry in entries {
            match VerifyingKey::from_public_key_pem(&entry.pem) {
                Ok(key) => {
                    keys.insert(entry.key_id, key);
                }
                Err(e) => {
                    tracing::warn!(key_id = %entry.key_id, error = %e, "Skipping unparseable AdMob key");
                }
            }
        }

        if keys.is_empty() {
            return Err(RewardError::operation_failed(
                "AdMob key set contained no usable keys",
            ));
        }

        tracing::debug!(key_count = keys.len(), "Refreshed AdMob key set");

        Ok(KeySetSnapshot {
            keys,
            fetched_at: Instant::now(),
            ttl: self.ttl,
        })
    }
}
