//! In-memory entitlements store with version checking.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::rewards::UserEntitlements;
use crate::ports::EntitlementsRepository;

/// In-memory implementation of the `EntitlementsRepository` port.
///
/// Applies the same version rules as the Postgres adapter, so concurrent
/// grants conflict here exactly as they would in production.
#[derive(Debug, Default)]
pub struct InMemoryEntitlementsRepository {
    records: RwLock<HashMap<String, UserEntitlements>>,
}

impl InMemoryEntitlementsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with a stored record.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl EntitlementsRepository for InMemoryEntitlementsRepository {
    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserEntitlements>, DomainError> {
        Ok(self.records.read().await.get(user_id.as_str()).cloned())
    }

    async fn create(&self, entitlements: &UserEntitlements) -> Result<(), DomainError> {
        let mut records = self.records.write().await;
        let key = entitlements.id.as_str();

        if records.contains_key(key) {
            return Err(DomainError::new(
                ErrorCode::AlreadyExists,
                format!("Entitlements already exist for user {}", key),
            ));
        }

        let mut stored = entitlements.clone();
        stored.version = 1;
        records.insert(key.to_string(), stored);
        Ok(())
    }

    async fn update(&self, entitlements: &UserEntitlements) -> Result<(), DomainError> {
        let mut records = self.records.write().await;
        let key = entitlements.id.as_str();

        let stored = records.get_mut(key).ok_or_else(|| {
            DomainError::new(
                ErrorCode::EntitlementsNotFound,
                format!("No entitlements for user {}", key),
            )
        })?;

        if stored.version != entitlements.version {
            return Err(DomainError::new(
                ErrorCode::ConcurrencyConflict,
                format!(
                    "Entitlements for user {} changed (expected version {}, found {})",
                    key, entitlements.version, stored.version
                ),
            ));
        }

        let mut next = entitlements.clone();
        next.version = stored.version + 1;
        *stored = next;
        Ok(())
    }
}
