//! EntitlementsRepository port - Persistence for `UserEntitlements`.
//!
//! Writes use optimistic concurrency on `UserEntitlements::version`:
//! - `create` stores an unsaved record (version 0) as version 1
//! - `update` succeeds only when the stored version equals the record's
//!   version, and stores `version + 1`

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::rewards::UserEntitlements;

/// Port for loading and storing per-user entitlements.
#[async_trait]
pub trait EntitlementsRepository: Send + Sync {
    /// Loads a user's entitlements.
    ///
    /// Returns `Ok(None)` if the user has never been granted anything.
    async fn find_by_user(&self, user_id: &UserId)
        -> Result<Option<UserEntitlements>, DomainError>;

    /// Stores a record for a user who has none yet.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if a record was created concurrently
    async fn create(&self, entitlements: &UserEntitlements) -> Result<(), DomainError>;

    /// Replaces an existing record.
    ///
    /// # Errors
    ///
    /// - `EntitlementsNotFound` if no record exists for the user
    /// - `ConcurrencyConflict` if the stored version moved on
    async fn update(&self, entitlements: &UserEntitlements) -> Result<(), DomainError>;
}
