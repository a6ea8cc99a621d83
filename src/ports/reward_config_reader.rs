//! RewardConfigReader port - Read access to reward configuration.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::rewards::RewardConfig;

/// Port for reading the reward configuration document.
///
/// The document id is supplied by the caller (from application config);
/// readers never assume a well-known id.
#[async_trait]
pub trait RewardConfigReader: Send + Sync {
    /// Loads the configuration document with the given id.
    ///
    /// Returns `Ok(None)` if no such document exists.
    async fn load(&self, config_id: &str) -> Result<Option<RewardConfig>, DomainError>;
}
