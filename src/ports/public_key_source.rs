//! PublicKeySource port - Fetches the AdMob verifier key set.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// One published verification key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyEntry {
    pub key_id: String,
    /// SubjectPublicKeyInfo PEM of a P-256 key.
    pub pem: String,
}

/// Port for retrieving the full set of currently published keys.
#[async_trait]
pub trait PublicKeySource: Send + Sync {
    async fn fetch_key_set(&self) -> Result<Vec<PublicKeyEntry>, DomainError>;
}
