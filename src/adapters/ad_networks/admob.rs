//! AdMob server-side verification.
//!
//! AdMob signs the callback query string (minus `signature` and `key_id`)
//! with ECDSA P-256 / SHA-256. The signature arrives as URL-safe base64 of
//! an ASN.1 DER structure and is converted to fixed-width `r || s` before
//! verification.

use std::sync::Arc;

use async_trait::async_trait;
use http::Uri;
use p256::ecdsa::signature::Verifier;
use p256::ecdsa::Signature;

use crate::domain::rewards::signature::{decode_url_safe_base64, der_to_p1363};
use crate::domain::rewards::{
    AdMobCallback, AdPlatform, RewardError, RewardType, VerifiedRewardPayload,
};
use crate::ports::SignatureVerifier;

use super::key_cache::PublicKeyCache;

/// Verifies AdMob callbacks against the published key set.
pub struct AdMobVerifier {
    key_cache: Arc<PublicKeyCache>,
}

impl AdMobVerifier {
    pub fn new(key_cache: Arc<PublicKeyCache>) -> Self {
        Self { key_cache }
    }
}

#[async_trait]
impl SignatureVerifier for AdMobVerifier {
    fn platform(&self) -> AdPlatform {
        AdPlatform::AdMob
    }

    async fn verify(&self, uri: &Uri) -> Result<VerifiedRewardPayload, RewardError> {
        let callback = AdMobCallback::from_uri(uri)?;
        let content = callback.content_to_verify();

        let der = decode_url_safe_base64(&callback.signature)?;
        let key = self.key_cache.key_for(&callback.key_id).await?;

        let p1363 = der_to_p1363(&der)?;
        let signature = Signature::from_slice(&p1363)
            .map_err(|_| RewardError::invalid_input("Signature scalars are out of range"))?;

        key.verify(content.as_bytes(), &signature).map_err(|_| {
            tracing::warn!(
                transaction_id = %callback.transaction_id,
                key_id = %callback.key_id,
                "AdMob signature verification failed"
            );
            RewardError::invalid_input("Signature verification failed")
        })?;

        let reward_type = RewardType::from_name(&callback.reward_item).ok_or_else(|| {
            RewardError::bad_request(format!("Unknown reward type: {}", callback.reward_item))
        })?;

        tracing::debug!(
            transaction_id = %callback.transaction_id,
            user_id = %callback.user_id,
            reward_amount = callback.reward_amount,
            "AdMob callback verified"
        );

        Ok(VerifiedRewardPayload::new(
            callback.transaction_id,
            callback.user_id,
            reward_type,
        ))
    }
}
