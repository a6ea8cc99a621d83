//! IronSource server-to-server callback verification.
//!
//! The signature is the hex HMAC-SHA256, keyed with the shared secret, of
//! `timestamp + eventId + appUserId + rewards` using the decoded values.
//! `rewards` has the form `"<amount> <rewardTypeName>"`.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use http::Uri;
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;

use crate::domain::rewards::signature::hex_digest_matches;
use crate::domain::rewards::{
    AdPlatform, IronSourceCallback, RewardError, RewardType, VerifiedRewardPayload,
};
use crate::ports::SignatureVerifier;

type HmacSha256 = Hmac<Sha256>;

/// Verifies IronSource callbacks with the shared secret.
pub struct IronSourceVerifier {
    shared_secret: Secret<String>,
}

impl IronSourceVerifier {
    pub fn new(shared_secret: Secret<String>) -> Self {
        Self { shared_secret }
    }

    fn compute_signature(&self, callback: &IronSourceCallback) -> Result<Vec<u8>, RewardError> {
        let mut mac = HmacSha256::new_from_slice(self.shared_secret.expose_secret().as_bytes())
            .map_err(|_| RewardError::server("Invalid IronSource shared secret"))?;

        mac.update(callback.timestamp.as_bytes());
        mac.update(callback.event_id.as_str().as_bytes());
        mac.update(callback.app_user_id.as_str().as_bytes());
        mac.update(callback.rewards.as_bytes());

        Ok(mac.finalize().into_bytes().to_vec())
    }
}

#[async_trait]
impl SignatureVerifier for IronSourceVerifier {
    fn platform(&self) -> AdPlatform {
        AdPlatform::IronSource
    }

    async fn verify(&self, uri: &Uri) -> Result<VerifiedRewardPayload, RewardError> {
        if self.shared_secret.expose_secret().is_empty() {
            return Err(RewardError::server("IronSource shared secret is not configured"));
        }

        let callback = IronSourceCallback::from_uri(uri)?;

        if !hex_digest_matches(&self.compute_signature(&callback)?, &callback.signature) {
            tracing::warn!(
                event_id = %callback.event_id,
                "IronSource signature verification failed"
            );
            return Err(RewardError::invalid_input("Signature verification failed"));
        }

        let (_amount, name) = callback.reward_parts()?;
        let reward_type = RewardType::from_name(name)
            .ok_or_else(|| RewardError::bad_request(format!("Unknown reward type: {}", name)))?;

        Ok(VerifiedRewardPayload::new(
            callback.event_id,
            callback.app_user_id,
            reward_type,
        ))
    }
}
