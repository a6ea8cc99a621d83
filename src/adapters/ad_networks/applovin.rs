//! AppLovin MAX server-side callback verification.
//!
//! The signature is the lowercase hex MD5 of
//! `event_id + user_id + ts + signing_secret`.

use async_trait::async_trait;
use http::Uri;
use md5::{Digest, Md5};
use secrecy::{ExposeSecret, Secret};

use crate::domain::rewards::signature::hex_digest_matches;
use crate::domain::rewards::{
    AdPlatform, AppLovinCallback, RewardError, RewardType, VerifiedRewardPayload,
};
use crate::ports::SignatureVerifier;

/// Verifies AppLovin callbacks with the account signing secret.
pub struct AppLovinVerifier {
    signing_secret: Secret<String>,
}

impl AppLovinVerifier {
    pub fn new(signing_secret: Secret<String>) -> Self {
        Self { signing_secret }
    }

    fn digest(&self, callback: &AppLovinCallback) -> Vec<u8> {
        Md5::new()
            .chain_update(callback.event_id.as_str())
            .chain_update(callback.user_id.as_str())
            .chain_update(&callback.timestamp)
            .chain_update(self.signing_secret.expose_secret())
            .finalize()
            .to_vec()
    }
}

#[async_trait]
impl SignatureVerifier for AppLovinVerifier {
    fn platform(&self) -> AdPlatform {
        AdPlatform::AppLovin
    }

    async fn verify(&self, uri: &Uri) -> Result<VerifiedRewardPayload, RewardError> {
        if self.signing_secret.expose_secret().is_empty() {
            return Err(RewardError::server("AppLovin signing secret is not configured"));
        }

        let callback = AppLovinCallback::from_uri(uri)?;

        if !hex_digest_matches(&self.digest(&callback), &callback.signature) {
            tracing::warn!(
                event_id = %callback.event_id,
                "AppLovin signature verification failed"
            );
            return Err(RewardError::invalid_input("Signature verification failed"));
        }

        let reward_type = RewardType::from_name(&callback.reward_name).ok_or_else(|| {
            RewardError::bad_request(format!("Unknown reward type: {}", callback.reward_name))
        })?;

        Ok(VerifiedRewardPayload::new(
            callback.event_id,
            callback.user_id,
            reward_type,
        ))
    }
}
