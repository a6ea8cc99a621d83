//! Ad network signature verifiers.
//!
//! One `SignatureVerifier` per platform. AdMob verifies ECDSA P-256
//! signatures against a cached public key set; AppLovin and IronSource check
//! keyed digests against a shared secret.

mod admob;
mod applovin;
mod http_key_source;
mod ironsource;
mod key_cache;

pub use admob::AdMobVerifier;
pub use applovin::AppLovinVerifier;
pub use http_key_source::{HttpPublicKeySource, ADMOB_KEY_SERVER_URL};
pub use ironsource::IronSourceVerifier;
pub use key_cache::{PublicKeyCache, DEFAULT_KEY_CACHE_TTL};

use std::sync::Arc;

use secrecy::{ExposeSecret, Secret};

use crate::config::RewardsConfig;
use crate::domain::foundation::DomainError;
use crate::ports::SignatureVerifier;

/// Builds the verifier for every network the configuration enables.
///
/// AdMob needs no secret and is on unless disabled. AppLovin and IronSource
/// are registered only when their secret is set.
pub fn verifiers_from_config(
    config: &RewardsConfig,
) -> Result<Vec<Arc<dyn SignatureVerifier>>, DomainError> {
    let mut verifiers: Vec<Arc<dyn SignatureVerifier>> = Vec::new();

    if config.admob.enabled {
        let source =
            HttpPublicKeySource::new(&config.admob.key_server_url, config.admob.fetch_timeout())?;
        let key_cache = PublicKeyCache::new(Arc::new(source), config.admob.key_cache_ttl());
        verifiers.push(Arc::new(AdMobVerifier::new(Arc::new(key_cache))));
    }

    if let Some(secret) = &config.applovin.signing_secret {
        verifiers.push(Arc::new(AppLovinVerifier::new(Secret::new(
            secret.expose_secret().clone(),
        ))));
    }

    if let Some(secret) = &config.ironsource.shared_secret {
        verifiers.push(Arc::new(IronSourceVerifier::new(Secret::new(
            secret.expose_secret().clone(),
        ))));
    }

    Ok(verifiers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AdMobConfig, AppLovinConfig, IronSourceConfig};
    use crate::domain::rewards::AdPlatform;

    fn platforms(config: &RewardsConfig) -> Vec<AdPlatform> {
        verifiers_from_config(config)
            .unwrap()
            .iter()
            .map(|v| v.platform())
            .collect()
    }

    #[test]
    fn defaults_register_admob_only() {
        assert_eq!(platforms(&RewardsConfig::default()), vec![AdPlatform::AdMob]);
    }

    #[test]
    fn secrets_register_their_networks() {
        let config = RewardsConfig {
            applovin: AppLovinConfig {
                signing_secret: Some(Secret::new("a".to_string())),
            },
            ironsource: IronSourceConfig {
                shared_secret: Some(Secret::new("b".to_string())),
            },
            ..Default::default()
        };

        assert_eq!(
            platforms(&config),
            vec![AdPlatform::AdMob, AdPlatform::AppLovin, AdPlatform::IronSource]
        );
    }

    #[test]
    fn admob_can_be_disabled() {
        let config = RewardsConfig {
            admob: AdMobConfig {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        };

        assert!(platforms(&config).is_empty());
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use p256::ecdsa::signature::Signer;
    use p256::ecdsa::{Signature, SigningKey};
    use p256::pkcs8::{EncodePublicKey, LineEnding};

    use crate::domain::foundation::{DomainError, ErrorCode};
    use crate::ports::{PublicKeyEntry, PublicKeySource};

    /// Deterministic signing key; `seed` must be non-zero.
    pub fn signing_key(seed: u8) -> SigningKey {
        SigningKey::from_slice(&[seed; 32]).unwrap()
    }

    pub fn public_pem(key: &SigningKey) -> String {
        key.verifying_key().to_public_key_pem(LineEnding::LF).unwrap()
    }

    /// Signs `content` the way AdMob does: DER, URL-safe base64, unpadded.
    pub fn sign_admob(key: &SigningKey, content: &str) -> String {
        let signature: Signature = key.sign(content.as_bytes());
        URL_SAFE_NO_PAD.encode(signature.to_der().as_bytes())
    }

    pub fn uri(s: &str) -> http::Uri {
        s.parse().unwrap()
    }

    /// In-memory key source that counts fetches.
    pub struct StaticKeySource {
        entries: Vec<PublicKeyEntry>,
        fail: bool,
        fetches: AtomicUsize,
    }

    impl StaticKeySource {
        pub fn empty() -> Self {
            Self {
                entries: Vec::new(),
                fail: false,
                fetches: AtomicUsize::new(0),
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::empty()
            }
        }

        pub fn with_key(key_id: &str, key: &SigningKey) -> Self {
            Self::empty().and_raw(key_id, &public_pem(key))
        }

        pub fn and_raw(mut self, key_id: &str, pem: &str) -> Self {
            self.entries.push(PublicKeyEntry {
                key_id: key_id.to_string(),
                pem: pem.to_string(),
            });
            self
        }

        pub fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PublicKeySource for StaticKeySource {
        async fn fetch_key_set(&self) -> Result<Vec<PublicKeyEntry>, DomainError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DomainError::new(
                    ErrorCode::ExternalServiceError,
                    "key server unavailable",
                ));
            }
            Ok(self.entries.clone())
        }
    }
}
