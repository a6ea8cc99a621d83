//! Reward verification configuration
//!
//! Ad network secrets are optional. A network without a secret is simply not
//! registered, and its callbacks are rejected as unconfigured.

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const ONE_DAY_SECS: u64 = 24 * 60 * 60;
const MAX_IDEMPOTENCY_TTL_SECS: u64 = 365 * ONE_DAY_SECS;

/// Reward pipeline configuration
#[derive(Debug, Deserialize)]
pub struct RewardsConfig {
    /// Id of the `RewardConfig` document to grant from
    #[serde(default = "default_reward_config_id")]
    pub reward_config_id: String,

    /// Retention of processed-callback records
    #[serde(default = "default_idempotency_ttl")]
    pub idempotency_ttl_secs: u64,

    #[serde(default)]
    pub admob: AdMobConfig,

    #[serde(default)]
    pub applovin: AppLovinConfig,

    #[serde(default)]
    pub ironsource: IronSourceConfig,
}

/// AdMob key server settings
#[derive(Debug, Clone, Deserialize)]
pub struct AdMobConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_key_server_url")]
    pub key_server_url: String,

    #[serde(default = "default_key_cache_ttl")]
    pub key_cache_ttl_secs: u64,

    /// Bounds the inline key refresh on a cache miss
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

/// AppLovin MAX settings
#[derive(Debug, Default, Deserialize)]
pub struct AppLovinConfig {
    pub signing_secret: Option<Secret<String>>,
}

/// IronSource settings
#[derive(Debug, Default, Deserialize)]
pub struct IronSourceConfig {
    pub shared_secret: Option<Secret<String>>,
}

impl RewardsConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.reward_config_id.trim().is_empty() {
            return Err(ValidationError::MissingRequired("REWARDS__REWARD_CONFIG_ID"));
        }
        if self.idempotency_ttl_secs < ONE_DAY_SECS {
            return Err(ValidationError::IdempotencyTtlTooShort);
        }
        if self.idempotency_ttl_secs > MAX_IDEMPOTENCY_TTL_SECS {
            return Err(ValidationError::IdempotencyTtlTooLong);
        }
        self.admob.validate()?;
        check_secret("AppLovin", self.applovin.signing_secret.as_ref())?;
        check_secret("IronSource", self.ironsource.shared_secret.as_ref())?;
        Ok(())
    }
}

impl AdMobConfig {
    pub fn key_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.key_cache_ttl_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.enabled {
            return Ok(());
        }
        if !self.key_server_url.starts_with("https://") {
            return Err(ValidationError::KeyServerMustBeHttps);
        }
        if self.key_cache_ttl_secs == 0 || self.key_cache_ttl_secs > ONE_DAY_SECS {
            return Err(ValidationError::InvalidKeyCacheTtl);
        }
        if self.fetch_timeout_secs == 0 || self.fetch_timeout_secs > 60 {
            return Err(ValidationError::InvalidFetchTimeout);
        }
        Ok(())
    }
}

fn check_secret(network: &'static str, secret: Option<&Secret<String>>) -> Result<(), ValidationError> {
    match secret {
        Some(s) if s.expose_secret().trim().is_empty() => Err(ValidationError::EmptySecret(network)),
        _ => Ok(()),
    }
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            reward_config_id: default_reward_config_id(),
            idempotency_ttl_secs: default_idempotency_ttl(),
            admob: AdMobConfig::default(),
            applovin: AppLovinConfig::default(),
            ironsource: IronSourceConfig::default(),
        }
    }
}

impl Default for AdMobConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            key_server_url: default_key_server_url(),
            key_cache_ttl_secs: default_key_cache_ttl(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

fn default_reward_config_id() -> String {
    "default".to_string()
}

fn default_idempotency_ttl() -> u64 {
    30 * ONE_DAY_SECS
}

fn default_true() -> bool {
    true
}

fn default_key_server_url() -> String {
    crate::adapters::ad_networks::ADMOB_KEY_SERVER_URL.to_string()
}

fn default_key_cache_ttl() -> u64 {
    ONE_DAY_SECS
}

fn default_fetch_timeout() -> u64 {
    10
}
