//! Application configuration
//!
//! Loaded from environment variables with the `config` and `dotenvy` crates.
//! Variables use the `REWARD_GATE` prefix and `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use reward_gate::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod redis;
mod rewards;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use redis::RedisConfig;
pub use rewards::{AdMobConfig, AppLovinConfig, IronSourceConfig, RewardsConfig};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root configuration for the reward service.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub redis: RedisConfig,

    #[serde(default)]
    pub rewards: RewardsConfig,
}

impl AppConfig {
    /// Loads configuration from the environment.
    ///
    /// A `.env` file is read first if present.
    ///
    /// - `REWARD_GATE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `REWARD_GATE__REWARDS__APPLOVIN__SIGNING_SECRET=...` ->
    ///   `rewards.applovin.signing_secret`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or a value
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("REWARD_GATE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic checks across all sections.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.redis.validate()?;
        self.rewards.validate()?;
        // A slow key refresh must fail inside the request, not at the timeout.
        if self.rewards.admob.enabled
            && self.server.request_timeout_secs <= self.rewards.admob.fetch_timeout_secs
        {
            return Err(ValidationError::RequestTimeoutTooShort);
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
