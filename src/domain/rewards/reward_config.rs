//! Server-side reward configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::errors::RewardError;
use super::reward_type::RewardType;

/// Longest single grant a configuration may specify (ten years).
pub const MAX_DURATION_DAYS: i64 = 3650;

/// Settings for one reward type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardSettings {
    pub enabled: bool,
    pub duration_days: i64,
}

impl RewardSettings {
    pub fn enabled(duration_days: i64) -> Self {
        Self {
            enabled: true,
            duration_days,
        }
    }

    pub fn disabled(duration_days: i64) -> Self {
        Self {
            enabled: false,
            duration_days,
        }
    }
}

/// Per-reward-type settings, read-only at runtime.
///
/// This is the only source of grant duration. Amounts reported by the ad
/// network are ignored so a tampered client or network cannot inflate a grant.
///
/// Stored as a JSON object keyed by reward type:
/// `{"adFree": {"enabled": true, "durationDays": 7}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RewardConfig {
    rewards: HashMap<RewardType, RewardSettings>,
}

impl RewardConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for one reward type.
    pub fn with_reward(mut self, reward: RewardType, settings: RewardSettings) -> Self {
        self.rewards.insert(reward, settings);
        self
    }

    pub fn settings_for(&self, reward: RewardType) -> Option<&RewardSettings> {
        self.rewards.get(&reward)
    }

    /// Duration to grant for a reward type.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the reward type is unconfigured or disabled
    /// - `ServerException` if the configured duration is not in
    ///   `1..=MAX_DURATION_DAYS`
    pub fn grant_duration_days(&self, reward: RewardType) -> Result<i64, RewardError> {
        let settings = self.settings_for(reward).ok_or_else(|| {
            RewardError::forbidden(format!("Reward type {} is not configured", reward))
        })?;

        if !settings.enabled {
            return Err(RewardError::forbidden(format!(
                "Reward type {} is disabled",
                reward
            )));
        }

        if settings.duration_days <= 0 {
            return Err(RewardError::server(format!(
                "Reward type {} has non-positive duration {}",
                reward, settings.duration_days
            )));
        }

        if settings.duration_days > MAX_DURATION_DAYS {
            return Err(RewardError::server(format!(
                "Reward type {} duration {} exceeds {} days",
                reward, settings.duration_days, MAX_DURATION_DAYS
            )));
        }

        Ok(settings.duration_days)
    }
}
