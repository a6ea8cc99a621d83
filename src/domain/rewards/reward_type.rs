//! Reward types a rewarded ad can unlock.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A time-bounded feature a user can earn by watching a rewarded ad.
///
/// Serialized in camelCase (`"adFree"`), which is also the name ad networks
/// are configured to send back in their callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RewardType {
    /// Ads are hidden across the app.
    AdFree,
    /// Paywalled articles are readable.
    PremiumContent,
    /// Articles can be saved for offline reading.
    OfflineReading,
}

impl RewardType {
    /// All reward types, in declaration order.
    pub const ALL: [RewardType; 3] = [
        RewardType::AdFree,
        RewardType::PremiumContent,
        RewardType::OfflineReading,
    ];

    /// Returns the wire name of this reward type.
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardType::AdFree => "adFree",
            RewardType::PremiumContent => "premiumContent",
            RewardType::OfflineReading => "offlineReading",
        }
    }

    /// Maps a provider-supplied name onto a reward type, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|reward| reward.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for RewardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RewardType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("Unknown reward type: {}", s))
    }
}
