//! Rewarded-ad networks that deliver server-side verification callbacks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ad network a callback originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdPlatform {
    AdMob,
    AppLovin,
    IronSource,
}

impl AdPlatform {
    /// Returns the lowercase path segment used for this platform.
    pub fn as_str(&self) -> &'static str {
        match self {
            AdPlatform::AdMob => "admob",
            AdPlatform::AppLovin => "applovin",
            AdPlatform::IronSource => "ironsource",
        }
    }
}

impl fmt::Display for AdPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AdPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admob" => Ok(AdPlatform::AdMob),
            "applovin" => Ok(AdPlatform::AppLovin),
            "ironsource" => Ok(AdPlatform::IronSource),
            _ => Err(format!("Unknown ad platform: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_path_segments() {
        assert_eq!("admob".parse::<AdPlatform>(), Ok(AdPlatform::AdMob));
        assert_eq!("AppLovin".parse::<AdPlatform>(), Ok(AdPlatform::AppLovin));
        assert_eq!("ironsource".parse::<AdPlatform>(), Ok(AdPlatform::IronSource));
    }

    #[test]
    fn rejects_unknown_platform() {
        assert!("unity".parse::<AdPlatform>().is_err());
    }
}
