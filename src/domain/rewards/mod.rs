//! Rewards domain module.
//!
//! Rewarded-ad callbacks, their normalized verified form, and the
//! entitlements they grant.
//!
//! # Module Structure
//!
//! - `callback` - Per-network callback parsing and validation
//! - `signature` - DER/base64/hex signature encoding helpers
//! - `payload` - Normalized `VerifiedRewardPayload`
//! - `entitlements` - `UserEntitlements` aggregate and the extend/restart rule
//! - `reward_config` - Server-side reward durations
//! - `errors` - `RewardError` taxonomy and HTTP mapping

mod callback;
mod entitlements;
mod errors;
mod payload;
mod platform;
mod reward_config;
mod reward_type;
pub mod signature;

pub use callback::{AdMobCallback, AppLovinCallback, IronSourceCallback, QueryParams};
pub use entitlements::UserEntitlements;
pub use errors::RewardError;
pub use payload::VerifiedRewardPayload;
pub use platform::AdPlatform;
pub use reward_config::{RewardConfig, RewardSettings, MAX_DURATION_DAYS};
pub use reward_type::RewardType;
