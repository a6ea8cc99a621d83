//! Reward handlers.

mod get_user_entitlements;
mod process_reward_callback;

pub use get_user_entitlements::{
    ActiveReward, GetUserEntitlementsHandler, GetUserEntitlementsQuery, GetUserEntitlementsResult,
};
pub use process_reward_callback::{
    ProcessRewardCallbackCommand, ProcessRewardCallbackHandler, ProcessRewardCallbackResult,
};
