//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod rewards;

pub use rewards::{
    ActiveReward, GetUserEntitlementsHandler, GetUserEntitlementsQuery, GetUserEntitlementsResult,
    ProcessRewardCallbackCommand, ProcessRewardCallbackHandler, ProcessRewardCallbackResult,
};
