//! Application layer.
//!
//! Command handler for inbound reward callbacks and the query handler for a
//! user's active rewards. Handlers depend only on ports.

pub mod handlers;

pub use handlers::{
    ActiveReward, GetUserEntitlementsHandler, GetUserEntitlementsQuery, GetUserEntitlementsResult,
    ProcessRewardCallbackCommand, ProcessRewardCallbackHandler, ProcessRewardCallbackResult,
};
