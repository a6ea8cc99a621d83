//! HTTP adapter for ad network callbacks and entitlement queries.

mod dto;
mod handlers;
mod routes;

pub use dto::{CallbackResponse, EntitlementsResponse, ErrorResponse};
pub use handlers::{RewardApiError, RewardsAppState};
pub use routes::{rewards_router, with_request_timeout};
