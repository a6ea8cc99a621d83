//! GetUserEntitlementsHandler - Query handler for a user's unexpired rewards.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::rewards::{RewardError, RewardType};
use crate::ports::EntitlementsRepository;

/// Query for the rewards a user holds right now.
#[derive(Debug, Clone)]
pub struct GetUserEntitlementsQuery {
    pub user_id: UserId,
}

/// One reward the user currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveReward {
    pub reward_type: RewardType,
    pub expires_at: Timestamp,
}

/// Unexpired rewards, ordered by reward type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetUserEntitlementsResult {
    pub user_id: UserId,
    pub active_rewards: Vec<ActiveReward>,
}

/// Handler for entitlement queries.
///
/// A user who was never granted anything has no active rewards; this is not
/// an error.
pub struct GetUserEntitlementsHandler {
    repository: Arc<dyn EntitlementsRepository>,
}

impl GetUserEntitlementsHandler {
    pub fn new(repository: Arc<dyn EntitlementsRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        query: GetUserEntitlementsQuery,
    ) -> Result<GetUserEntitlementsResult, RewardError> {
        let now = Timestamp::now();
        let active_rewards = self
            .repository
            .find_by_user(&query.user_id)
            .await?
            .map(|entitlements| {
                entitlements
                    .active_rewards_at(now)
                    .into_iter()
                    .map(|(reward_type, expires_at)| ActiveReward {
                        reward_type,
                        expires_at,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(GetUserEntitlementsResult {
            user_id: query.user_id,
            active_rewards,
        })
    }
}
