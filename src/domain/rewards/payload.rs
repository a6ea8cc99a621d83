//! Normalized result of a successfully verified callback.

use serde::Serialize;

use super::reward_type::RewardType;
use crate::domain::foundation::{TransactionId, UserId};

/// Provider-independent reward, produced only by a signature verifier.
///
/// This is the sole input to entitlement granting. Provider-reported reward
/// amounts are deliberately absent: grant duration comes from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedRewardPayload {
    transaction_id: TransactionId,
    user_id: UserId,
    reward_type: RewardType,
}

impl VerifiedRewardPayload {
    pub fn new(transaction_id: TransactionId, user_id: UserId, reward_type: RewardType) -> Self {
        Self {
            transaction_id,
            user_id,
            reward_type,
        }
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn reward_type(&self) -> RewardType {
        self.reward_type
    }
}
