//! Response bodies for reward endpoints.

use serde::Serialize;

use crate::application::handlers::rewards::{
    ActiveReward, GetUserEntitlementsResult, ProcessRewardCallbackResult,
};
use crate::domain::foundation::Timestamp;
use crate::domain::rewards::RewardType;

/// Body returned to the ad network for an accepted callback.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CallbackResponse {
    #[serde(rename_all = "camelCase")]
    Granted {
        user_id: String,
        reward_type: RewardType,
        expires_at: Timestamp,
    },
    #[serde(rename_all = "camelCase")]
    AlreadyProcessed { transaction_id: String },
}

impl From<ProcessRewardCallbackResult> for CallbackResponse {
    fn from(result: ProcessRewardCallbackResult) -> Self {
        match result {
            ProcessRewardCallbackResult::Granted {
                user_id,
                reward_type,
                expires_at,
            } => CallbackResponse::Granted {
                user_id: user_id.to_string(),
                reward_type,
                expires_at,
            },
            ProcessRewardCallbackResult::AlreadyProcessed { transaction_id } => {
                CallbackResponse::AlreadyProcessed {
                    transaction_id: transaction_id.to_string(),
                }
            }
        }
    }
}

/// A user's unexpired rewards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementsResponse {
    pub user_id: String,
    pub active_rewards: Vec<ActiveReward>,
}

impl From<GetUserEntitlementsResult> for EntitlementsResponse {
    fn from(result: GetUserEntitlementsResult) -> Self {
        Self {
            user_id: result.user_id.to_string(),
            active_rewards: result.active_rewards,
        }
    }
}

/// Standard error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{TransactionId, UserId};

    #[test]
    fn granted_response_is_tagged_camel_case() {
        let response = CallbackResponse::from(ProcessRewardCallbackResult::Granted {
            user_id: UserId::new("U1").unwrap(),
            reward_type: RewardType::AdFree,
            expires_at: Timestamp::now(),
        });

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["status"], "granted");
        assert_eq!(json["userId"], "U1");
        assert_eq!(json["rewardType"], "adFree");
        assert!(json.get("expiresAt").is_some());
    }

    #[test]
    fn duplicate_response_names_transaction() {
        let response = CallbackResponse::from(ProcessRewardCallbackResult::AlreadyProcessed {
            transaction_id: TransactionId::new("T1").unwrap(),
        });

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["status"], "alreadyProcessed");
        assert_eq!(json["transactionId"], "T1");
    }
}
