//! HTTP handlers for reward endpoints.
//!
//! Ad networks call the callback endpoint with everything in the query
//! string. The handler passes the original URI through untouched because
//! AdMob signs the raw query bytes.

use std::sync::Arc;

use axum::extract::{Json, OriginalUri, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::rewards::{
    GetUserEntitlementsHandler, GetUserEntitlementsQuery, ProcessRewardCallbackCommand,
    ProcessRewardCallbackHandler,
};
use crate::domain::foundation::UserId;
use crate::domain::rewards::{AdPlatform, RewardError};
use crate::ports::EntitlementsRepository;

use super::dto::{CallbackResponse, EntitlementsResponse, ErrorResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for reward routes.
#[derive(Clone)]
pub struct RewardsAppState {
    pub callback_handler: Arc<ProcessRewardCallbackHandler>,
    pub entitlements_repository: Arc<dyn EntitlementsRepository>,
}

impl RewardsAppState {
    pub fn new(
        callback_handler: Arc<ProcessRewardCallbackHandler>,
        entitlements_repository: Arc<dyn EntitlementsRepository>,
    ) -> Self {
        Self {
            callback_handler,
            entitlements_repository,
        }
    }

    pub fn entitlements_handler(&self) -> GetUserEntitlementsHandler {
        GetUserEntitlementsHandler::new(self.entitlements_repository.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/rewards/callbacks/:platform
pub async fn handle_reward_callback(
    State(state): State<RewardsAppState>,
    Path(platform): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> Result<impl IntoResponse, RewardApiError> {
    let platform: AdPlatform = platform
        .parse()
        .map_err(|_| RewardError::bad_request(format!("Unknown ad platform: {}", platform)))?;

    let result = state
        .callback_handler
        .handle(ProcessRewardCallbackCommand { platform, uri })
        .await?;

    Ok((StatusCode::OK, Json(CallbackResponse::from(result))))
}

/// GET /api/users/:user_id/entitlements
pub async fn get_user_entitlements(
    State(state): State<RewardsAppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, RewardApiError> {
    let user_id = UserId::new(user_id).map_err(RewardError::from)?;

    let result = state
        .entitlements_handler()
        .handle(GetUserEntitlementsQuery { user_id })
        .await?;

    Ok(Json(EntitlementsResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts reward errors to HTTP responses.
#[derive(Debug)]
pub struct RewardApiError(RewardError);

impl From<RewardError> for RewardApiError {
    fn from(err: RewardError) -> Self {
        Self(err)
    }
}

impl IntoResponse for RewardApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();

        // Infrastructure detail stays in the logs.
        let message = if self.0.is_retryable() {
            tracing::error!(error = %self.0, "Reward request failed");
            "Temporary failure, retry later".to_string()
        } else {
            self.0.message().to_string()
        };

        (status, Json(ErrorResponse::new(self.0.code(), message))).into_response()
    }
}
