//! Axum router configuration for reward endpoints.

use std::time::Duration;

use axum::http::StatusCode;
use axum::middleware::map_response;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::timeout::TimeoutLayer;

use super::dto::ErrorResponse;
use super::handlers::{get_user_entitlements, handle_reward_callback, RewardsAppState};

/// Create the rewards API router.
///
/// # Routes
///
/// ## Ad network callbacks (no auth, signature verified)
/// - `GET /api/rewards/callbacks/:platform` - `admob`, `applovin` or `ironsource`
///
/// ## Queries
/// - `GET /api/users/:user_id/entitlements` - Unexpired rewards for a user
pub fn rewards_router() -> Router<RewardsAppState> {
    Router::new()
        .route("/api/rewards/callbacks/:platform", get(handle_reward_callback))
        .route("/api/users/:user_id/entitlements", get(get_user_entitlements))
}

/// Bounds every request by `timeout`.
///
/// A timed-out callback answers 503 rather than 408 so the ad network
/// retries it. Ad networks do not retry 4xx responses.
pub fn with_request_timeout<S>(router: Router<S>, timeout: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(TimeoutLayer::new(timeout))
        .layer(map_response(timeout_as_unavailable))
}

async fn timeout_as_unavailable(response: Response) -> Response {
    if response.status() != StatusCode::REQUEST_TIMEOUT {
        return response;
    }
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse::new("TIMEOUT", "Temporary failure, retry later")),
    )
        .into_response()
}
