//! SignatureVerifier port - Authenticates an ad network callback.
//!
//! One implementation exists per ad network. The application layer picks the
//! verifier from a map keyed by [`AdPlatform`], so adding a network means
//! adding an adapter and a map entry.

use async_trait::async_trait;
use http::Uri;

use crate::domain::rewards::{AdPlatform, RewardError, VerifiedRewardPayload};

/// Port for verifying a reward callback and normalizing its contents.
///
/// # Errors
///
/// - `InvalidInput` - missing fields, bad encoding, or signature mismatch
/// - `BadRequest` - the reward type is not recognized
/// - `OperationFailed` / `ServerException` - key fetch or configuration failure
#[async_trait]
pub trait SignatureVerifier: Send + Sync {
    /// The ad network this verifier handles.
    fn platform(&self) -> AdPlatform;

    /// Verifies the callback carried by `uri` and returns its normalized payload.
    ///
    /// `uri` must be the request URI exactly as received; reconstructing the
    /// signed content depends on the original query string bytes.
    async fn verify(&self, uri: &Uri) -> Result<VerifiedRewardPayload, RewardError>;
}
