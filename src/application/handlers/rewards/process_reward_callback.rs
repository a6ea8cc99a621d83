//! ProcessRewardCallbackHandler - Verifies an ad network callback and grants
//! the reward it carries.
//!
//! Pipeline:
//! 1. Pick the verifier registered for the platform
//! 2. Verify the callback into a `VerifiedRewardPayload`
//! 3. Claim the platform-scoped transaction id (duplicates stop here)
//! 4. Extend or restart the user's entitlement and persist it
//!
//! Steps 3 and 4 run on a spawned task. Once claimed, a grant either persists
//! or releases its claim, even when the caller's request is dropped by a
//! timeout or a disconnect.

use std::collections::HashMap;
use std::sync::Arc;

use http::Uri;

use crate::domain::foundation::{Timestamp, TransactionId, UserId};
use crate::domain::rewards::{
    AdPlatform, RewardError, RewardType, UserEntitlements, VerifiedRewardPayload,
};
use crate::ports::{
    ClaimOutcome, EntitlementsRepository, IdempotencyGuard, RewardConfigReader,
    SignatureVerifier,
};

/// Attempts at the read-modify-write before a version conflict is surfaced.
const MAX_GRANT_ATTEMPTS: u32 = 3;

/// Command to process one inbound callback.
#[derive(Debug, Clone)]
pub struct ProcessRewardCallbackCommand {
    pub platform: AdPlatform,
    /// Full request URI, query string untouched.
    pub uri: Uri,
}

/// Result of processing a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessRewardCallbackResult {
    /// Reward granted; the user now holds it until `expires_at`.
    Granted {
        user_id: UserId,
        reward_type: RewardType,
        expires_at: Timestamp,
    },
    /// The transaction was processed before; nothing changed.
    AlreadyProcessed { transaction_id: TransactionId },
}

/// Handler for ad network reward callbacks.
pub struct ProcessRewardCallbackHandler {
    verifiers: HashMap<AdPlatform, Arc<dyn SignatureVerifier>>,
    granter: Arc<RewardGranter>,
}

/// Claim-then-grant state shared with the spawned grant task.
struct RewardGranter {
    repository: Arc<dyn EntitlementsRepository>,
    config_reader: Arc<dyn RewardConfigReader>,
    idempotency: Arc<dyn IdempotencyGuard>,
    reward_config_id: String,
}

enum GrantOutcome {
    Granted(Timestamp),
    Duplicate,
}

impl ProcessRewardCallbackHandler {
    /// Creates the handler. Each verifier is registered under its own
    /// `platform()`; platforms without a verifier are rejected as unconfigured.
    pub fn new(
        verifiers: Vec<Arc<dyn SignatureVerifier>>,
        repository: Arc<dyn EntitlementsRepository>,
        config_reader: Arc<dyn RewardConfigReader>,
        idempotency: Arc<dyn IdempotencyGuard>,
        reward_config_id: impl Into<String>,
    ) -> Self {
        let verifiers = verifiers
            .into_iter()
            .map(|verifier| (verifier.platform(), verifier))
            .collect();

        Self {
            verifiers,
            granter: Arc::new(RewardGranter {
                repository,
                config_reader,
                idempotency,
                reward_config_id: reward_config_id.into(),
            }),
        }
    }

    /// Platforms with a registered verifier.
    pub fn configured_platforms(&self) -> Vec<AdPlatform> {
        let mut platforms: Vec<_> = self.verifiers.keys().copied().collect();
        platforms.sort_by_key(|p| p.as_str());
        platforms
    }

    pub async fn handle(
        &self,
        cmd: ProcessRewardCallbackCommand,
    ) -> Result<ProcessRewardCallbackResult, RewardError> {
        let platform = cmd.platform;

        // 1. Resolve verifier
        let verifier = self.verifiers.get(&platform).ok_or_else(|| {
            RewardError::server(format!("{} verifier is not configured", platform))
        })?;

        // 2. Verify
        let payload = verifier.verify(&cmd.uri).await?;
        let idempotency_id = format!("{}:{}", platform, payload.transaction_id());

        // 3. Idempotency fast path
        if self
            .granter
            .idempotency
            .is_event_processed(&idempotency_id)
            .await?
        {
            return Ok(self.already_processed(platform, &payload));
        }

        // 4. Claim and grant, detached from this future
        let granter = Arc::clone(&self.granter);
        let task_id = idempotency_id.clone();
        let task_payload = payload.clone();
        let task = tokio::spawn(async move {
            granter
                .claim_and_grant(&task_id, &task_payload)
                .await
        });

        match task.await {
            Ok(Ok(GrantOutcome::Granted(expires_at))) => {
                tracing::info!(
                    platform = %platform,
                    transaction_id = %payload.transaction_id(),
                    user_id = %payload.user_id(),
                    reward_type = %payload.reward_type(),
                    new_expiry = %expires_at.as_datetime(),
                    "Reward granted"
                );
                Ok(ProcessRewardCallbackResult::Granted {
                    user_id: payload.user_id().clone(),
                    reward_type: payload.reward_type(),
                    expires_at,
                })
            }
            Ok(Ok(GrantOutcome::Duplicate)) => Ok(self.already_processed(platform, &payload)),
            Ok(Err(err)) => {
                tracing::warn!(
                    platform = %platform,
                    transaction_id = %payload.transaction_id(),
                    error = %err,
                    "Reward grant failed, claim released"
                );
                Err(err)
            }
            Err(join_err) => {
                tracing::error!(
                    platform = %platform,
                    transaction_id = %payload.transaction_id(),
                    error = %join_err,
                    "Reward grant task aborted, releasing claim"
                );
                self.granter.release_claim(&idempotency_id).await;
                Err(RewardError::server("Reward grant aborted"))
            }
        }
    }

    fn already_processed(
        &self,
        platform: AdPlatform,
        payload: &VerifiedRewardPayload,
    ) -> ProcessRewardCallbackResult {
        tracing::info!(
            platform = %platform,
            transaction_id = %payload.transaction_id(),
            "Duplicate reward callback ignored"
        );
        ProcessRewardCallbackResult::AlreadyProcessed {
            transaction_id: payload.transaction_id().clone(),
        }
    }
}

impl RewardGranter {
    /// Claims `idempotency_id`, then grants. A failed grant releases the claim.
    async fn claim_and_grant(
        &self,
        idempotency_id: &str,
        payload: &VerifiedRewardPayload,
    ) -> Result<GrantOutcome, RewardError> {
        if self.idempotency.try_claim(idempotency_id).await? == ClaimOutcome::AlreadyProcessed {
            return Ok(GrantOutcome::Duplicate);
        }

        match self.grant_reward(payload).await {
            Ok(expires_at) => Ok(GrantOutcome::Granted(expires_at)),
            Err(err) => {
                self.release_claim(idempotency_id).await;
                Err(err)
            }
        }
    }

    async fn release_claim(&self, idempotency_id: &str) {
        if let Err(release_err) = self.idempotency.release(idempotency_id).await {
            tracing::error!(
                idempotency_id = %idempotency_id,
                error = %release_err,
                "Failed to release idempotency claim"
            );
        }
    }

    /// Applies the grant and returns the new expiry.
    async fn grant_reward(&self, payload: &VerifiedRewardPayload) -> Result<Timestamp, RewardError> {
        let config = self
            .config_reader
            .load(&self.reward_config_id)
            .await?
            .ok_or_else(|| {
                RewardError::server(format!(
                    "Reward configuration '{}' not found",
                    self.reward_config_id
                ))
            })?;
        let duration_days = config.grant_duration_days(payload.reward_type())?;

        let mut attempt = 1;
        loop {
            let mut entitlements = self
                .repository
                .find_by_user(payload.user_id())
                .await?
                .unwrap_or_else(|| UserEntitlements::new(payload.user_id().clone()));

            let new_expiry =
                entitlements.grant(payload.reward_type(), duration_days, Timestamp::now())?;

            let saved = if entitlements.is_persisted() {
                self.repository.update(&entitlements).await
            } else {
                self.repository.create(&entitlements).await
            };

            match saved {
                Ok(()) => return Ok(new_expiry),
                Err(e) if e.is_conflict() && attempt < MAX_GRANT_ATTEMPTS => {
                    tracing::debug!(
                        user_id = %payload.user_id(),
                        attempt,
                        "Entitlements changed concurrently, retrying"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
