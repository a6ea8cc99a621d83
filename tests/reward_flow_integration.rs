//! Integration tests for the reward callback flow.
//!
//! Drives a signed AdMob callback through verification, idempotency and
//! granting:
//! 1. Callback is signed with a real P-256 key published by a test key source
//! 2. The handler verifies it and grants the configured duration
//! 3. A replay of the same transaction changes nothing
//!
//! Uses in-memory adapters so no database or network is needed.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, Uri};
use axum::Router;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use p256::pkcs8::{EncodePublicKey, LineEnding};
use proptest::prelude::*;
use tower::ServiceExt;

use reward_gate::adapters::ad_networks::{AdMobVerifier, PublicKeyCache, DEFAULT_KEY_CACHE_TTL};
use reward_gate::adapters::http::{rewards_router, RewardsAppState};
use reward_gate::adapters::memory::{
    InMemoryEntitlementsRepository, InMemoryIdempotencyGuard, StaticRewardConfigReader,
};
use reward_gate::application::{
    ProcessRewardCallbackCommand, ProcessRewardCallbackHandler, ProcessRewardCallbackResult,
};
use reward_gate::domain::foundation::{DomainError, Timestamp, UserId};
use reward_gate::domain::rewards::{
    AdPlatform, RewardConfig, RewardError, RewardSettings, RewardType,
};
use reward_gate::ports::{EntitlementsRepository, PublicKeyEntry, PublicKeySource};

// =============================================================================
// Test Infrastructure
// =============================================================================

const KEY_ID: &str = "3335741209";

fn signing_key() -> SigningKey {
    SigningKey::from_slice(&[0x2a; 32]).unwrap()
}

/// Serves a single published key.
struct TestKeySource {
    pem: String,
}

impl TestKeySource {
    fn new() -> Self {
        Self {
            pem: signing_key()
                .verifying_key()
                .to_public_key_pem(LineEnding::LF)
                .unwrap(),
        }
    }
}

#[async_trait]
impl PublicKeySource for TestKeySource {
    async fn fetch_key_set(&self) -> Result<Vec<PublicKeyEntry>, DomainError> {
        Ok(vec![PublicKeyEntry {
            key_id: KEY_ID.to_string(),
            pem: self.pem.clone(),
        }])
    }
}

struct Service {
    handler: Arc<ProcessRewardCallbackHandler>,
    repository: Arc<InMemoryEntitlementsRepository>,
}

fn service() -> Service {
    let repository = Arc::new(InMemoryEntitlementsRepository::new());
    let key_cache = PublicKeyCache::new(Arc::new(TestKeySource::new()), DEFAULT_KEY_CACHE_TTL);
    let config = RewardConfig::new().with_reward(RewardType::AdFree, RewardSettings::enabled(7));

    let handler = ProcessRewardCallbackHandler::new(
        vec![Arc::new(AdMobVerifier::new(Arc::new(key_cache)))],
        repository.clone(),
        Arc::new(StaticRewardConfigReader::new().with_config("rewards-prod", config)),
        Arc::new(InMemoryIdempotencyGuard::new()),
        "rewards-prod",
    );

    Service {
        handler: Arc::new(handler),
        repository,
    }
}

fn router(service: &Service) -> Router {
    rewards_router().with_state(RewardsAppState::new(
        service.handler.clone(),
        service.repository.clone(),
    ))
}

/// Query string AdMob would sign, in the order AdMob sends it.
fn signed_content(transaction_id: &str) -> String {
    format!(
        "ad_network=5450213213286189855&ad_unit=1234567890&custom_data=adFree\
         &reward_amount=1&reward_item=Reward&timestamp=1507770365237823\
         &transaction_id={}&user_id=U1",
        transaction_id
    )
}

fn sign(content: &str) -> String {
    let signature: Signature = signing_key().sign(content.as_bytes());
    URL_SAFE_NO_PAD.encode(signature.to_der().as_bytes())
}

fn callback_uri(content: &str, signature: &str) -> Uri {
    format!(
        "/api/rewards/callbacks/admob?{}&signature={}&key_id={}",
        content, signature, KEY_ID
    )
    .parse()
    .unwrap()
}

fn command(uri: Uri) -> ProcessRewardCallbackCommand {
    ProcessRewardCallbackCommand {
        platform: AdPlatform::AdMob,
        uri,
    }
}

// =============================================================================
// End-to-end flow
// =============================================================================

#[tokio::test]
async fn admob_callback_grants_seven_days_once() {
    let service = service();
    let content = signed_content("T1");
    let uri = callback_uri(&content, &sign(&content));
    let user = UserId::new("U1").unwrap();

    let before = Timestamp::now();
    let first = service.handler.handle(command(uri.clone())).await.unwrap();
    let after = Timestamp::now();

    let ProcessRewardCallbackResult::Granted {
        user_id,
        reward_type,
        expires_at,
    } = first
    else {
        panic!("expected a grant");
    };
    assert_eq!(user_id, user);
    assert_eq!(reward_type, RewardType::AdFree);
    assert!(!expires_at.is_before(&before.plus_days(7)));
    assert!(!expires_at.is_after(&after.plus_days(7)));

    let granted = service.repository.find_by_user(&user).await.unwrap().unwrap();
    assert_eq!(granted.expiry_for(RewardType::AdFree), Some(expires_at));

    let replay = service.handler.handle(command(uri)).await.unwrap();
    assert!(matches!(
        replay,
        ProcessRewardCallbackResult::AlreadyProcessed { .. }
    ));

    let after_replay = service.repository.find_by_user(&user).await.unwrap().unwrap();
    assert_eq!(after_replay, granted);
}

#[tokio::test]
async fn second_transaction_stacks_on_active_grant() {
    let service = service();
    let user = UserId::new("U1").unwrap();

    let first = signed_content("T1");
    service
        .handler
        .handle(command(callback_uri(&first, &sign(&first))))
        .await
        .unwrap();
    let first_expiry = service
        .repository
        .find_by_user(&user)
        .await
        .unwrap()
        .unwrap()
        .expiry_for(RewardType::AdFree)
        .unwrap();

    let second = signed_content("T2");
    let result = service
        .handler
        .handle(command(callback_uri(&second, &sign(&second))))
        .await
        .unwrap();

    assert_eq!(
        result,
        ProcessRewardCallbackResult::Granted {
            user_id: user,
            reward_type: RewardType::AdFree,
            expires_at: first_expiry.plus_days(7),
        }
    );
}

#[tokio::test]
async fn forged_callback_is_rejected_without_side_effects() {
    let service = service();
    let content = signed_content("T1");
    let signature = sign(&content);
    let forged = content.replace("user_id=U1", "user_id=U2");

    let result = service
        .handler
        .handle(command(callback_uri(&forged, &signature)))
        .await;

    assert!(matches!(result, Err(RewardError::InvalidInput(_))));
    assert!(service.repository.is_empty().await);
}

#[tokio::test]
async fn http_callback_then_entitlement_query() {
    let service = service();
    let app = router(&service);
    let content = signed_content("T1");
    let uri = callback_uri(&content, &sign(&content));

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri.clone()).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/users/U1/entitlements")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["activeRewards"].as_array().unwrap().len(), 1);
    assert_eq!(json["activeRewards"][0]["rewardType"], "adFree");
}

// =============================================================================
// Signature sensitivity
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn any_single_byte_change_invalidates_admob_signature(
        position in 0usize..512,
        replacement in "[a-zA-Z0-9]",
    ) {
        let content = signed_content("T1");
        let signature = sign(&content);

        let index = position % content.len();
        let new_char = replacement.chars().next().unwrap();
        prop_assume!(content.as_bytes()[index] as char != new_char);

        let mut mutated = content.clone();
        mutated.replace_range(index..index + 1, &new_char.to_string());

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let result = runtime.block_on(service().handler.handle(command(callback_uri(&mutated, &signature))));

        prop_assert!(
            matches!(result, Err(RewardError::InvalidInput(_))),
            "mutation at {} accepted: {:?}",
            index,
            result
        );
    }
}
