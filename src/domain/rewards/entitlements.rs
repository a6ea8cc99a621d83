//! UserEntitlements aggregate - time-bounded rewards held by a user.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::errors::RewardError;
use super::reward_type::RewardType;
use crate::domain::foundation::{Timestamp, UserId};

/// Rewards a user currently holds, keyed by reward type with their expiry.
///
/// Created lazily on the first grant and never deleted; a reward lapses once
/// its expiry has passed. For a given reward type the expiry never moves
/// backward.
///
/// `version` is the persisted revision used for optimistic concurrency.
/// A freshly constructed aggregate has version 0 and has never been stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntitlements {
    pub id: UserId,
    pub active_rewards: BTreeMap<RewardType, Timestamp>,
    pub version: u64,
    pub updated_at: Timestamp,
}

impl UserEntitlements {
    /// Creates an empty, unsaved entitlement record for a user.
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            active_rewards: BTreeMap::new(),
            version: 0,
            updated_at: Timestamp::now(),
        }
    }

    /// Whether this record has been stored before.
    pub fn is_persisted(&self) -> bool {
        self.version > 0
    }

    /// Current expiry for a reward type, expired or not.
    pub fn expiry_for(&self, reward: RewardType) -> Option<Timestamp> {
        self.active_rewards.get(&reward).copied()
    }

    /// Whether the reward is held at `now`.
    pub fn is_active(&self, reward: RewardType, now: Timestamp) -> bool {
        self.expiry_for(reward)
            .map(|expiry| expiry.is_after(&now))
            .unwrap_or(false)
    }

    /// Rewards still held at `now`, with their expiries.
    pub fn active_rewards_at(&self, now: Timestamp) -> Vec<(RewardType, Timestamp)> {
        self.active_rewards
            .iter()
            .filter(|(_, expiry)| expiry.is_after(&now))
            .map(|(reward, expiry)| (*reward, *expiry))
            .collect()
    }

    /// Grants `duration_days` of a reward and returns the new expiry.
    ///
    /// An active grant is extended from its current expiry; an absent or
    /// lapsed grant restarts from `now`. Fails with `ServerException`, leaving
    /// the record unchanged, if the new expiry is out of range.
    pub fn grant(
        &mut self,
        reward: RewardType,
        duration_days: i64,
        now: Timestamp,
    ) -> Result<Timestamp, RewardError> {
        let current = self.expiry_for(reward);
        let effective_start = match current {
            Some(expiry) if !expiry.is_before(&now) => expiry,
            _ => now,
        };

        let mut new_expiry = effective_start
            .checked_plus_days(duration_days)
            .ok_or_else(|| {
                RewardError::server(format!(
                    "Granting {} days of {} overflows the expiry",
                    duration_days, reward
                ))
            })?;
        if let Some(expiry) = current {
            new_expiry = new_expiry.max(expiry);
        }

        self.active_rewards.insert(reward, new_expiry);
        self.updated_at = now;
        Ok(new_expiry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn now() -> Timestamp {
        Timestamp::from_datetime(
            DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        )
    }

    fn entitlements() -> UserEntitlements {
        UserEntitlements::new(UserId::new("user-1").unwrap())
    }

    #[test]
    fn new_record_is_unsaved_and_empty() {
        let e = entitlements();
        assert!(!e.is_persisted());
        assert!(e.active_rewards.is_empty());
    }

    #[test]
    fn first_grant_starts_from_now() {
        let mut e = entitlements();

        let expiry = e.grant(RewardType::AdFree, 7, now()).unwrap();

        assert_eq!(expiry, now().plus_days(7));
        assert_eq!(e.expiry_for(RewardType::AdFree), Some(now().plus_days(7)));
    }

    #[test]
    fn active_grant_extends_from_current_expiry() {
        let mut e = entitlements();
        e.active_rewards.insert(RewardType::AdFree, now().plus_days(3));

        let expiry = e.grant(RewardType::AdFree, 7, now()).unwrap();

        assert_eq!(expiry, now().plus_days(10));
    }

    #[test]
    fn lapsed_grant_restarts_from_now() {
        let mut e = entitlements();
        e.active_rewards.insert(RewardType::AdFree, now().minus_days(2));

        let expiry = e.grant(RewardType::AdFree, 7, now()).unwrap();

        assert_eq!(expiry, now().plus_days(7));
    }

    #[test]
    fn grant_expiring_exactly_now_extends_from_now() {
        let mut e = entitlements();
        e.active_rewards.insert(RewardType::AdFree, now());

        assert_eq!(e.grant(RewardType::AdFree, 1, now()), Ok(now().plus_days(1)));
    }

    #[test]
    fn expiry_never_moves_backward() {
        let mut e = entitlements();
        e.active_rewards.insert(RewardType::AdFree, now().plus_days(30));

        let expiry = e.grant(RewardType::AdFree, 0, now()).unwrap();

        assert_eq!(expiry, now().plus_days(30));
    }

    #[test]
    fn out_of_range_expiry_is_a_server_error_and_changes_nothing() {
        let mut e = entitlements();
        let far = Timestamp::from_datetime(DateTime::<Utc>::MAX_UTC);
        e.active_rewards.insert(RewardType::AdFree, far);
        let before = e.clone();

        let result = e.grant(RewardType::AdFree, 1, now());

        assert!(matches!(result, Err(RewardError::ServerException(_))));
        assert_eq!(e, before);
    }

    #[test]
    fn grants_for_different_rewards_are_independent() {
        let mut e = entitlements();
        e.grant(RewardType::AdFree, 7, now()).unwrap();
        e.grant(RewardType::PremiumContent, 1, now()).unwrap();

        assert_eq!(e.expiry_for(RewardType::AdFree), Some(now().plus_days(7)));
        assert_eq!(
            e.expiry_for(RewardType::PremiumContent),
            Some(now().plus_days(1))
        );
        assert_eq!(e.expiry_for(RewardType::OfflineReading), None);
    }

    #[test]
    fn is_active_respects_expiry() {
        let mut e = entitlements();
        e.active_rewards.insert(RewardType::AdFree, now().plus_days(1));
        e.active_rewards.insert(RewardType::PremiumContent, now().minus_days(1));

        assert!(e.is_active(RewardType::AdFree, now()));
        assert!(!e.is_active(RewardType::PremiumContent, now()));
        assert!(!e.is_active(RewardType::OfflineReading, now()));
    }

    #[test]
    fn active_rewards_at_filters_lapsed() {
        let mut e = entitlements();
        e.active_rewards.insert(RewardType::AdFree, now().plus_days(1));
        e.active_rewards.insert(RewardType::PremiumContent, now().minus_days(1));

        assert_eq!(
            e.active_rewards_at(now()),
            vec![(RewardType::AdFree, now().plus_days(1))]
        );
    }
}
