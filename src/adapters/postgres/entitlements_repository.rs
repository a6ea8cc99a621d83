//! PostgreSQL implementation of EntitlementsRepository.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::rewards::{RewardType, UserEntitlements};
use crate::ports::EntitlementsRepository;

const PRIMARY_KEY_CONSTRAINT: &str = "user_entitlements_pkey";

/// PostgreSQL implementation of the EntitlementsRepository port.
///
/// `update` is a compare-and-swap on `version`.
pub struct PostgresEntitlementsRepository {
    pool: PgPool,
}

impl PostgresEntitlementsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a user's entitlements.
#[derive(Debug, sqlx::FromRow)]
struct EntitlementsRow {
    user_id: String,
    active_rewards: Json<BTreeMap<RewardType, Timestamp>>,
    version: i64,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EntitlementsRow> for UserEntitlements {
    type Error = DomainError;

    fn try_from(row: EntitlementsRow) -> Result<Self, Self::Error> {
        let id = UserId::new(row.user_id).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
        })?;
        let version = u64::try_from(row.version).map_err(|_| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid version: {}", row.version),
            )
        })?;

        Ok(UserEntitlements {
            id,
            active_rewards: row.active_rewards.0,
            version,
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn version_param(version: u64) -> Result<i64, DomainError> {
    i64::try_from(version).map_err(|_| {
        DomainError::new(
            ErrorCode::ValidationFailed,
            format!("Version out of range: {}", version),
        )
    })
}

#[async_trait]
impl EntitlementsRepository for PostgresEntitlementsRepository {
    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserEntitlements>, DomainError> {
        let row: Option<EntitlementsRow> = sqlx::query_as(
            r#"
            SELECT user_id, active_rewards, version, updated_at
            FROM user_entitlements
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to load entitlements: {}", e)))?;

        row.map(UserEntitlements::try_from).transpose()
    }

    async fn create(&self, entitlements: &UserEntitlements) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO user_entitlements (user_id, active_rewards, version, updated_at)
            VALUES ($1, $2, 1, $3)
            "#,
        )
        .bind(entitlements.id.as_str())
        .bind(Json(&entitlements.active_rewards))
        .bind(entitlements.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some(PRIMARY_KEY_CONSTRAINT) {
                    return DomainError::new(
                        ErrorCode::AlreadyExists,
                        "Entitlements already exist for user",
                    )
                    .with_detail("user_id", entitlements.id.as_str());
                }
            }
            DomainError::database(format!("Failed to create entitlements: {}", e))
        })?;

        Ok(())
    }

    async fn update(&self, entitlements: &UserEntitlements) -> Result<(), DomainError> {
        let expected_version = version_param(entitlements.version)?;

        let result = sqlx::query(
            r#"
            UPDATE user_entitlements SET
                active_rewards = $2,
                updated_at = $3,
                version = version + 1
            WHERE user_id = $1 AND version = $4
            "#,
        )
        .bind(entitlements.id.as_str())
        .bind(Json(&entitlements.active_rewards))
        .bind(entitlements.updated_at.as_datetime())
        .bind(expected_version)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update entitlements: {}", e)))?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        // Distinguish a missing row from a lost race.
        let current: Option<i64> =
            sqlx::query_scalar("SELECT version FROM user_entitlements WHERE user_id = $1")
                .bind(entitlements.id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::database(format!("Failed to check entitlements version: {}", e))
                })?;

        match current {
            None => Err(DomainError::new(
                ErrorCode::EntitlementsNotFound,
                "Entitlements not found",
            )
            .with_detail("user_id", entitlements.id.as_str())),
            Some(found) => Err(DomainError::new(
                ErrorCode::ConcurrencyConflict,
                "Entitlements were modified concurrently",
            )
            .with_detail("expected_version", expected_version.to_string())
            .with_detail("found_version", found.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(user_id: &str, version: i64) -> EntitlementsRow {
        let mut rewards = BTreeMap::new();
        rewards.insert(RewardType::AdFree, Timestamp::now().plus_days(7));
        EntitlementsRow {
            user_id: user_id.to_string(),
            active_rewards: Json(rewards),
            version,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn converts_row_to_aggregate() {
        let ent = UserEntitlements::try_from(row("U1", 3)).unwrap();

        assert_eq!(ent.id.as_str(), "U1");
        assert_eq!(ent.version, 3);
        assert!(ent.expiry_for(RewardType::AdFree).is_some());
    }

    #[test]
    fn rejects_blank_user_id() {
        let err = UserEntitlements::try_from(row("  ", 1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn rejects_negative_version() {
        let err = UserEntitlements::try_from(row("U1", -1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn active_rewards_column_uses_reward_names() {
        let mut rewards = BTreeMap::new();
        rewards.insert(RewardType::OfflineReading, Timestamp::now());

        let json = serde_json::to_value(&rewards).unwrap();

        assert!(json.get("offlineReading").is_some());
    }

    #[test]
    fn version_param_rejects_overflow() {
        assert!(version_param(u64::MAX).is_err());
        assert_eq!(version_param(5).unwrap(), 5);
    }
}
