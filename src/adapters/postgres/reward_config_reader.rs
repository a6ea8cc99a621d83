//! PostgreSQL implementation of RewardConfigReader.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::domain::foundation::DomainError;
use crate::domain::rewards::RewardConfig;
use crate::ports::RewardConfigReader;

/// Reads `RewardConfig` documents from the `reward_configs` table.
pub struct PostgresRewardConfigReader {
    pool: PgPool,
}

impl PostgresRewardConfigReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RewardConfigReader for PostgresRewardConfigReader {
    async fn load(&self, config_id: &str) -> Result<Option<RewardConfig>, DomainError> {
        let rewards: Option<Json<RewardConfig>> =
            sqlx::query_scalar("SELECT rewards FROM reward_configs WHERE id = $1")
                .bind(config_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::database(format!("Failed to load reward config: {}", e))
                        .with_detail("config_id", config_id)
                })?;

        Ok(rewards.map(|Json(config)| config))
    }
}
