//! PostgreSQL adapters.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE user_entitlements (
//!     user_id         TEXT PRIMARY KEY,
//!     active_rewards  JSONB NOT NULL DEFAULT '{}',
//!     version         BIGINT NOT NULL,
//!     updated_at      TIMESTAMPTZ NOT NULL
//! );
//!
//! CREATE TABLE reward_configs (
//!     id       TEXT PRIMARY KEY,
//!     rewards  JSONB NOT NULL
//! );
//! ```
//!
//! `active_rewards` maps reward type to expiry, e.g.
//! `{"adFree": "2024-06-08T12:00:00Z"}`. `rewards` holds a `RewardConfig`
//! document, e.g. `{"adFree": {"enabled": true, "durationDays": 7}}`.

mod entitlements_repository;
mod reward_config_reader;

pub use entitlements_repository::PostgresEntitlementsRepository;
pub use reward_config_reader::PostgresRewardConfigReader;
