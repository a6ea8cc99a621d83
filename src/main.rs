//! Reward Gate server entry point.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reward_gate::adapters::ad_networks::verifiers_from_config;
use reward_gate::adapters::http::{rewards_router, with_request_timeout, RewardsAppState};
use reward_gate::adapters::postgres::{PostgresEntitlementsRepository, PostgresRewardConfigReader};
use reward_gate::adapters::redis::RedisIdempotencyGuard;
use reward_gate::application::ProcessRewardCallbackHandler;
use reward_gate::config::{AppConfig, ServerConfig};
use reward_gate::ports::EntitlementsRepository;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config.server);

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;
    tracing::info!("Connected to database");

    let redis_client = redis::Client::open(config.redis.url.as_str())?;
    let redis_conn = redis_client.get_multiplexed_tokio_connection().await?;
    tracing::info!("Connected to Redis");

    let repository: Arc<dyn EntitlementsRepository> =
        Arc::new(PostgresEntitlementsRepository::new(pool.clone()));

    let callback_handler = ProcessRewardCallbackHandler::new(
        verifiers_from_config(&config.rewards)?,
        repository.clone(),
        Arc::new(PostgresRewardConfigReader::new(pool)),
        Arc::new(RedisIdempotencyGuard::new(
            redis_conn,
            config.rewards.idempotency_ttl_secs,
        )),
        config.rewards.reward_config_id.clone(),
    );
    tracing::info!(
        platforms = ?callback_handler.configured_platforms(),
        reward_config_id = %config.rewards.reward_config_id,
        "Reward verifiers registered"
    );

    let app = rewards_router()
        .with_state(RewardsAppState::new(Arc::new(callback_handler), repository));
    let app = with_request_timeout(app, config.server.request_timeout())
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// JSON logs in production, human-readable otherwise. `RUST_LOG` overrides
/// the configured filter.
fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if server.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
