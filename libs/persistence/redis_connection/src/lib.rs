use deadpool_redis::{Config, CreatePoolError, Pool, Runtime};
pub use deadpool_redis::{PoolError, redis::RedisError};
use tracing::{info, instrument, warn};
use url::Url;

use crate::{
    config::{CacheMode, DbConnectConfig, MemoryConfig, RedisDbConfig},
    core::CacheBackend,
};

pub mod config;
pub mod core;
pub mod macros;
pub mod memory;
pub mod types;

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("invalid redis url: {0}")]
    InvalidUrl(String),
    #[error(transparent)]
    CreatePool(#[from] CreatePoolError),
}

pub fn redis_url<C>(config: &C) -> Result<Url, ConnectError>
where
    C: DbConnectConfig,
{
    let mut url = Url::parse("redis://")
        .map_err(|e| ConnectError::InvalidUrl(e.to_string()))?;

    url.set_host(Some(config.host()))
        .map_err(|e| ConnectError::InvalidUrl(e.to_string()))?;
    url.set_port(Some(config.port()))
        .map_err(|_| ConnectError::InvalidUrl("port rejected".into()))?;
    if let Some(password) = config.password() {
        url.set_password(Some(password))
            .map_err(|_| ConnectError::InvalidUrl("password rejected".into()))?;
    }
    url.path_segments_mut()
        .map_err(|_| ConnectError::InvalidUrl("url cannot be a base".into()))?
        .extend(&[config.db().to_string()]);

    Ok(url)
}

#[instrument(skip_all, name = "connect-redis")]
pub async fn connect_redis_db<C>(config: &C) -> Result<Pool, ConnectError>
where
    C: DbConnectConfig,
{
    let url = redis_url(config)?;

    info!(
        redis.host = config.host(),
        redis.port = config.port(),
        redis.db = config.db(),
        redis.connect = true
    );

    let cfg = Config {
        url: Some(url.to_string()),
        pool: Some(deadpool_redis::PoolConfig::default()),
        connection: None,
    };

    Ok(cfg.create_pool(Some(Runtime::Tokio1))?)
}

/// Builds the backend the service runs with. A Redis backend that cannot be
/// reached at startup is replaced by [`CacheBackend::Disabled`] for the
/// lifetime of the process.
#[instrument(skip_all, name = "cache-backend")]
pub async fn connect_cache_backend(
    mode: CacheMode, redis: &RedisDbConfig, memory: MemoryConfig,
) -> CacheBackend {
    match mode {
        CacheMode::Disabled => {
            info!("cache disabled by configuration");
            CacheBackend::Disabled
        }
        CacheMode::Memory => {
            info!(capacity = memory.capacity, "using in-process cache");
            CacheBackend::memory(memory)
        }
        CacheMode::Redis => {
            let pool = match connect_redis_db(redis).await {
                Ok(pool) => pool,
                Err(e) => {
                    warn!(error = %e, "redis unavailable, caching disabled");
                    return CacheBackend::Disabled;
                }
            };
            let backend = CacheBackend::Redis(pool);
            match backend.ping().await {
                Ok(()) => {
                    info!("redis cache backend ready");
                    backend
                }
                Err(e) => {
                    warn!(error = %e, "redis ping failed, caching disabled");
                    CacheBackend::Disabled
                }
            }
        }
    }
}
