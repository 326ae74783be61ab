use std::sync::Arc;

use redis_connection::{
    config::{MemoryConfig, RedisDbConfig},
    connect_redis_db,
    core::CacheBackend,
};

pub fn memory_backend() -> Arc<CacheBackend> {
    Arc::new(CacheBackend::memory(MemoryConfig::default()))
}

pub fn disabled_backend() -> Arc<CacheBackend> {
    Arc::new(CacheBackend::Disabled)
}

/// A Redis backend whose pool points at a closed port, so every command
/// fails at connect time.
pub async fn unreachable_redis_backend() -> anyhow::Result<Arc<CacheBackend>> {
    let config = RedisDbConfig {
        host: "127.0.0.1".into(),
        port: 1,
        ..RedisDbConfig::default()
    };
    let pool = connect_redis_db(&config).await?;
    Ok(Arc::new(CacheBackend::Redis(pool)))
}
