use std::time::Duration;

use bytes::Bytes;
use deadpool_redis::redis::cmd;
use moka::future::Cache;

use super::value::CacheError;
use crate::{
    config::{MemoryConfig, ttl_secs},
    memory::{self, MemoryEntry},
};

/// Page size requested from Redis on every `SCAN` round trip.
pub const SCAN_COUNT: usize = 100;

const INCR_WITH_EXPIRY_SCRIPT: &str = r"
local count = redis.call('INCR', KEYS[1])
if redis.call('TTL', KEYS[1]) < 0 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return count
";

/// The key-value store behind every cached read and the login counters.
///
/// Handlers receive it as `Arc<CacheBackend>`. Every operation is safe to
/// call concurrently.
#[derive(Clone)]
pub enum CacheBackend {
    /// Redis backend using a deadpool connection pool
    Redis(deadpool_redis::Pool),

    /// In-process backend with per-entry expiry
    Memory {
        cache: Cache<String, MemoryEntry>,
        config: MemoryConfig,
    },

    /// Pass-through: reads miss, writes are dropped, counters error
    Disabled,
}

impl From<deadpool_redis::Pool> for CacheBackend {
    fn from(pool: deadpool_redis::Pool) -> Self { CacheBackend::Redis(pool) }
}

impl std::fmt::Debug for CacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind())
    }
}

impl CacheBackend {
    pub fn memory(config: MemoryConfig) -> Self {
        CacheBackend::Memory {
            cache: memory::build_cache(&config),
            config,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CacheBackend::Redis(_) => "redis",
            CacheBackend::Memory { .. } => "memory",
            CacheBackend::Disabled => "disabled",
        }
    }

    pub fn is_redis(&self) -> bool { matches!(self, CacheBackend::Redis(_)) }

    pub fn is_disabled(&self) -> bool {
        matches!(self, CacheBackend::Disabled)
    }

    pub async fn ping(&self) -> Result<(), CacheError> {
        match self {
            CacheBackend::Redis(pool) => {
                let mut conn = pool.get().await?;
                cmd("PING").query_async::<String>(&mut conn).await?;
                Ok(())
            }
            CacheBackend::Memory { .. } => Ok(()),
            CacheBackend::Disabled => Err(CacheError::Disabled),
        }
    }

    pub async fn get_bytes(
        &self, key: &str,
    ) -> Result<Option<Bytes>, CacheError> {
        match self {
            CacheBackend::Redis(pool) => {
                let mut conn = pool.get().await?;
                let value = cmd("GET")
                    .arg(key)
                    .query_async::<Option<Vec<u8>>>(&mut conn)
                    .await?;
                Ok(value.map(Bytes::from))
            }
            CacheBackend::Memory { cache, .. } => {
                Ok(cache.get(key).await.map(|entry| entry.bytes))
            }
            CacheBackend::Disabled => Ok(None),
        }
    }

    /// Stores `value` under `key`, replacing any previous entry whole.
    pub async fn set_bytes(
        &self, key: &str, value: Bytes, ttl: Duration,
    ) -> Result<(), CacheError> {
        match self {
            CacheBackend::Redis(pool) => {
                let mut conn = pool.get().await?;
                cmd("SET")
                    .arg(key)
                    .arg(value.as_ref())
                    .arg("EX")
                    .arg(ttl_secs(ttl))
                    .query_async::<()>(&mut conn)
                    .await?;
                Ok(())
            }
            CacheBackend::Memory { cache, .. } => {
                cache
                    .insert(key.to_owned(), MemoryEntry::expiring(value, ttl))
                    .await;
                Ok(())
            }
            CacheBackend::Disabled => Ok(()),
        }
    }

    /// Deletes `keys` and returns how many existed.
    pub async fn delete(&self, keys: &[String]) -> Result<u64, CacheError> {
        if keys.is_empty() {
            return Ok(0);
        }

        match self {
            CacheBackend::Redis(pool) => {
                let mut conn = pool.get().await?;
                let removed =
                    cmd("DEL").arg(keys).query_async::<u64>(&mut conn).await?;
                Ok(removed)
            }
            CacheBackend::Memory { cache, .. } => {
                let mut removed = 0;
                for key in keys {
                    if cache.remove(key).await.is_some() {
                        removed += 1;
                    }
                }
                Ok(removed)
            }
            CacheBackend::Disabled => Ok(0),
        }
    }

    /// One `SCAN cursor MATCH pattern COUNT count` step. The memory backend
    /// answers in a single step and always returns cursor 0.
    pub async fn scan(
        &self, cursor: u64, pattern: &str, count: usize,
    ) -> Result<(u64, Vec<String>), CacheError> {
        match self {
            CacheBackend::Redis(pool) => {
                let mut conn = pool.get().await?;
                let page = cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(pattern)
                    .arg("COUNT")
                    .arg(count)
                    .query_async::<(u64, Vec<String>)>(&mut conn)
                    .await?;
                Ok(page)
            }
            CacheBackend::Memory { cache, .. } => {
                let keys = cache
                    .iter()
                    .filter(|(key, _)| memory::glob_match(pattern, key))
                    .map(|(key, _)| key.as_ref().clone())
                    .collect();
                Ok((0, keys))
            }
            CacheBackend::Disabled => Ok((0, Vec::new())),
        }
    }

    /// Walks the keyspace until the cursor returns to 0, then removes every
    /// match with a single `DEL`. Not atomic with concurrent writers.
    pub async fn delete_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        let mut cursor = 0;
        let mut matched = Vec::new();
        loop {
            let (next, keys) = self.scan(cursor, pattern, SCAN_COUNT).await?;
            matched.extend(keys);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        matched.sort_unstable();
        matched.dedup();
        self.delete(&matched).await
    }

    /// `INCR` and the window expiry in one server-side script. The expiry is
    /// set whenever the counter has none, so a counter can never outlive its
    /// window.
    pub async fn incr_with_expiry(
        &self, key: &str, ttl: Duration,
    ) -> Result<i64, CacheError> {
        match self {
            CacheBackend::Redis(pool) => {
                let mut conn = pool.get().await?;
                let count = cmd("EVAL")
                    .arg(INCR_WITH_EXPIRY_SCRIPT)
                    .arg(1)
                    .arg(key)
                    .arg(ttl_secs(ttl))
                    .query_async::<i64>(&mut conn)
                    .await?;
                Ok(count)
            }
            CacheBackend::Memory { cache, .. } => {
                memory::increment(cache, key, ttl).await
            }
            CacheBackend::Disabled => Err(CacheError::Disabled),
        }
    }

    /// Current counter value; an absent key reads as 0.
    pub async fn get_counter(&self, key: &str) -> Result<i64, CacheError> {
        match self {
            CacheBackend::Redis(pool) => {
                let mut conn = pool.get().await?;
                let count = cmd("GET")
                    .arg(key)
                    .query_async::<Option<i64>>(&mut conn)
                    .await?;
                Ok(count.unwrap_or(0))
            }
            CacheBackend::Memory { cache, .. } => {
                match cache.get(key).await {
                    Some(entry) => memory::parse_counter(&entry.bytes),
                    None => Ok(0),
                }
            }
            CacheBackend::Disabled => Err(CacheError::Disabled),
        }
    }
}
