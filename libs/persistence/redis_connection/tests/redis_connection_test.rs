use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use redis_connection::{
    cache_key,
    config::{MemoryConfig, RedisDbConfig},
    connect_redis_db,
    core::{CacheBackend, CacheError, CacheKey, CacheTypeBind},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i32,
    pub meat: String,
}

cache_key!(ItemKey::<Item> => "item:{}"[id: i32]);
cache_key!(PageKey::<Vec<Item>> => "items:page:{}:size:{}"[page: i64, size: i64]);
cache_key!(AllItemsKey::<Vec<Item>> => "items:all");

fn memory_backend() -> CacheBackend {
    CacheBackend::memory(MemoryConfig::default())
}

/// Pool pointed at a closed port: every command fails.
async fn unreachable_backend() -> CacheBackend {
    let config = RedisDbConfig {
        port: 1,
        ..RedisDbConfig::default()
    };
    CacheBackend::Redis(connect_redis_db(&config).await.unwrap())
}

fn pork() -> Item {
    Item {
        id: 1,
        meat: "Pork".into(),
    }
}

#[test]
fn test_macro_builds_keys() {
    assert_eq!(ItemKey.get_key_with_args((&7,)), "item:7");
    assert_eq!(PageKey.get_key_with_args((&2, &25)), "items:page:2:size:25");
    assert_eq!(AllItemsKey.get_key(), "items:all");
}

#[tokio::test]
async fn test_memory_set_get_remove() {
    let backend = memory_backend();
    let cache = ItemKey.bind_with(&backend, &1);

    assert_eq!(cache.try_get().await.unwrap(), None);

    cache
        .set_with_expire(&pork(), Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(cache.try_get().await.unwrap(), Some(pork()));

    assert_eq!(cache.remove().await.unwrap(), 1);
    assert_eq!(cache.try_get().await.unwrap(), None);
}

#[tokio::test]
async fn test_memory_entries_expire() {
    let backend = memory_backend();
    backend
        .set_bytes("short", Bytes::from_static(b"1"), Duration::from_millis(100))
        .await
        .unwrap();
    backend
        .set_bytes("long", Bytes::from_static(b"2"), Duration::from_secs(60))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(backend.get_bytes("short").await.unwrap(), None);
    assert_eq!(
        backend.get_bytes("long").await.unwrap(),
        Some(Bytes::from_static(b"2"))
    );
}

#[tokio::test]
async fn test_get_or_load_skips_loader_on_hit() {
    let backend = memory_backend();
    let cache = ItemKey.bind_with(&backend, &1);
    let ttl = Duration::from_secs(60);

    let mut loads = 0;
    for _ in 0..3 {
        let item: Result<Item, CacheError> = cache
            .get_or_load(ttl, || {
                loads += 1;
                async { Ok(pork()) }
            })
            .await;
        assert_eq!(item.unwrap(), pork());
    }

    assert_eq!(loads, 1);
}

#[tokio::test]
async fn test_get_or_load_does_not_cache_errors() {
    let backend = memory_backend();
    let cache = ItemKey.bind_with(&backend, &9);

    let result: Result<Item, &str> = cache
        .get_or_load(Duration::from_secs(60), || async { Err("missing") })
        .await;

    assert_eq!(result.unwrap_err(), "missing");
    assert!(backend.get_bytes("item:9").await.unwrap().is_none());
}

#[tokio::test]
async fn test_corrupt_entry_is_treated_as_miss() {
    let backend = memory_backend();
    backend
        .set_bytes("item:1", Bytes::from_static(b"not json"), Duration::from_secs(60))
        .await
        .unwrap();

    let loaded: Result<Item, CacheError> = ItemKey
        .bind_with(&backend, &1)
        .get_or_load(Duration::from_secs(60), || async { Ok(pork()) })
        .await;

    assert_eq!(loaded.unwrap(), pork());
    assert_eq!(
        ItemKey.bind_with(&backend, &1).try_get().await.unwrap(),
        Some(pork())
    );
}

#[tokio::test]
async fn test_delete_pattern_only_touches_matches() {
    let backend = memory_backend();
    let ttl = Duration::from_secs(60);
    for key in ["items:page:1:size:10", "items:page:2:size:10", "item:1"] {
        backend
            .set_bytes(key, Bytes::from_static(b"[]"), ttl)
            .await
            .unwrap();
    }

    let removed = backend.delete_pattern("items:page:*").await.unwrap();

    assert_eq!(removed, 2);
    assert!(backend.get_bytes("items:page:1:size:10").await.unwrap().is_none());
    assert!(backend.get_bytes("item:1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_memory_counter_window() {
    let backend = memory_backend();
    let ttl = Duration::from_millis(200);

    assert_eq!(backend.get_counter("attempts:bob").await.unwrap(), 0);
    for expected in 1..=3 {
        assert_eq!(
            backend.incr_with_expiry("attempts:bob", ttl).await.unwrap(),
            expected
        );
    }
    assert_eq!(backend.get_counter("attempts:bob").await.unwrap(), 3);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(backend.get_counter("attempts:bob").await.unwrap(), 0);
}

#[tokio::test]
async fn test_concurrent_increments_are_not_lost() {
    let backend = Arc::new(memory_backend());
    let ttl = Duration::from_secs(60);

    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let backend = backend.clone();
            tokio::spawn(async move {
                backend.incr_with_expiry("attempts:race", ttl).await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(backend.get_counter("attempts:race").await.unwrap(), 32);
}

#[tokio::test]
async fn test_disabled_backend_passes_through() {
    let backend = CacheBackend::Disabled;
    let cache = ItemKey.bind_with(&backend, &1);

    cache
        .set_with_expire(&pork(), Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(cache.try_get().await.unwrap(), None);
    assert_eq!(backend.delete_pattern("*").await.unwrap(), 0);
    assert!(matches!(
        backend.incr_with_expiry("k", Duration::from_secs(1)).await,
        Err(CacheError::Disabled)
    ));

    let mut calls = 0;
    for _ in 0..2 {
        let loaded: Result<Item, CacheError> = cache
            .get_or_load(Duration::from_secs(60), || {
                calls += 1;
                async { Ok(pork()) }
            })
            .await;
        assert_eq!(loaded.unwrap(), pork());
    }
    assert_eq!(calls, 2);
}

#[tokio::test]
async fn test_unreachable_redis_degrades_reads() {
    let backend = unreachable_backend().await;

    assert!(backend.get_bytes("item:1").await.is_err());
    assert!(backend.delete_pattern("item:*").await.is_err());

    let loaded: Result<Item, CacheError> = ItemKey
        .bind_with(&backend, &1)
        .get_or_load(Duration::from_secs(60), || async { Ok(pork()) })
        .await;
    assert_eq!(loaded.unwrap(), pork());
}

/// Requires a Redis server; `REDIS_URL` defaults to redis://localhost:6379.
#[tokio::test]
#[ignore]
async fn test_redis_scan_delete_and_counter() -> anyhow::Result<()> {
    let url = std::env::var("REDIS_URL")
        .unwrap_or_else(|_| "redis://localhost:6379".into());
    let pool = deadpool_redis::Config::from_url(url)
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))?;
    let backend = CacheBackend::from(pool.clone());
    backend.ping().await?;

    let ttl = Duration::from_secs(30);
    for page in 1..=250 {
        backend
            .set_bytes(&format!("it:items:page:{page}"), Bytes::from_static(b"[]"), ttl)
            .await?;
    }
    backend.set_bytes("it:item:1", Bytes::from_static(b"{}"), ttl).await?;

    assert_eq!(backend.delete_pattern("it:items:page:*").await?, 250);
    assert!(backend.get_bytes("it:item:1").await?.is_some());

    backend.delete(&["it:attempts".to_string(), "it:item:1".to_string()]).await?;
    assert_eq!(backend.incr_with_expiry("it:attempts", ttl).await?, 1);
    assert_eq!(backend.incr_with_expiry("it:attempts", ttl).await?, 2);
    assert_eq!(backend.get_counter("it:attempts").await?, 2);

    let mut conn = pool.get().await?;
    let remaining: i64 = deadpool_redis::redis::cmd("TTL")
        .arg("it:attempts")
        .query_async(&mut conn)
        .await?;
    assert!(remaining > 0 && remaining <= 30);

    // a counter left without an expiry gets one on the next increment
    deadpool_redis::redis::cmd("SET")
        .arg("it:stuck")
        .arg(3)
        .query_async::<()>(&mut conn)
        .await?;
    assert_eq!(backend.incr_with_expiry("it:stuck", ttl).await?, 4);
    let remaining: i64 = deadpool_redis::redis::cmd("TTL")
        .arg("it:stuck")
        .query_async(&mut conn)
        .await?;
    assert!(remaining > 0);

    backend
        .delete(&["it:attempts".to_string(), "it:stuck".to_string()])
        .await?;

    Ok(())
}
