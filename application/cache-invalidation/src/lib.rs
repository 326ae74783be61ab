use std::sync::Arc;

use catalog_cache_keys::{
    BULK_PRICE_PATTERN, CATALOG_PAGES_PATTERN, catalog_item_pattern,
};
use order_cache_keys::{ORDER_PAGES_PATTERN, client_orders_pattern};
use redis_connection::core::CacheBackend;
use tracing::{debug, instrument, warn};

/// A committed write whose cached projections must be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CatalogItemCreated { id: i32 },
    CatalogItemUpdated { id: i32 },
    CatalogItemDeleted { id: i32 },
    OrderCreated { phone_number: String },
    OrderDeleted { phone_number: String },
}

impl Mutation {
    /// Catalog writes also drop bulk quotes, which embed item prices.
    pub fn patterns(&self) -> Vec<String> {
        match self {
            Mutation::CatalogItemCreated { id }
            | Mutation::CatalogItemUpdated { id }
            | Mutation::CatalogItemDeleted { id } => {
                vec![
                    CATALOG_PAGES_PATTERN.to_string(),
                    catalog_item_pattern(*id),
                    BULK_PRICE_PATTERN.to_string(),
                ]
            }
            Mutation::OrderCreated { phone_number } => {
                vec![
                    CATALOG_PAGES_PATTERN.to_string(),
                    ORDER_PAGES_PATTERN.to_string(),
                    client_orders_pattern(phone_number),
                    BULK_PRICE_PATTERN.to_string(),
                ]
            }
            Mutation::OrderDeleted { phone_number } => {
                vec![
                    ORDER_PAGES_PATTERN.to_string(),
                    client_orders_pattern(phone_number),
                ]
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationReport {
    pub keys_deleted: u64,
    pub failed_patterns: Vec<String>,
}

impl InvalidationReport {
    pub fn is_complete(&self) -> bool { self.failed_patterns.is_empty() }
}

#[derive(Clone)]
pub struct InvalidationCoordinator {
    backend: Arc<CacheBackend>,
}

impl InvalidationCoordinator {
    pub fn new(backend: Arc<CacheBackend>) -> Self { Self { backend } }

    /// Deletes every key matching each pattern. A failing pattern is logged
    /// and skipped; the others still run.
    #[instrument(skip(self), fields(cache.backend = self.backend.kind()))]
    pub async fn invalidate(&self, patterns: &[String]) -> InvalidationReport {
        let mut report = InvalidationReport::default();
        if self.backend.is_disabled() {
            return report;
        }

        for pattern in patterns {
            match self.backend.delete_pattern(pattern).await {
                Ok(deleted) => {
                    debug!(cache.pattern = %pattern, deleted, "invalidated");
                    report.keys_deleted += deleted;
                }
                Err(e) => {
                    warn!(
                        cache.pattern = %pattern,
                        error = %e,
                        "cache invalidation failed"
                    );
                    report.failed_patterns.push(pattern.clone());
                }
            }
        }

        report
    }

    pub async fn invalidate_for(&self, mutation: Mutation) -> InvalidationReport {
        self.invalidate(&mutation.patterns()).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bytes::Bytes;
    use redis_connection::{
        config::{MemoryConfig, RedisDbConfig},
        connect_redis_db,
    };

    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    async fn seeded(keys: &[&str]) -> Arc<CacheBackend> {
        let backend = Arc::new(CacheBackend::memory(MemoryConfig::default()));
        for key in keys {
            backend
                .set_bytes(key, Bytes::from_static(b"{}"), TTL)
                .await
                .unwrap();
        }
        backend
    }

    async fn present(backend: &CacheBackend, key: &str) -> bool {
        backend.get_bytes(key).await.unwrap().is_some()
    }

    #[tokio::test]
    async fn catalog_update_drops_pages_item_and_quotes() {
        let backend = seeded(&[
            "assortment:page:1:size:10",
            "assortment:page:2:size:5",
            "product:3",
            "product:4",
            "orders:page:1:size:10",
            "bulk_price:3:2.00:Honey;",
        ])
        .await;
        let coordinator = InvalidationCoordinator::new(backend.clone());

        let report = coordinator
            .invalidate_for(Mutation::CatalogItemUpdated { id: 3 })
            .await;

        assert_eq!(report.keys_deleted, 4);
        assert!(!present(&backend, "bulk_price:3:2.00:Honey;").await);
        assert!(report.is_complete());
        assert!(!present(&backend, "product:3").await);
        assert!(present(&backend, "product:4").await);
        assert!(present(&backend, "orders:page:1:size:10").await);
    }

    #[tokio::test]
    async fn order_creation_spares_other_principals() {
        let backend = seeded(&[
            "assortment:page:1:size:10",
            "orders:page:1:size:10",
            "client_orders:+100:page:1:size:10",
            "client_orders:+200:page:1:size:10",
            "bulk_price:1:2.00:Honey;",
            "product:1",
        ])
        .await;
        let coordinator = InvalidationCoordinator::new(backend.clone());

        let report = coordinator
            .invalidate_for(Mutation::OrderCreated {
                phone_number: "+100".into(),
            })
            .await;

        assert_eq!(report.keys_deleted, 4);
        assert!(present(&backend, "client_orders:+200:page:1:size:10").await);
        assert!(present(&backend, "product:1").await);
    }

    #[tokio::test]
    async fn order_deletion_keeps_catalog_and_quotes() {
        let backend = seeded(&[
            "assortment:page:1:size:10",
            "orders:page:1:size:10",
            "client_orders:+100:page:3:size:10",
            "bulk_price:1:2.00:Honey;",
        ])
        .await;
        let coordinator = InvalidationCoordinator::new(backend.clone());

        coordinator
            .invalidate_for(Mutation::OrderDeleted {
                phone_number: "+100".into(),
            })
            .await;

        assert!(present(&backend, "assortment:page:1:size:10").await);
        assert!(present(&backend, "bulk_price:1:2.00:Honey;").await);
        assert!(!present(&backend, "orders:page:1:size:10").await);
        assert!(!present(&backend, "client_orders:+100:page:3:size:10").await);
    }

    #[tokio::test]
    async fn disabled_backend_reports_nothing() {
        let coordinator =
            InvalidationCoordinator::new(Arc::new(CacheBackend::Disabled));

        let report = coordinator
            .invalidate_for(Mutation::CatalogItemDeleted { id: 1 })
            .await;

        assert_eq!(report, InvalidationReport::default());
    }

    #[tokio::test]
    async fn unreachable_backend_fails_each_pattern_independently() {
        let config = RedisDbConfig {
            port: 1,
            ..RedisDbConfig::default()
        };
        let pool = connect_redis_db(&config).await.unwrap();
        let coordinator =
            InvalidationCoordinator::new(Arc::new(CacheBackend::Redis(pool)));

        let report = coordinator
            .invalidate_for(Mutation::OrderCreated {
                phone_number: "+100".into(),
            })
            .await;

        assert_eq!(report.keys_deleted, 0);
        assert_eq!(report.failed_patterns.len(), 4);
    }

    #[test]
    fn catalog_mutations_share_patterns() {
        let created = Mutation::CatalogItemCreated { id: 9 }.patterns();
        let deleted = Mutation::CatalogItemDeleted { id: 9 }.patterns();
        assert_eq!(created, deleted);
        assert_eq!(created, vec!["assortment:*", "product:9", "bulk_price:*"]);
    }
}
