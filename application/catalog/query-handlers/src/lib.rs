use std::sync::Arc;

use catalog_cache_keys::{
    BULK_PRICE_TTL, BulkPriceCacheKey, CATALOG_TTL, CatalogItemCacheKey,
    CatalogPageCacheKey, bulk_key_fragment,
};
use catalog_errors::CatalogError;
use catalog_queries::{
    BulkQuoteLine, GetCatalogItemQuery, ListCatalogQuery, QuoteBulkQuery,
    QuotePriceQuery,
};
use catalog_responses::{
    BulkQuoteLineResponse, BulkQuoteResponse, CatalogItemResponse,
    CatalogPageResponse, PriceQuoteResponse,
};
use catalog_store::SharedCatalogStore;
use database_traits::GenericDao;
use pricing::{PriceLine, price_bulk, price_one, round_to_cents};
use redis_connection::core::{CacheBackend, CacheTypeBind};
use tracing::instrument;

#[derive(Clone)]
pub struct ListCatalogQueryHandler {
    store: SharedCatalogStore,
    cache: Arc<CacheBackend>,
}

impl ListCatalogQueryHandler {
    pub fn new(store: SharedCatalogStore, cache: Arc<CacheBackend>) -> Self {
        Self { store, cache }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, query: ListCatalogQuery,
    ) -> Result<CatalogPageResponse, CatalogError> {
        let page = query.page;
        let (number, size) = (page.page(), page.size());

        CatalogPageCacheKey
            .bind_with_args(&self.cache, (&number, &size))
            .get_or_load(CATALOG_TTL, || async move {
                let total_count = self.store.count().await?;
                let items =
                    self.store.find_page(page.offset(), page.limit()).await?;
                Ok(CatalogPageResponse {
                    assortment: items
                        .into_iter()
                        .map(CatalogItemResponse::from)
                        .collect(),
                    total_count,
                    total_pages: page.total_pages(total_count),
                    current_page: number,
                    page_size: size,
                })
            })
            .await
    }
}

#[derive(Clone)]
pub struct GetCatalogItemQueryHandler {
    store: SharedCatalogStore,
    cache: Arc<CacheBackend>,
}

impl GetCatalogItemQueryHandler {
    pub fn new(store: SharedCatalogStore, cache: Arc<CacheBackend>) -> Self {
        Self { store, cache }
    }

    /// Misses are not cached, so an item created later is visible at once.
    #[instrument(skip(self))]
    pub async fn execute(
        &self, query: GetCatalogItemQuery,
    ) -> Result<CatalogItemResponse, CatalogError> {
        CatalogItemCacheKey
            .bind_with(&self.cache, &query.id)
            .get_or_load(CATALOG_TTL, || async move {
                let item = self.store.find_by_id(query.id).await?;
                Ok(CatalogItemResponse::from(item))
            })
            .await
    }
}

/// Undiscounted single-line quote, always read from the store.
#[derive(Clone)]
pub struct QuotePriceQueryHandler {
    store: SharedCatalogStore,
}

impl QuotePriceQueryHandler {
    pub fn new(store: SharedCatalogStore) -> Self { Self { store } }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, query: QuotePriceQuery,
    ) -> Result<PriceQuoteResponse, CatalogError> {
        let item = self.store.find_by_id(query.id).await?;
        let total_price = price_one(item.price, query.quantity)?;

        Ok(PriceQuoteResponse {
            id: item.id,
            meat: item.meat,
            quantity: query.quantity,
            total_price,
        })
    }
}

#[derive(Clone)]
pub struct QuoteBulkQueryHandler {
    store: SharedCatalogStore,
    cache: Arc<CacheBackend>,
}

impl QuoteBulkQueryHandler {
    pub fn new(store: SharedCatalogStore, cache: Arc<CacheBackend>) -> Self {
        Self { store, cache }
    }

    #[instrument(skip(self), fields(lines = query.items.len()))]
    pub async fn execute(
        &self, query: QuoteBulkQuery,
    ) -> Result<BulkQuoteResponse, CatalogError> {
        if query.items.is_empty() {
            return Err(pricing::PricingError::EmptyOrder.into());
        }

        // Priced at the precision the cache key carries.
        let query = QuoteBulkQuery {
            items: query
                .items
                .into_iter()
                .map(|line| {
                    BulkQuoteLine {
                        quantity: round_to_cents(line.quantity),
                        ..line
                    }
                })
                .collect(),
        };

        let fragment = bulk_key_fragment(&query.items);
        BulkPriceCacheKey
            .bind_with(&self.cache, &fragment)
            .get_or_load(BULK_PRICE_TTL, || self.price(&query))
            .await
    }

    async fn price(
        &self, query: &QuoteBulkQuery,
    ) -> Result<BulkQuoteResponse, CatalogError> {
        let mut items = Vec::with_capacity(query.items.len());
        for line in &query.items {
            items.push(self.store.find_by_id(line.id).await?);
        }

        let price_lines: Vec<PriceLine> = items
            .iter()
            .zip(&query.items)
            .map(|(item, line)| PriceLine::new(item.price, line.quantity))
            .collect();
        let breakdown = price_bulk(&price_lines)?;

        let lines = items
            .into_iter()
            .zip(&query.items)
            .zip(breakdown.line_totals)
            .map(|((item, line), total_price)| {
                BulkQuoteLineResponse {
                    id: item.id,
                    meat: item.meat,
                    quantity: line.quantity,
                    total_price,
                    selected_spice: line.selected_spice.clone(),
                    spice: item.spice,
                }
            })
            .collect();

        Ok(BulkQuoteResponse {
            items: lines,
            total_price: breakdown.total,
        })
    }
}

#[cfg(test)]
mod tests {
    use catalog_models::CatalogItemDraft;
    use dao_utils::PageRequest;
    use test_utils::{
        MemoryCatalogStore, disabled_backend, memory_backend,
        unreachable_redis_backend,
    };

    use super::*;

    fn list(page: i64, size: i64) -> ListCatalogQuery {
        ListCatalogQuery {
            page: PageRequest::new(page, size).unwrap(),
        }
    }

    fn bulk(lines: &[(i32, f64)]) -> QuoteBulkQuery {
        QuoteBulkQuery {
            items: lines
                .iter()
                .map(|&(id, quantity)| {
                    BulkQuoteLine {
                        id,
                        quantity,
                        selected_spice: "Honey".into(),
                    }
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn second_page_read_is_served_from_cache() {
        let store = Arc::new(MemoryCatalogStore::seeded());
        let handler = ListCatalogQueryHandler::new(store.clone(), memory_backend());

        let first = handler.execute(list(1, 4)).await.unwrap();
        let second = handler.execute(list(1, 4)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.assortment.len(), 4);
        assert_eq!(first.total_count, 6);
        assert_eq!(first.total_pages, 2);
        assert_eq!(store.calls.reads(), 1);
        assert_eq!(store.calls.counts(), 1);
    }

    #[tokio::test]
    async fn page_size_is_part_of_the_key() {
        let store = Arc::new(MemoryCatalogStore::seeded());
        let handler = ListCatalogQueryHandler::new(store.clone(), memory_backend());

        handler.execute(list(1, 4)).await.unwrap();
        let wide = handler.execute(list(1, 10)).await.unwrap();

        assert_eq!(wide.assortment.len(), 6);
        assert_eq!(wide.total_pages, 1);
        assert_eq!(store.calls.reads(), 2);
    }

    #[tokio::test]
    async fn empty_catalog_has_zero_pages() {
        let store = Arc::new(MemoryCatalogStore::new());
        let handler = ListCatalogQueryHandler::new(store, memory_backend());

        let page = handler.execute(list(1, 10)).await.unwrap();

        assert!(page.assortment.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[tokio::test]
    async fn stale_entry_is_served_until_invalidated() {
        let store = Arc::new(MemoryCatalogStore::seeded());
        let cache = memory_backend();
        let handler = GetCatalogItemQueryHandler::new(store.clone(), cache.clone());

        let before = handler.execute(GetCatalogItemQuery { id: 1 }).await.unwrap();
        store
            .update(
                1,
                CatalogItemDraft::builder().meat("Pork").price(1900.0).build(),
            )
            .await
            .unwrap();

        let cached = handler.execute(GetCatalogItemQuery { id: 1 }).await.unwrap();
        assert_eq!(cached.price, before.price);

        cache.delete(&["product:1".to_string()]).await.unwrap();
        let fresh = handler.execute(GetCatalogItemQuery { id: 1 }).await.unwrap();
        assert_eq!(fresh.price, 1900.0);
    }

    #[tokio::test]
    async fn missing_item_is_not_cached() {
        let store = Arc::new(MemoryCatalogStore::new());
        let cache = memory_backend();
        let handler = GetCatalogItemQueryHandler::new(store.clone(), cache.clone());

        let err = handler
            .execute(GetCatalogItemQuery { id: 7 })
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { id: 7 }));
        assert!(cache.get_bytes("product:7").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn cache_outage_falls_back_to_store() {
        let store = Arc::new(MemoryCatalogStore::seeded());
        let handler = GetCatalogItemQueryHandler::new(
            store.clone(),
            unreachable_redis_backend().await.unwrap(),
        );

        for _ in 0..3 {
            let item =
                handler.execute(GetCatalogItemQuery { id: 2 }).await.unwrap();
            assert_eq!(item.meat, "Beef");
        }
        assert_eq!(store.calls.reads(), 3);
    }

    #[tokio::test]
    async fn single_quote_ignores_discounts() {
        let store = Arc::new(MemoryCatalogStore::seeded());
        let handler = QuotePriceQueryHandler::new(store);

        let quote = handler
            .execute(QuotePriceQuery {
                id: 1,
                quantity: 25.0,
            })
            .await
            .unwrap();

        assert_eq!(quote.meat, "Pork");
        assert_eq!(quote.total_price, 45000.0);
    }

    #[tokio::test]
    async fn bulk_quote_applies_tier_and_is_cached() {
        let store = Arc::new(MemoryCatalogStore::seeded());
        let cache = memory_backend();
        let handler = QuoteBulkQueryHandler::new(store.clone(), cache.clone());

        let quote = handler.execute(bulk(&[(1, 5.0), (2, 5.0)])).await.unwrap();

        assert_eq!(quote.items[0].total_price, 9000.0);
        assert_eq!(quote.items[1].total_price, 14000.0);
        assert_eq!(quote.items[1].selected_spice, "Honey");
        assert_eq!(quote.total_price, 21160.0);

        handler.execute(bulk(&[(1, 5.0), (2, 5.0)])).await.unwrap();
        assert_eq!(store.calls.reads(), 2);

        let (_, keys) = cache.scan(0, "bulk_price:*", 100).await.unwrap();
        assert_eq!(keys, vec!["bulk_price:1:5.00:Honey;2:5.00:Honey;"]);
    }

    #[tokio::test]
    async fn bulk_quantities_below_a_cent_share_one_quote() {
        let store = Arc::new(MemoryCatalogStore::seeded());
        let cached = QuoteBulkQueryHandler::new(store.clone(), memory_backend());
        let uncached = QuoteBulkQueryHandler::new(store, disabled_backend());

        let first = cached.execute(bulk(&[(1, 9.001)])).await.unwrap();
        let second = cached.execute(bulk(&[(1, 9.004)])).await.unwrap();
        let direct = uncached.execute(bulk(&[(1, 9.004)])).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second, direct);
        assert_eq!(direct.items[0].quantity, 9.0);
        assert_eq!(direct.total_price, 16200.0);
    }

    #[tokio::test]
    async fn bulk_quote_over_twenty_units_gets_the_large_discount() {
        let store = Arc::new(MemoryCatalogStore::new());
        let brisket = store
            .create(CatalogItemDraft::builder().meat("Brisket").price(1800.0).build())
            .await
            .unwrap();
        let ribs = store
            .create(CatalogItemDraft::builder().meat("Ribs").price(1500.0).build())
            .await
            .unwrap();
        let handler = QuoteBulkQueryHandler::new(store, memory_backend());

        let quote = handler
            .execute(bulk(&[(brisket.id, 12.0), (ribs.id, 9.0)]))
            .await
            .unwrap();

        assert_eq!(quote.items[0].total_price, 21600.0);
        assert_eq!(quote.items[1].total_price, 13500.0);
        assert_eq!(quote.total_price, 30888.0);
    }

    #[tokio::test]
    async fn bulk_quote_reports_missing_item() {
        let store = Arc::new(MemoryCatalogStore::seeded());
        let handler = QuoteBulkQueryHandler::new(store, disabled_backend());

        let err = handler.execute(bulk(&[(1, 1.0), (99, 1.0)])).await.unwrap_err();

        assert!(matches!(err, CatalogError::NotFound { id: 99 }));
    }

    #[tokio::test]
    async fn empty_bulk_request_is_rejected() {
        let store = Arc::new(MemoryCatalogStore::seeded());
        let handler = QuoteBulkQueryHandler::new(store.clone(), memory_backend());

        assert!(handler.execute(bulk(&[])).await.is_err());
        assert_eq!(store.calls.reads(), 0);
    }
}
