use std::sync::Arc;

use dao_utils::PageRequest;
use order_cache_keys::{
    ClientOrderPageCacheKey, ORDERS_TTL, OrderPageCacheKey, phone_segment,
};
use order_errors::OrderError;
use order_models::Order;
use order_queries::{GetOrderQuery, ListClientOrdersQuery, ListOrdersQuery};
use order_responses::{OrderPageResponse, OrderResponse};
use order_store::SharedOrderStore;
use redis_connection::core::{CacheBackend, CacheTypeBind};
use tracing::instrument;

fn page_response(
    orders: Vec<Order>, total_count: i64, page: PageRequest,
) -> OrderPageResponse {
    OrderPageResponse {
        orders: orders.into_iter().map(OrderResponse::from).collect(),
        total_count,
        total_pages: page.total_pages(total_count),
        current_page: page.page(),
        page_size: page.size(),
    }
}

/// Every order, newest first. Owner-only at the HTTP layer.
#[derive(Clone)]
pub struct ListOrdersQueryHandler {
    store: SharedOrderStore,
    cache: Arc<CacheBackend>,
}

impl ListOrdersQueryHandler {
    pub fn new(store: SharedOrderStore, cache: Arc<CacheBackend>) -> Self {
        Self { store, cache }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, query: ListOrdersQuery,
    ) -> Result<OrderPageResponse, OrderError> {
        let page = query.page;

        OrderPageCacheKey
            .bind_with_args(&self.cache, (&page.page(), &page.size()))
            .get_or_load(ORDERS_TTL, || async move {
                let total_count = self.store.count().await?;
                let orders =
                    self.store.find_page(page.offset(), page.limit()).await?;
                Ok(page_response(orders, total_count, page))
            })
            .await
    }
}

#[derive(Clone)]
pub struct ListClientOrdersQueryHandler {
    store: SharedOrderStore,
    cache: Arc<CacheBackend>,
}

impl ListClientOrdersQueryHandler {
    pub fn new(store: SharedOrderStore, cache: Arc<CacheBackend>) -> Self {
        Self { store, cache }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, query: ListClientOrdersQuery,
    ) -> Result<OrderPageResponse, OrderError> {
        let page = query.page;
        let phone = query.phone_number.as_str();
        let segment = phone_segment(phone);

        ClientOrderPageCacheKey
            .bind_with_args(&self.cache, (&segment, &page.page(), &page.size()))
            .get_or_load(ORDERS_TTL, || async move {
                let total_count = self.store.count_for_phone(phone).await?;
                let orders = self
                    .store
                    .find_page_for_phone(phone, page.offset(), page.limit())
                    .await?;
                Ok(page_response(orders, total_count, page))
            })
            .await
    }
}

/// Order detail, read straight from the store.
#[derive(Clone)]
pub struct GetOrderQueryHandler {
    store: SharedOrderStore,
}

impl GetOrderQueryHandler {
    pub fn new(store: SharedOrderStore) -> Self { Self { store } }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, query: GetOrderQuery,
    ) -> Result<OrderResponse, OrderError> {
        Ok(self.store.find_by_id(query.id).await?.into())
    }
}
