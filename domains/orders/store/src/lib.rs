use std::sync::Arc;

use async_trait::async_trait;
use order_errors::OrderError;
use order_models::{NewOrder, Order};

/// Relational store for orders. Listings are newest first.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Order, OrderError>;

    async fn find_page(
        &self, offset: i64, limit: i64,
    ) -> Result<Vec<Order>, OrderError>;

    async fn count(&self) -> Result<i64, OrderError>;

    async fn find_page_for_phone(
        &self, phone_number: &str, offset: i64, limit: i64,
    ) -> Result<Vec<Order>, OrderError>;

    async fn count_for_phone(&self, phone_number: &str)
    -> Result<i64, OrderError>;

    /// Inserts the order in one transaction.
    async fn create(&self, order: NewOrder) -> Result<Order, OrderError>;

    /// Deletes the order and returns it, so callers know whose listings to
    /// refresh.
    async fn delete(&self, id: i32) -> Result<Order, OrderError>;
}

pub type SharedOrderStore = Arc<dyn OrderStore>;
