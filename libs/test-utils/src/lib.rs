//! Shared fixtures: in-memory stores that count their calls, cache backends
//! in every state the service can meet, and throwaway Postgres/Redis
//! containers for the DAO tests.

pub mod cache;
pub mod containers;
pub mod stores;

pub use cache::{disabled_backend, memory_backend, unreachable_redis_backend};
pub use containers::{TestPostgresContainer, TestRedisContainer};
pub use stores::{
    MemoryCatalogStore, MemoryOrderStore, MemoryUserStore, StoreCalls,
    seed_assortment,
};
