pub use config::{DbConnectConfig, DbOptionsConfig, PostgresDbConfig};
pub use deadpool_postgres::PoolError;
pub use impl_get_connect::SqlConnect;
pub use migrator::SqlMigrator;
pub use tokio_postgres::Error as PgError;

pub mod config;
mod connect;
mod impl_get_connect;
mod migrator;

pub use connect::connect_postgres_db;
