use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use deadpool_postgres::{
    Manager, ManagerConfig, Pool as PostgresPool, RecyclingMethod,
};
use deadpool_redis::{Config as RedisConfig, Pool as RedisPool, Runtime};
use redis_connection::core::CacheBackend;
use sql_connection::{SqlConnect, SqlMigrator};
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::{postgres::Postgres, redis::Redis};
use tokio_postgres::NoTls;

const READY_ATTEMPTS: u32 = 20;
const READY_DELAY: Duration = Duration::from_millis(500);

/// A disposable Postgres with every migration applied.
pub struct TestPostgresContainer {
    pub pool: PostgresPool,
    pub connection_string: String,
    _container: ContainerAsync<Postgres>,
}

impl TestPostgresContainer {
    pub async fn new() -> Result<Self> {
        let container = Postgres::default()
            .with_env_var("POSTGRES_DB", "testdb")
            .with_env_var("POSTGRES_USER", "testuser")
            .with_env_var("POSTGRES_PASSWORD", "testpass")
            .start()
            .await
            .context("Failed to start PostgreSQL container")?;

        let host = container.get_host().await?;
        let port = container.get_host_port_ipv4(5432).await?;
        let connection_string = format!(
            "host={host} port={port} user=testuser password=testpass dbname=testdb"
        );

        let pool = Self::create_pool(&connection_string).await?;
        let instance = Self {
            pool,
            connection_string,
            _container: container,
        };

        SqlMigrator::new(instance.sql_connect())
            .run_all_migrations()
            .await
            .context("Failed to apply migrations")?;

        Ok(instance)
    }

    pub fn sql_connect(&self) -> SqlConnect { SqlConnect::new(self.pool.clone()) }

    pub async fn execute_sql(&self, sql: &str) -> Result<()> {
        let client = self.pool.get().await?;
        client
            .batch_execute(sql)
            .await
            .context("Failed to execute SQL")?;
        Ok(())
    }

    async fn create_pool(connection_string: &str) -> Result<PostgresPool> {
        let pg_config = connection_string.parse::<tokio_postgres::Config>()?;
        let mgr = Manager::from_config(pg_config, NoTls, ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        let pool = PostgresPool::builder(mgr)
            .max_size(10)
            .build()
            .context("Failed to build PostgreSQL connection pool")?;

        let mut attempts = 0;
        loop {
            let ready = match pool.get().await {
                Ok(client) => client.query_one("SELECT 1", &[]).await.is_ok(),
                Err(_) => false,
            };
            if ready {
                return Ok(pool);
            }
            attempts += 1;
            if attempts >= READY_ATTEMPTS {
                anyhow::bail!("PostgreSQL not ready after {attempts} attempts");
            }
            tokio::time::sleep(READY_DELAY).await;
        }
    }
}

/// A disposable Redis for exercising the real SCAN/DEL/INCR paths.
pub struct TestRedisContainer {
    pub pool: RedisPool,
    pub connection_string: String,
    _container: ContainerAsync<Redis>,
}

impl TestRedisContainer {
    pub async fn new() -> Result<Self> {
        let container = Redis::default()
            .start()
            .await
            .context("Failed to start Redis container")?;

        let host = container.get_host().await?;
        let port = container.get_host_port_ipv4(6379).await?;
        let connection_string = format!("redis://{host}:{port}");
        let pool = Self::create_pool(&connection_string).await?;

        Ok(Self {
            pool,
            connection_string,
            _container: container,
        })
    }

    pub fn backend(&self) -> Arc<CacheBackend> {
        Arc::new(CacheBackend::Redis(self.pool.clone()))
    }

    pub async fn flush_db(&self) -> Result<()> {
        let mut conn = self.pool.get().await?;
        deadpool_redis::redis::cmd("FLUSHDB")
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn create_pool(connection_string: &str) -> Result<RedisPool> {
        let mut cfg = RedisConfig::from_url(connection_string);
        cfg.pool = Some(deadpool_redis::PoolConfig::new(10));
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .context("Failed to create Redis pool")?;

        let mut attempts = 0;
        loop {
            let ready = match pool.get().await {
                Ok(mut conn) => {
                    deadpool_redis::redis::cmd("PING")
                        .query_async::<String>(&mut conn)
                        .await
                        .is_ok()
                }
                Err(_) => false,
            };
            if ready {
                return Ok(pool);
            }
            attempts += 1;
            if attempts >= READY_ATTEMPTS {
                anyhow::bail!("Redis not ready after {attempts} attempts");
            }
            tokio::time::sleep(READY_DELAY).await;
        }
    }
}
