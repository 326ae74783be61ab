use anyhow::Result;
use smokehouse::config::AppConfig;
use sql_connection::{SqlConnect, SqlMigrator, connect_postgres_db};
use tracing::{Level, info};

/// Applies pending migrations, including the assortment seed, and exits.
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let postgres = AppConfig::postgres_from_env()?;
    let pool = connect_postgres_db(&postgres).await?;
    let migrator = SqlMigrator::new(SqlConnect::new(pool));

    info!("Running database migrations...");
    migrator.run_all_migrations().await?;

    for name in migrator.list_applied_migrations().await? {
        info!(migration = %name, "applied");
    }

    Ok(())
}
