use std::{net::SocketAddr, sync::Arc};

use auth::{
    Argon2Verifier, JwtTokenIssuer, SharedCredentialVerifier, SharedTokenIssuer,
};
use catalog_dao::CatalogDao;
use order_dao::OrderDao;
use redis_connection::connect_cache_backend;
use smokehouse::{AppServices, Stores, bootstrap_owner, config::AppConfig, router};
use sql_connection::{SqlConnect, SqlMigrator, connect_postgres_db};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use user_dao::UserDao;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    info!("Initializing connection pools...");
    let pool = connect_postgres_db(&config.postgres).await?;
    let db = SqlConnect::new(pool);
    SqlMigrator::new(db.clone()).run_all_migrations().await?;
    info!("PostgreSQL pool ready, migrations applied");

    let cache = Arc::new(
        connect_cache_backend(config.cache_mode, &config.redis, config.memory)
            .await,
    );
    info!(cache = cache.kind(), "cache backend selected");

    let stores = Stores {
        catalog: Arc::new(CatalogDao::new(db.clone())),
        orders: Arc::new(OrderDao::new(db.clone())),
        users: Arc::new(UserDao::new(db)),
    };
    let verifier: SharedCredentialVerifier = Arc::new(Argon2Verifier);
    let tokens: SharedTokenIssuer = Arc::new(JwtTokenIssuer::with_ttl_hours(
        config.jwt_secret.as_bytes(),
        config.token_ttl_hours,
    ));

    if let Some(owner) = config.owner {
        let username = owner.username.clone();
        match bootstrap_owner(stores.users.clone(), verifier.clone(), owner)
            .await
        {
            Ok(true) => {}
            Ok(false) => info!(%username, "owner account already exists"),
            Err(e) => warn!(%username, error = %e, "owner bootstrap failed"),
        }
    }

    let app = router(AppServices::new(stores, cache, tokens, verifier));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Smokehouse server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
