use anyhow::Context;
use tracing::info;

use crate::SqlConnect;

/// Schema and seed data, applied in order and recorded in `_migrations`.
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "001_create_assortment",
        include_str!("../../../../domains/catalog/migrations/sql/001_create_assortment.sql"),
    ),
    (
        "002_create_users",
        include_str!("../../../../domains/users/migrations/sql/002_create_users.sql"),
    ),
    (
        "003_create_orders",
        include_str!("../../../../domains/orders/migrations/sql/003_create_orders.sql"),
    ),
    (
        "004_seed_assortment",
        include_str!("../../../../domains/catalog/migrations/sql/004_seed_assortment.sql"),
    ),
];

pub struct SqlMigrator {
    db: SqlConnect,
}

impl SqlMigrator {
    pub fn new(db: SqlConnect) -> Self { Self { db } }

    pub fn migration_names() -> impl Iterator<Item = &'static str> {
        MIGRATIONS.iter().map(|(name, _)| *name)
    }

    /// Applies every pending migration, each in its own transaction.
    pub async fn run_all_migrations(&self) -> anyhow::Result<()> {
        let mut client = self.db.get_client().await?;

        client
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS _migrations (
                    id SERIAL PRIMARY KEY,
                    name VARCHAR(255) NOT NULL UNIQUE,
                    applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )",
            )
            .await
            .context("failed to create migration table")?;

        for (name, sql) in MIGRATIONS {
            let applied = client
                .query_opt("SELECT 1 FROM _migrations WHERE name = $1", &[name])
                .await?
                .is_some();
            if applied {
                continue;
            }

            info!(migration = name, "applying migration");
            let tx = client.transaction().await?;
            tx.batch_execute(sql)
                .await
                .with_context(|| format!("migration {name} failed"))?;
            tx.execute("INSERT INTO _migrations (name) VALUES ($1)", &[name])
                .await?;
            tx.commit().await?;
        }

        Ok(())
    }

    pub async fn list_applied_migrations(&self) -> anyhow::Result<Vec<String>> {
        let client = self.db.get_client().await?;
        let rows = client
            .query("SELECT name FROM _migrations ORDER BY id", &[])
            .await?;

        Ok(rows.into_iter().map(|row| row.get(0)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered_and_unique() {
        let names: Vec<_> = SqlMigrator::migration_names().collect();
        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();

        assert_eq!(names, sorted);
    }

    #[test]
    fn seed_covers_the_six_cuts() {
        let (_, seed) = MIGRATIONS
            .iter()
            .find(|(name, _)| *name == "004_seed_assortment")
            .unwrap();

        for meat in ["Pork", "Beef", "Chicken", "Turkey", "Mutton", "Venison"] {
            assert!(seed.contains(&format!("'{meat}'")), "{meat} missing");
        }
    }
}
