use async_trait::async_trait;
use dao_utils::{count_query, first_row_or_not_found};
use order_errors::OrderError;
use order_models::{NewOrder, Order, OrderLine};
use order_store::OrderStore;
use serde_json::Value;
use sql_connection::SqlConnect;
use tokio_postgres::Row;
use tracing::instrument;

const COLUMNS: &str = "id, created_at, items, total_price, phone_number, name";

/// Orders live in one table; lines are a JSONB array on the row.
#[derive(Clone)]
pub struct OrderDao {
    db: SqlConnect,
}

impl OrderDao {
    pub fn new(db: SqlConnect) -> Self { Self { db } }

    fn map_row(row: &Row) -> Result<Order, OrderError> {
        let items: Value = row.try_get("items")?;
        Ok(Order {
            id: row.try_get("id")?,
            created_at: row.try_get("created_at")?,
            items: serde_json::from_value::<Vec<OrderLine>>(items)?,
            total_price: row.try_get("total_price")?,
            phone_number: row.try_get("phone_number")?,
            name: row.try_get("name")?,
        })
    }

    fn map_rows(rows: &[Row]) -> Result<Vec<Order>, OrderError> {
        rows.iter().map(Self::map_row).collect()
    }
}

#[async_trait]
impl OrderStore for OrderDao {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> Result<Order, OrderError> {
        let client = self.db.get_client().await?;
        let stmt = client
            .prepare(&format!("SELECT {COLUMNS} FROM orders WHERE id = $1"))
            .await?;
        let rows = client.query(&stmt, &[&id]).await?;

        first_row_or_not_found(&rows, Self::map_row, OrderError::NotFound {
            id,
        })?
    }

    #[instrument(skip(self))]
    async fn find_page(
        &self, offset: i64, limit: i64,
    ) -> Result<Vec<Order>, OrderError> {
        let client = self.db.get_client().await?;
        let stmt = client
            .prepare(&format!(
                "SELECT {COLUMNS} FROM orders
                 ORDER BY created_at DESC, id DESC
                 LIMIT $1 OFFSET $2"
            ))
            .await?;
        let rows = client.query(&stmt, &[&limit, &offset]).await?;

        Self::map_rows(&rows)
    }

    async fn count(&self) -> Result<i64, OrderError> {
        let client = self.db.get_client().await?;
        Ok(count_query(&client, "orders").await?)
    }

    #[instrument(skip(self))]
    async fn find_page_for_phone(
        &self, phone_number: &str, offset: i64, limit: i64,
    ) -> Result<Vec<Order>, OrderError> {
        let client = self.db.get_client().await?;
        let stmt = client
            .prepare(&format!(
                "SELECT {COLUMNS} FROM orders
                 WHERE phone_number = $1
                 ORDER BY created_at DESC, id DESC
                 LIMIT $2 OFFSET $3"
            ))
            .await?;
        let rows = client
            .query(&stmt, &[&phone_number, &limit, &offset])
            .await?;

        Self::map_rows(&rows)
    }

    async fn count_for_phone(
        &self, phone_number: &str,
    ) -> Result<i64, OrderError> {
        let client = self.db.get_client().await?;
        let row = client
            .query_one(
                "SELECT COUNT(*) FROM orders WHERE phone_number = $1",
                &[&phone_number],
            )
            .await?;
        Ok(row.get(0))
    }

    #[instrument(skip(self, order), fields(order.phone = %order.phone_number))]
    async fn create(&self, order: NewOrder) -> Result<Order, OrderError> {
        let items = serde_json::to_value(&order.items)?;
        let mut client = self.db.get_client().await?;
        let tx = client.transaction().await?;

        let sql = format!(
            "INSERT INTO orders (items, total_price, phone_number, name)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let row = tx
            .query_one(sql.as_str(), &[
                &items,
                &order.total_price,
                &order.phone_number,
                &order.name,
            ])
            .await?;
        let created = Self::map_row(&row)?;
        tx.commit().await?;

        Ok(created)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i32) -> Result<Order, OrderError> {
        let mut client = self.db.get_client().await?;
        let tx = client.transaction().await?;

        let sql = format!("DELETE FROM orders WHERE id = $1 RETURNING {COLUMNS}");
        let rows = tx.query(sql.as_str(), &[&id]).await?;
        let deleted =
            first_row_or_not_found(&rows, Self::map_row, OrderError::NotFound {
                id,
            })??;
        tx.commit().await?;

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use test_utils::TestPostgresContainer;

    use super::*;

    fn new_order(phone: &str, total_price: f64) -> NewOrder {
        NewOrder {
            items: vec![OrderLine {
                id: 1,
                quantity: 2.5,
                selected_spice: "Honey, black pepper, soy sauce!".into(),
                meat: "Pork".into(),
            }],
            total_price,
            phone_number: phone.into(),
            name: "Ann".into(),
        }
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn orders_round_trip_their_lines() {
        let container = TestPostgresContainer::new().await.unwrap();
        let dao = OrderDao::new(container.sql_connect());

        let created = dao.create(new_order("+100", 4500.0)).await.unwrap();
        let loaded = dao.find_by_id(created.id).await.unwrap();

        assert_eq!(loaded.items, created.items);
        assert_eq!(loaded.total_price, 4500.0);
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn listings_are_newest_first_and_scoped() {
        let container = TestPostgresContainer::new().await.unwrap();
        let dao = OrderDao::new(container.sql_connect());
        let first = dao.create(new_order("+100", 1.0)).await.unwrap();
        dao.create(new_order("+200", 2.0)).await.unwrap();
        let third = dao.create(new_order("+100", 3.0)).await.unwrap();

        let mine = dao.find_page_for_phone("+100", 0, 10).await.unwrap();
        let ids: Vec<i32> = mine.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![third.id, first.id]);
        assert_eq!(dao.count_for_phone("+100").await.unwrap(), 2);
        assert_eq!(dao.count().await.unwrap(), 3);
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn delete_returns_the_removed_order() {
        let container = TestPostgresContainer::new().await.unwrap();
        let dao = OrderDao::new(container.sql_connect());
        let created = dao.create(new_order("+100", 1.0)).await.unwrap();

        let deleted = dao.delete(created.id).await.unwrap();

        assert_eq!(deleted.phone_number, "+100");
        assert!(matches!(
            dao.delete(created.id).await,
            Err(OrderError::NotFound { .. })
        ));
    }
}
