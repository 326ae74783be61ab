use async_trait::async_trait;
use catalog_errors::CatalogError;
use catalog_models::{CatalogItem, CatalogItemDraft, Spice};
use dao_utils::{count_query, first_row_or_not_found};
use database_traits::GenericDao;
use sql_connection::SqlConnect;
use tokio_postgres::Row;
use tracing::instrument;

const COLUMNS: &str = "id, meat, avail, price, recipe1, recipe2";

#[derive(Clone)]
pub struct CatalogDao {
    db: SqlConnect,
}

impl CatalogDao {
    pub fn new(db: SqlConnect) -> Self { Self { db } }

    fn map_row(row: &Row) -> CatalogItem {
        CatalogItem {
            id: row.get("id"),
            meat: row.get("meat"),
            avail: row.get("avail"),
            price: row.get("price"),
            spice: Spice {
                recipe1: row.get("recipe1"),
                recipe2: row.get("recipe2"),
            },
        }
    }
}

#[async_trait]
impl GenericDao for CatalogDao {
    type CreateRequest = CatalogItemDraft;
    type Error = CatalogError;
    type ID = i32;
    type Model = CatalogItem;
    type UpdateRequest = CatalogItemDraft;

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> Result<CatalogItem, CatalogError> {
        let client = self.db.get_client().await?;
        let stmt = client
            .prepare(&format!("SELECT {COLUMNS} FROM assortment WHERE id = $1"))
            .await?;
        let rows = client.query(&stmt, &[&id]).await?;

        first_row_or_not_found(&rows, Self::map_row, CatalogError::NotFound {
            id,
        })
    }

    #[instrument(skip(self))]
    async fn find_page(
        &self, offset: i64, limit: i64,
    ) -> Result<Vec<CatalogItem>, CatalogError> {
        let client = self.db.get_client().await?;
        let stmt = client
            .prepare(&format!(
                "SELECT {COLUMNS} FROM assortment ORDER BY id LIMIT $1 OFFSET $2"
            ))
            .await?;
        let rows = client.query(&stmt, &[&limit, &offset]).await?;

        Ok(rows.iter().map(Self::map_row).collect())
    }

    async fn count(&self) -> Result<i64, CatalogError> {
        let client = self.db.get_client().await?;
        Ok(count_query(&client, "assortment").await?)
    }

    #[instrument(skip(self))]
    async fn create(
        &self, req: CatalogItemDraft,
    ) -> Result<CatalogItem, CatalogError> {
        let mut client = self.db.get_client().await?;
        let tx = client.transaction().await?;

        let sql = format!(
            "INSERT INTO assortment (meat, avail, price, recipe1, recipe2)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let row = tx
            .query_one(
                sql.as_str(),
                &[
                    &req.meat,
                    &req.avail,
                    &req.price,
                    &req.spice.recipe1,
                    &req.spice.recipe2,
                ],
            )
            .await?;
        tx.commit().await?;

        Ok(Self::map_row(&row))
    }

    #[instrument(skip(self))]
    async fn update(
        &self, id: i32, req: CatalogItemDraft,
    ) -> Result<CatalogItem, CatalogError> {
        let mut client = self.db.get_client().await?;
        let tx = client.transaction().await?;

        let sql = format!(
            "UPDATE assortment
             SET meat = $1, avail = $2, price = $3, recipe1 = $4,
                 recipe2 = $5, updated_at = NOW()
             WHERE id = $6
             RETURNING {COLUMNS}"
        );
        let rows = tx
            .query(
                sql.as_str(),
                &[
                    &req.meat,
                    &req.avail,
                    &req.price,
                    &req.spice.recipe1,
                    &req.spice.recipe2,
                    &id,
                ],
            )
            .await?;
        let item =
            first_row_or_not_found(&rows, Self::map_row, CatalogError::NotFound {
                id,
            })?;
        tx.commit().await?;

        Ok(item)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i32) -> Result<(), CatalogError> {
        let mut client = self.db.get_client().await?;
        let tx = client.transaction().await?;

        let deleted = tx
            .execute("DELETE FROM assortment WHERE id = $1", &[&id])
            .await?;
        if deleted == 0 {
            return Err(CatalogError::NotFound { id });
        }
        tx.commit().await?;

        Ok(())
    }
}
