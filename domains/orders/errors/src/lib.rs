use catalog_errors::{CatalogError, pagination_error};
use common_errors::AppError;
use dao_utils::PaginationError;
use pricing::PricingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Database error: {0}")]
    Database(#[from] sql_connection::PgError),
    #[error("Connection error: {0}")]
    Connection(#[from] sql_connection::PoolError),
    #[error("Stored order lines are malformed: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("Order not found: {id}")]
    NotFound { id: i32 },
    #[error("Validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound { id } => {
                AppError::not_found(
                    "ORDER_NOT_FOUND",
                    &format!("Order {id} not found"),
                )
            }
            OrderError::Validation(msg) => {
                AppError::bad_request("VALIDATION_ERROR", &msg)
            }
            OrderError::Catalog(e) => e.into(),
            OrderError::Pricing(e) => {
                AppError::bad_request("INVALID_QUANTITY", &e.to_string())
            }
            OrderError::Pagination(e) => pagination_error(e),
            OrderError::Database(e) => {
                AppError::internal_server_error(&format!("Database error: {e}"))
            }
            OrderError::Connection(e) => {
                AppError::internal_server_error(&format!(
                    "Database connection error: {e}"
                ))
            }
            OrderError::Encoding(e) => {
                AppError::internal_server_error(&format!(
                    "Order encoding error: {e}"
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use common_errors::ErrorKind;

    use super::*;

    #[test]
    fn missing_catalog_item_is_a_404() {
        let app: AppError =
            OrderError::Catalog(CatalogError::NotFound { id: 12 }).into();
        assert_eq!(app.kind, ErrorKind::NotFound);
        assert_eq!(app.code, "ITEM_NOT_FOUND");
    }

    #[test]
    fn missing_order_is_a_404() {
        let app: AppError = OrderError::NotFound { id: 3 }.into();
        assert_eq!(app.code, "ORDER_NOT_FOUND");
    }
}
