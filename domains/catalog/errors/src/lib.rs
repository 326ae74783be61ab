use common_errors::AppError;
use dao_utils::PaginationError;
use pricing::PricingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(#[from] sql_connection::PgError),
    #[error("Connection error: {0}")]
    Connection(#[from] sql_connection::PoolError),
    #[error("Catalog item not found: {id}")]
    NotFound { id: i32 },
    #[error("Validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { id } => {
                AppError::not_found(
                    "ITEM_NOT_FOUND",
                    &format!("Catalog item {id} not found"),
                )
            }
            CatalogError::Validation(msg) => {
                AppError::bad_request("VALIDATION_ERROR", &msg)
            }
            CatalogError::Pricing(e) => {
                AppError::bad_request("INVALID_QUANTITY", &e.to_string())
            }
            CatalogError::Pagination(e) => pagination_error(e),
            CatalogError::Database(e) => {
                AppError::internal_server_error(&format!("Database error: {e}"))
            }
            CatalogError::Connection(e) => {
                AppError::internal_server_error(&format!(
                    "Database connection error: {e}"
                ))
            }
        }
    }
}

pub fn pagination_error(err: PaginationError) -> AppError {
    match err {
        PaginationError::InvalidPage(_) => {
            AppError::bad_request("INVALID_PAGE", &err.to_string())
        }
        PaginationError::InvalidSize(_) => {
            AppError::bad_request("INVALID_SIZE", &err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use common_errors::ErrorKind;

    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let app: AppError = CatalogError::NotFound { id: 4 }.into();
        assert_eq!(app.kind, ErrorKind::NotFound);
        assert_eq!(app.code, "ITEM_NOT_FOUND");
    }

    #[test]
    fn pagination_maps_to_specific_codes() {
        let app: AppError =
            CatalogError::Pagination(PaginationError::InvalidSize(0)).into();
        assert_eq!(app.kind, ErrorKind::BadRequest);
        assert_eq!(app.code, "INVALID_SIZE");
    }

    #[test]
    fn pricing_maps_to_bad_request() {
        let app: AppError =
            CatalogError::Pricing(PricingError::InvalidQuantity(-1.0)).into();
        assert_eq!(app.code, "INVALID_QUANTITY");
    }
}
