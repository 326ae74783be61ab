use common_errors::AppError;
use sql_connection::{PgError, PoolError as DbPoolError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {username}")]
    NameNotFound { username: String },
    #[error("Database error: {0}")]
    Database(#[from] PgError),
    #[error("Database Pool error: {0}")]
    DatabasePool(#[from] DbPoolError),
    #[error("Name already exists")]
    NameExists,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Too many login attempts")]
    TooManyAttempts,
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NameNotFound { username } => {
                AppError::not_found(
                    "USER_NOT_FOUND",
                    &format!("User with name '{username}' not found"),
                )
            }
            UserError::NameExists => {
                AppError::unprocessable_entity(
                    "USER_NAME_EXISTS",
                    "A user with this name already exists",
                )
            }
            UserError::Validation(msg) => {
                AppError::bad_request("VALIDATION_ERROR", &msg)
            }
            UserError::InvalidCredentials => {
                AppError::unauthorized(
                    "INVALID_CREDENTIALS",
                    "Invalid credentials",
                )
            }
            UserError::TooManyAttempts => {
                AppError::too_many_requests(
                    "TOO_MANY_ATTEMPTS",
                    "Too many login attempts, try again later",
                )
            }
            UserError::Database(db_err) => {
                AppError::internal_server_error(&format!(
                    "Database error: {db_err}"
                ))
            }
            UserError::DatabasePool(pool_err) => {
                AppError::internal_server_error(&format!(
                    "Database connection error: {pool_err}"
                ))
            }
            UserError::InternalError(msg) => {
                AppError::internal_server_error(&format!(
                    "Internal error: {msg}"
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
    fn throttle_and_credentials_map_to_client_errors() {
        let throttled: AppError = UserError::TooManyAttempts.into();
        assert_eq!(throttled.kind, ErrorKind::TooManyRequests);

        let denied: AppError = UserError::InvalidCredentials.into();
        assert_eq!(denied.kind, ErrorKind::Unauthorized);

        let taken: AppError = UserError::NameExists.into();
        assert_eq!(taken.code, "USER_NAME_EXISTS");
    }
}
