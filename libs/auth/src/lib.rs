//! Bearer-token authentication: HS256 JWT issuing and verification, Argon2id
//! password hashing, and axum extractors for authenticated and owner-only
//! routes.

pub mod claims;
pub mod extract;
pub mod password;
pub mod token;

use common_errors::AppError;
use thiserror::Error;

pub use claims::Claims;
pub use extract::{AuthUser, OwnerUser};
pub use password::{Argon2Verifier, CredentialVerifier, SharedCredentialVerifier};
pub use token::{
    DEFAULT_TOKEN_TTL_HOURS, JwtTokenIssuer, SharedTokenIssuer, TokenIssuer,
};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("owner role required")]
    Forbidden,
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => {
                AppError::unauthorized("UNAUTHORIZED", "Authentication required")
            }
            AuthError::InvalidToken(e) => {
                AppError::unauthorized("INVALID_TOKEN", "Invalid or expired token")
                    .with_details(e.to_string())
            }
            AuthError::Forbidden => {
                AppError::forbidden("FORBIDDEN", "Owner role required")
            }
            AuthError::Hashing(msg) => AppError::internal_server_error(&msg),
        }
    }
}
