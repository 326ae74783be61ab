use std::{fmt, future::Future};

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    pub error: ApiErrorInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorInfo {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    UnprocessableEntity,
    TooManyRequests,
    InternalServerError,
}

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl AppError {
    pub fn new(kind: ErrorKind, code: &str, message: &str) -> Self {
        Self {
            kind,
            code: code.to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn bad_request(code: &str, message: &str) -> Self {
        Self::new(ErrorKind::BadRequest, code, message)
    }

    pub fn bad_request_with_details(
        code: &str, message: &str, details: &str,
    ) -> Self {
        Self::bad_request(code, message).with_details(details)
    }

    pub fn unauthorized(code: &str, message: &str) -> Self {
        Self::new(ErrorKind::Unauthorized, code, message)
    }

    pub fn forbidden(code: &str, message: &str) -> Self {
        Self::new(ErrorKind::Forbidden, code, message)
    }

    pub fn not_found(code: &str, message: &str) -> Self {
        Self::new(ErrorKind::NotFound, code, message)
    }

    pub fn unprocessable_entity(code: &str, message: &str) -> Self {
        Self::new(ErrorKind::UnprocessableEntity, code, message)
    }

    pub fn too_many_requests(code: &str, message: &str) -> Self {
        Self::new(ErrorKind::TooManyRequests, code, message)
    }

    pub fn internal_server_error(message: &str) -> Self {
        Self::new(ErrorKind::InternalServerError, "INTERNAL_ERROR", message)
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::InternalServerError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn to_response_data(&self) -> ApiErrorResponse {
        ApiErrorResponse {
            error: ApiErrorInfo {
                code: self.code.clone(),
                message: self.message.clone(),
                details: self.details.clone(),
            },
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.kind == ErrorKind::InternalServerError {
            tracing::error!(code = %self.code, details = ?self.details, "{}", self.message);
        }
        let status = self.status_code();
        let response_data = self.to_response_data();
        (status, Json(response_data)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal_server_error(&format!(
            "An unexpected error occurred: {}",
            err
        ))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request_with_details(
            "INVALID_BODY",
            "Invalid request body",
            &rejection.body_text(),
        )
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request_with_details(
            "INVALID_QUERY_PARAMS",
            "Invalid query parameters provided",
            &rejection.body_text(),
        )
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request_with_details(
            "INVALID_PATH",
            "Invalid path parameter",
            &rejection.body_text(),
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Drives `work` on its own task so that a dropped client connection cannot
/// cancel it halfway through a commit or the cache invalidation after it.
pub async fn run_detached<F, T>(work: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(work).await.map_err(|e| {
        AppError::internal_server_error("request task failed")
            .with_details(e.to_string())
    })?
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    #[test]
    fn kinds_map_to_status_codes() {
        assert_eq!(
            AppError::too_many_requests("TOO_MANY_ATTEMPTS", "slow down")
                .status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::unauthorized("INVALID_CREDENTIALS", "no").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::forbidden("FORBIDDEN", "no").status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn response_body_has_error_envelope() {
        let response = AppError::not_found("ITEM_NOT_FOUND", "missing")
            .with_details("id 7")
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "ITEM_NOT_FOUND");
        assert_eq!(json["error"]["details"], "id 7");
    }

    #[tokio::test]
    async fn detached_work_runs_to_completion() {
        let value = run_detached(async { Ok::<_, AppError>(42) }).await;
        assert_eq!(value.unwrap(), 42);
    }
}
