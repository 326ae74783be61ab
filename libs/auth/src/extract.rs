use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use common_errors::AppError;
use tracing::debug;

use crate::{AuthError, claims::Claims, token::SharedTokenIssuer};

/// Any authenticated principal.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

/// An authenticated principal with the `owner` role.
#[derive(Debug, Clone)]
pub struct OwnerUser(pub Claims);

fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    SharedTokenIssuer: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts, state: &S,
    ) -> Result<Self, Self::Rejection> {
        let issuer = SharedTokenIssuer::from_ref(state);
        let claims = issuer.verify(bearer_token(parts)?)?;
        Ok(AuthUser(claims))
    }
}

impl<S> FromRequestParts<S> for OwnerUser
where
    S: Send + Sync,
    SharedTokenIssuer: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts, state: &S,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if !claims.is_owner() {
            debug!(username = %claims.username, "owner access denied");
            return Err(AuthError::Forbidden.into());
        }
        Ok(OwnerUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{Request, StatusCode};
    use user_models::{Role, User};

    use super::*;
    use crate::token::{DEFAULT_TOKEN_TTL_HOURS, JwtTokenIssuer, TokenIssuer};

    fn issuer() -> SharedTokenIssuer {
        Arc::new(JwtTokenIssuer::with_ttl_hours(
            b"test-secret",
            DEFAULT_TOKEN_TTL_HOURS,
        ))
    }

    fn user(role: Role) -> User {
        User::builder()
            .username("sam")
            .password_hash("x")
            .phone_number("+200")
            .role(role)
            .build()
    }

    fn parts(authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let state = issuer();
        let err = AuthUser::from_request_parts(&mut parts(None), &state)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn client_token_cannot_pass_owner_gate() {
        let state = issuer();
        let token = state.issue(&user(Role::Client)).unwrap();
        let header = format!("Bearer {token}");

        let AuthUser(claims) =
            AuthUser::from_request_parts(&mut parts(Some(&header)), &state)
                .await
                .unwrap();
        assert_eq!(claims.username, "sam");

        let err =
            OwnerUser::from_request_parts(&mut parts(Some(&header)), &state)
                .await
                .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn owner_token_passes_owner_gate() {
        let state = issuer();
        let token = state.issue(&user(Role::Owner)).unwrap();
        let header = format!("Bearer {token}");

        let result =
            OwnerUser::from_request_parts(&mut parts(Some(&header)), &state)
                .await;
        assert!(result.is_ok());
    }
}
