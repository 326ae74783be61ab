use std::sync::Arc;

use auth::{OwnerUser, SharedCredentialVerifier, SharedTokenIssuer};
use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::Json,
};
use common_errors::{AppError, run_detached};
use login_throttle::LoginThrottle;
use redis_connection::core::CacheBackend;
use tracing::instrument;
use user_command_handlers::{
    LoginHandler, RegisterByOwnerHandler, RegisterUserHandler,
};
use user_commands::{LoginCommand, RegisterByOwnerCommand, RegisterUserCommand};
use user_responses::{
    RegisteredByOwnerResponse, RegisteredResponse, TokenResponse,
};
use user_store::SharedUserStore;

#[derive(Clone)]
pub struct UserServices {
    pub register: RegisterUserHandler,
    pub register_by_owner: RegisterByOwnerHandler,
    pub login: LoginHandler,

    pub tokens: SharedTokenIssuer,
}

impl UserServices {
    pub fn new(
        users: SharedUserStore, verifier: SharedCredentialVerifier,
        tokens: SharedTokenIssuer, cache: Arc<CacheBackend>,
    ) -> Self {
        Self {
            register: RegisterUserHandler::new(
                users.clone(),
                verifier.clone(),
                tokens.clone(),
            ),
            register_by_owner: RegisterByOwnerHandler::new(
                users.clone(),
                verifier.clone(),
            ),
            login: LoginHandler::new(
                users,
                verifier,
                tokens.clone(),
                LoginThrottle::new(cache),
            ),
            tokens,
        }
    }
}

impl FromRef<UserServices> for SharedTokenIssuer {
    fn from_ref(services: &UserServices) -> Self { services.tokens.clone() }
}

#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterUserCommand,
    responses(
        (status = 201, description = "Client registered and logged in", body = RegisteredResponse),
        (status = 400, description = "Invalid request data", body = common_errors::ApiErrorResponse),
        (status = 422, description = "Username already taken", body = common_errors::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = common_errors::ApiErrorResponse)
    ),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn register(
    State(services): State<UserServices>,
    Json(command): Json<RegisterUserCommand>,
) -> Result<(StatusCode, Json<RegisteredResponse>), AppError> {
    let handler = services.register.clone();
    let registered = run_detached(async move {
        handler.execute(command).await.map_err(AppError::from)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(registered)))
}

#[utoipa::path(
    post,
    path = "/admin/register",
    request_body = RegisterByOwnerCommand,
    responses(
        (status = 201, description = "Account created", body = RegisteredByOwnerResponse),
        (status = 400, description = "Invalid request data", body = common_errors::ApiErrorResponse),
        (status = 403, description = "Owner role required", body = common_errors::ApiErrorResponse),
        (status = 422, description = "Username already taken", body = common_errors::ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn register_by_owner(
    OwnerUser(owner): OwnerUser, State(services): State<UserServices>,
    Json(command): Json<RegisterByOwnerCommand>,
) -> Result<(StatusCode, Json<RegisteredByOwnerResponse>), AppError> {
    let handler = services.register_by_owner.clone();
    let registered = run_detached(async move {
        handler.execute(command).await.map_err(AppError::from)
    })
    .await?;

    tracing::info!(
        "Account {} created by {}",
        registered.user.username,
        owner.username
    );

    Ok((StatusCode::CREATED, Json(registered)))
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginCommand,
    responses(
        (status = 200, description = "Logged in", body = TokenResponse),
        (status = 400, description = "Invalid request data", body = common_errors::ApiErrorResponse),
        (status = 401, description = "Invalid credentials", body = common_errors::ApiErrorResponse),
        (status = 429, description = "Too many login attempts", body = common_errors::ApiErrorResponse)
    ),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn login(
    State(services): State<UserServices>, Json(command): Json<LoginCommand>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = services.login.execute(command).await?;

    Ok(Json(token))
}
