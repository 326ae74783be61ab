use auth::{AuthError, SharedCredentialVerifier, SharedTokenIssuer};
use login_throttle::{LoginThrottle, ThrottleError};
use tracing::{info, instrument, warn};
use user_commands::{
    LoginCommand, RegisterByOwnerCommand, RegisterUserCommand, Registration,
    sanitize_username, validate_password,
};
use user_errors::UserError;
use user_models::{NewUser, User};
use user_responses::{
    RegisteredByOwnerResponse, RegisteredResponse, TokenResponse,
};
use user_store::SharedUserStore;

fn auth_error(err: AuthError) -> UserError {
    UserError::InternalError(err.to_string())
}

async fn create_user(
    users: &SharedUserStore, verifier: &SharedCredentialVerifier,
    registration: Registration, password: &str,
) -> Result<User, UserError> {
    let password_hash = verifier.hash(password).map_err(auth_error)?;
    users
        .create(NewUser {
            username: registration.username,
            password_hash,
            phone_number: registration.phone_number,
            role: registration.role,
            name: registration.name,
        })
        .await
}

/// Self-service sign-up. Always creates a client and logs them in.
#[derive(Clone)]
pub struct RegisterUserHandler {
    users: SharedUserStore,
    verifier: SharedCredentialVerifier,
    tokens: SharedTokenIssuer,
}

impl RegisterUserHandler {
    pub fn new(
        users: SharedUserStore, verifier: SharedCredentialVerifier,
        tokens: SharedTokenIssuer,
    ) -> Self {
        Self {
            users,
            verifier,
            tokens,
        }
    }

    #[instrument(skip_all, fields(username = %command.username))]
    pub async fn execute(
        &self, command: RegisterUserCommand,
    ) -> Result<RegisteredResponse, UserError> {
        let registration = command.validate()?;
        let user =
            create_user(&self.users, &self.verifier, registration, &command.password)
                .await?;
        let token = self.tokens.issue(&user).map_err(auth_error)?;

        info!(user.id = user.id, "user registered");
        Ok(RegisteredResponse {
            message: "User registered".to_string(),
            token,
        })
    }
}

/// Account creation by an owner, with any role.
#[derive(Clone)]
pub struct RegisterByOwnerHandler {
    users: SharedUserStore,
    verifier: SharedCredentialVerifier,
}

impl RegisterByOwnerHandler {
    pub fn new(users: SharedUserStore, verifier: SharedCredentialVerifier) -> Self {
        Self { users, verifier }
    }

    #[instrument(skip_all, fields(username = %command.username, role = %command.role))]
    pub async fn execute(
        &self, command: RegisterByOwnerCommand,
    ) -> Result<RegisteredByOwnerResponse, UserError> {
        let registration = command.validate()?;
        let user =
            create_user(&self.users, &self.verifier, registration, &command.password)
                .await?;

        info!(user.id = user.id, "user registered by owner");
        Ok(RegisteredByOwnerResponse {
            message: "User registered by owner".to_string(),
            user: user.into(),
        })
    }
}

#[derive(Clone)]
pub struct LoginHandler {
    users: SharedUserStore,
    verifier: SharedCredentialVerifier,
    tokens: SharedTokenIssuer,
    throttle: LoginThrottle,
}

impl LoginHandler {
    pub fn new(
        users: SharedUserStore, verifier: SharedCredentialVerifier,
        tokens: SharedTokenIssuer, throttle: LoginThrottle,
    ) -> Self {
        Self {
            users,
            verifier,
            tokens,
            throttle,
        }
    }

    /// Every attempt that gets past the throttle counts against the window,
    /// including the successful one, which then clears it.
    #[instrument(skip_all, fields(username = %command.username))]
    pub async fn execute(
        &self, command: LoginCommand,
    ) -> Result<TokenResponse, UserError> {
        let username = sanitize_username(&command.username)?;
        validate_password(&command.password)?;

        self.throttle
            .check_and_increment(&username)
            .await
            .map_err(|ThrottleError::Exceeded { attempts }| {
                warn!(attempts, "login throttled");
                UserError::TooManyAttempts
            })?;

        let user = match self.users.find_by_username(&username).await {
            Ok(user) => user,
            Err(UserError::NameNotFound { .. }) => {
                return Err(UserError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };
        if !self.verifier.verify(&command.password, &user.password_hash) {
            return Err(UserError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user).map_err(auth_error)?;
        self.throttle.reset(&username).await;

        Ok(TokenResponse { token })
    }
}
