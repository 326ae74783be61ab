use std::sync::Arc;

use async_trait::async_trait;
use user_errors::UserError;
use user_models::{NewUser, User};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// `UserError::NameNotFound` when no such user exists.
    async fn find_by_username(&self, username: &str) -> Result<User, UserError>;

    /// `UserError::NameExists` when the username is taken.
    async fn create(&self, user: NewUser) -> Result<User, UserError>;
}

pub type SharedUserStore = Arc<dyn UserStore>;
