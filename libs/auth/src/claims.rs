use serde::{Deserialize, Serialize};
use user_models::{Role, User};

/// Token payload. `exp` is a unix timestamp in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub phone_number: String,
    pub role: Role,
    #[serde(default)]
    pub name: String,
    pub exp: i64,
}

impl Claims {
    pub fn for_user(user: &User, exp: i64) -> Self {
        Self {
            username: user.username.clone(),
            phone_number: user.phone_number.clone(),
            role: user.role,
            name: user.name.clone(),
            exp,
        }
    }

    pub fn is_owner(&self) -> bool { self.role == Role::Owner }
}
