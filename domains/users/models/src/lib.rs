use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use utoipa::ToSchema;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Client,
    Owner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Owner => "owner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Role::Client),
            "owner" => Ok(Role::Owner),
            other => Err(format!("unknown role `{other}`")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, TypedBuilder)]
pub struct User {
    #[builder(default)]
    pub id: i32,
    #[builder(setter(into))]
    pub username: String,
    #[builder(setter(into))]
    pub password_hash: String,
    #[builder(setter(into))]
    pub phone_number: String,
    #[builder(default)]
    pub role: Role,
    #[builder(default, setter(into))]
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub phone_number: String,
    pub role: Role,
    pub name: String,
}

impl NewUser {
    pub fn into_user(self, id: i32) -> User {
        User {
            id,
            username: self.username,
            password_hash: self.password_hash,
            phone_number: self.phone_number,
            role: self.role,
            name: self.name,
        }
    }
}
