use serde::{Deserialize, Serialize};
use user_errors::UserError;
use user_models::Role;
use utoipa::ToSchema;

pub const FORBIDDEN_USERNAME_CHARS: &[char] = &['<', '>', '"', '\'', ';', '&'];
const PHONE_CHARS: &str = "+0123456789";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterUserCommand {
    pub username: String,
    pub password: String,
    pub phone_number: String,
    #[serde(default)]
    pub name: String,
}

/// Account creation by an owner, who picks the role.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterByOwnerCommand {
    pub username: String,
    pub password: String,
    pub phone_number: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginCommand {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCommand")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Trims the username and rejects markup/SQL-ish characters.
pub fn sanitize_username(raw: &str) -> Result<String, UserError> {
    let username = raw.trim();
    let len = username.chars().count();
    if !(3..=50).contains(&len) {
        return Err(UserError::Validation(
            "username must be between 3 and 50 characters".into(),
        ));
    }
    if username.contains(FORBIDDEN_USERNAME_CHARS) {
        return Err(UserError::Validation(
            "username contains forbidden characters".into(),
        ));
    }
    Ok(username.to_string())
}

pub fn validate_password(password: &str) -> Result<(), UserError> {
    if password.chars().count() < 6 {
        return Err(UserError::Validation(
            "password must be at least 6 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<String, UserError> {
    let phone = phone.trim();
    if phone.is_empty()
        || phone.len() > 15
        || !phone.chars().all(|c| PHONE_CHARS.contains(c))
    {
        return Err(UserError::Validation(
            "phone number must be 1-15 characters of digits and '+'".into(),
        ));
    }
    Ok(phone.to_string())
}

fn validate_name(name: &str) -> Result<String, UserError> {
    let name = name.trim();
    if name.chars().count() > 100 {
        return Err(UserError::Validation(
            "name must be at most 100 characters".into(),
        ));
    }
    Ok(name.to_string())
}

/// Validated registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub phone_number: String,
    pub name: String,
    pub role: Role,
}

impl RegisterUserCommand {
    pub fn validate(&self) -> Result<Registration, UserError> {
        validate_password(&self.password)?;
        Ok(Registration {
            username: sanitize_username(&self.username)?,
            phone_number: validate_phone(&self.phone_number)?,
            name: validate_name(&self.name)?,
            role: Role::Client,
        })
    }
}

impl RegisterByOwnerCommand {
    pub fn validate(&self) -> Result<Registration, UserError> {
        validate_password(&self.password)?;
        Ok(Registration {
            username: sanitize_username(&self.username)?,
            phone_number: validate_phone(&self.phone_number)?,
            name: validate_name(&self.name)?,
            role: self.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames_are_trimmed() {
        assert_eq!(sanitize_username("  bob  ").unwrap(), "bob");
    }

    #[test]
    fn forbidden_characters_are_rejected() {
        for name in ["bob<", "a'b'c", "x;drop", "tom&jerry", "\"quoted\""] {
            assert!(sanitize_username(name).is_err(), "{name} accepted");
        }
    }

    #[test]
    fn length_bounds_apply_after_trim() {
        assert!(sanitize_username("  ab  ").is_err());
        assert!(sanitize_username(&"a".repeat(51)).is_err());
        assert!(sanitize_username(&"a".repeat(50)).is_ok());
    }

    #[test]
    fn phone_numbers_are_digits_and_plus() {
        assert_eq!(validate_phone(" +79990001122 ").unwrap(), "+79990001122");
        assert!(validate_phone("").is_err());
        assert!(validate_phone("555-0100").is_err());
        assert!(validate_phone("+1234567890123456").is_err());
    }

    #[test]
    fn client_registration_is_always_a_client() {
        let cmd = RegisterUserCommand {
            username: "alice".into(),
            password: "secret1".into(),
            phone_number: "+100".into(),
            name: " Alice ".into(),
        };
        let reg = cmd.validate().unwrap();
        assert_eq!(reg.role, Role::Client);
        assert_eq!(reg.name, "Alice");
    }

    #[test]
    fn short_password_is_rejected() {
        let cmd = RegisterByOwnerCommand {
            username: "carol".into(),
            password: "123".into(),
            phone_number: "+100".into(),
            name: String::new(),
            role: Role::Owner,
        };
        assert!(matches!(cmd.validate(), Err(UserError::Validation(_))));
    }
}
