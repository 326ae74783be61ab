use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};

use crate::AuthError;

pub trait CredentialVerifier: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, AuthError>;
    /// `false` for a wrong password or an unparseable stored hash.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

pub type SharedCredentialVerifier = Arc<dyn CredentialVerifier>;

/// Argon2id with default parameters and a random salt per hash.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Verifier;

impl CredentialVerifier for Argon2Verifier {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = Argon2Verifier.hash("hunter22").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(Argon2Verifier.verify("hunter22", &hash));
        assert!(!Argon2Verifier.verify("hunter23", &hash));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!Argon2Verifier.verify("anything", "not-a-phc-string"));
    }
}
