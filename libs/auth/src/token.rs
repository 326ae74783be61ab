use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use user_models::User;

use crate::{AuthError, claims::Claims};

pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user: &User) -> Result<String, AuthError>;
    fn verify(&self, token: &str) -> Result<Claims, AuthError>;
}

pub type SharedTokenIssuer = Arc<dyn TokenIssuer>;

pub struct JwtTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtTokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        }
    }

    pub fn with_ttl_hours(secret: &[u8], hours: i64) -> Self {
        Self::new(secret, Duration::hours(hours))
    }

    pub fn ttl(&self) -> Duration { self.ttl }

    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)?)
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, user: &User) -> Result<String, AuthError> {
        let exp = (Utc::now() + self.ttl).timestamp();
        self.sign(&Claims::for_user(user, exp))
    }

    fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}
