use std::ops::Deref;

use bytes::Bytes;
use deadpool_redis::{PoolError, redis::RedisError};
use serde::{Serialize, de::DeserializeOwned};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("redis command failed: {0}")]
    Redis(#[from] RedisError),
    #[error("redis pool unavailable: {0}")]
    Pool(#[from] PoolError),
    #[error("serialization failed: {0}")]
    Serialization(String),
    #[error("deserialization failed: {0}")]
    Deserialization(String),
    #[error("stored value is not an integer counter")]
    NotACounter,
    #[error("cache backend is disabled")]
    Disabled,
}

/// JSON codec used for every cached payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn inner(self) -> T { self.0 }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target { &self.0 }
}

impl<T> Json<T>
where
    T: Serialize,
{
    pub fn encode(value: &T) -> Result<Bytes, CacheError> {
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|e| CacheError::Serialization(e.to_string()))
    }
}

impl<T> Json<T>
where
    T: DeserializeOwned,
{
    pub fn decode(bytes: &[u8]) -> Result<Self, CacheError> {
        serde_json::from_slice(bytes)
            .map(Json)
            .map_err(|e| CacheError::Deserialization(e.to_string()))
    }
}
