use std::{borrow::Cow, future::Future, marker::PhantomData, time::Duration};

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::core::{
    backend::CacheBackend,
    value::{CacheError, Json},
};

/// A single string-valued key holding a JSON-encoded `T`.
pub struct Normal<'cache, T> {
    backend: &'cache CacheBackend,
    key: Cow<'static, str>,
    __phantom: PhantomData<fn() -> T>,
}

impl<'cache, T> Normal<'cache, T> {
    pub fn new(backend: &'cache CacheBackend, key: Cow<'static, str>) -> Self {
        Self {
            backend,
            key,
            __phantom: PhantomData,
        }
    }

    pub fn key(&self) -> &str { &self.key }
}

impl<T> Normal<'_, T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub async fn try_get(&self) -> Result<Option<T>, CacheError> {
        match self.backend.get_bytes(&self.key).await? {
            Some(bytes) => Ok(Some(Json::<T>::decode(&bytes)?.inner())),
            None => Ok(None),
        }
    }

    pub async fn set_with_expire(
        &self, value: &T, ttl: Duration,
    ) -> Result<(), CacheError> {
        let bytes = Json::encode(value)?;
        self.backend.set_bytes(&self.key, bytes, ttl).await
    }

    pub async fn remove(&self) -> Result<u64, CacheError> {
        self.backend.delete(&[self.key.to_string()]).await
    }

    /// Read-through: a hit is returned without calling `loader`. A miss, a
    /// backend failure or an undecodable entry all fall through to `loader`,
    /// after which the result is cached for `ttl`. Cache failures never
    /// reach the caller; loader errors are returned unchanged and nothing is
    /// cached for them.
    pub async fn get_or_load<F, Fut, E>(
        &self, ttl: Duration, loader: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.try_get().await {
            Ok(Some(value)) => {
                debug!(cache.key = %self.key, "cache hit");
                return Ok(value);
            }
            Ok(None) => debug!(cache.key = %self.key, "cache miss"),
            Err(e) => {
                warn!(
                    cache.key = %self.key,
                    error = %e,
                    "cache read failed, falling back to store"
                );
            }
        }

        let value = loader().await?;

        if let Err(e) = self.set_with_expire(&value, ttl).await {
            warn!(cache.key = %self.key, error = %e, "cache population failed");
        }

        Ok(value)
    }
}
