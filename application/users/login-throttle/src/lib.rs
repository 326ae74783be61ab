use std::{sync::Arc, time::Duration};

use redis_connection::{cache_key, core::{CacheBackend, CacheKey}};
use thiserror::Error;
use tracing::{instrument, warn};

pub const MAX_LOGIN_ATTEMPTS: i64 = 5;
pub const LOGIN_WINDOW: Duration = Duration::from_secs(3600);

cache_key!(LoginAttemptsKey::<i64> => "login_attempts:{}"[username: str]);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ThrottleError {
    #[error("too many login attempts ({attempts})")]
    Exceeded { attempts: i64 },
}

/// Fixed-window attempt counter per username. Backend failures count as
/// zero attempts, so an unavailable cache never locks anyone out.
#[derive(Clone)]
pub struct LoginThrottle {
    backend: Arc<CacheBackend>,
    max_attempts: i64,
    window: Duration,
}

impl LoginThrottle {
    pub fn new(backend: Arc<CacheBackend>) -> Self {
        Self::with_limits(backend, MAX_LOGIN_ATTEMPTS, LOGIN_WINDOW)
    }

    pub fn with_limits(
        backend: Arc<CacheBackend>, max_attempts: i64, window: Duration,
    ) -> Self {
        Self {
            backend,
            max_attempts,
            window,
        }
    }

    pub fn key(username: &str) -> String {
        LoginAttemptsKey.get_key_with_args((username,)).into_owned()
    }

    /// Rejects when the window is already full; otherwise records the
    /// attempt and returns the new count.
    #[instrument(skip(self))]
    pub async fn check_and_increment(
        &self, username: &str,
    ) -> Result<i64, ThrottleError> {
        let key = Self::key(username);

        let current = self.backend.get_counter(&key).await.unwrap_or_else(|e| {
            if !self.backend.is_disabled() {
                warn!(error = %e, "login counter read failed");
            }
            0
        });
        if current >= self.max_attempts {
            return Err(ThrottleError::Exceeded { attempts: current });
        }

        match self.backend.incr_with_expiry(&key, self.window).await {
            Ok(count) => Ok(count),
            Err(e) => {
                if !self.backend.is_disabled() {
                    warn!(error = %e, "login counter increment failed");
                }
                Ok(0)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn reset(&self, username: &str) {
        if let Err(e) = self.backend.delete(&[Self::key(username)]).await {
            warn!(error = %e, "login counter reset failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use redis_connection::{
        config::{MemoryConfig, RedisDbConfig},
        connect_redis_db,
    };

    use super::*;

    fn memory_throttle() -> LoginThrottle {
        LoginThrottle::new(Arc::new(CacheBackend::memory(
            MemoryConfig::default(),
        )))
    }

    #[test]
    fn key_format() {
        assert_eq!(LoginThrottle::key("alice"), "login_attempts:alice");
    }

    #[tokio::test]
    async fn sixth_attempt_in_window_is_rejected() {
        let throttle = memory_throttle();
        for expected in 1..=5 {
            assert_eq!(throttle.check_and_increment("alice").await, Ok(expected));
        }

        assert_eq!(
            throttle.check_and_increment("alice").await,
            Err(ThrottleError::Exceeded { attempts: 5 })
        );
        assert_eq!(throttle.check_and_increment("bob").await, Ok(1));
    }

    #[tokio::test]
    async fn reset_clears_the_window() {
        let throttle = memory_throttle();
        for _ in 0..5 {
            throttle.check_and_increment("alice").await.unwrap();
        }

        throttle.reset("alice").await;

        assert_eq!(throttle.check_and_increment("alice").await, Ok(1));
    }

    #[tokio::test]
    async fn window_expiry_unblocks() {
        let backend = Arc::new(CacheBackend::memory(MemoryConfig::default()));
        let throttle = LoginThrottle::with_limits(
            backend,
            2,
            Duration::from_millis(200),
        );
        throttle.check_and_increment("carol").await.unwrap();
        throttle.check_and_increment("carol").await.unwrap();
        assert!(throttle.check_and_increment("carol").await.is_err());

        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(throttle.check_and_increment("carol").await, Ok(1));
    }

    #[tokio::test]
    async fn unavailable_backends_degrade_open() {
        let disabled = LoginThrottle::new(Arc::new(CacheBackend::Disabled));
        for _ in 0..10 {
            assert!(disabled.check_and_increment("dave").await.is_ok());
        }

        let config = RedisDbConfig {
            port: 1,
            ..RedisDbConfig::default()
        };
        let pool = connect_redis_db(&config).await.unwrap();
        let unreachable = LoginThrottle::new(Arc::new(CacheBackend::Redis(pool)));
        for _ in 0..10 {
            assert_eq!(unreachable.check_and_increment("dave").await, Ok(0));
        }
        unreachable.reset("dave").await;
    }
}
