use std::{env, str::FromStr};

use redis_connection::config::{CacheMode, MemoryConfig, RedisDbConfig};
use sql_connection::PostgresDbConfig;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_MAX_CONN: u32 = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value `{value}`")]
    Invalid { key: &'static str, value: String },
}

/// Credentials for the owner account created at startup when it does not
/// exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerBootstrap {
    pub username: String,
    pub password: String,
    pub phone_number: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub postgres: PostgresDbConfig,
    pub cache_mode: CacheMode,
    pub redis: RedisDbConfig,
    pub memory: MemoryConfig,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub owner: Option<OwnerBootstrap>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Only the database settings, for tools that do not serve requests.
    pub fn postgres_from_env() -> Result<PostgresDbConfig, ConfigError> {
        postgres_config(&|key: &str| {
            env::var(key).ok().filter(|v| !v.trim().is_empty())
        })
    }

    /// Reads every setting through `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let postgres = postgres_config(&get)?;

        let mut redis = RedisDbConfig::default();
        if let Some(addr) = get("REDIS_ADDR") {
            let (host, port) = split_addr(&addr)?;
            redis.host = host;
            redis.port = port;
        }
        if let Some(host) = get("REDIS_HOST") {
            redis.host = host;
        }
        redis.port = parse_or(&get, "REDIS_PORT", redis.port)?;
        redis.db = parse_or(&get, "REDIS_DB", redis.db)?;
        redis.password = get("REDIS_PASSWORD");

        let memory = MemoryConfig {
            capacity: parse_or(
                &get,
                "CACHE_CAPACITY",
                MemoryConfig::default().capacity,
            )?,
        };

        let owner = match (
            get("OWNER_USERNAME"),
            get("OWNER_PASSWORD"),
            get("OWNER_PHONE"),
        ) {
            (Some(username), Some(password), Some(phone_number)) => {
                Some(OwnerBootstrap {
                    username,
                    password,
                    phone_number,
                    name: get("OWNER_NAME").unwrap_or_default(),
                })
            }
            _ => None,
        };

        Ok(Self {
            port: parse_or(&get, "PORT", DEFAULT_PORT)?,
            postgres,
            cache_mode: parse_or(&get, "CACHE_BACKEND", CacheMode::Redis)?,
            redis,
            memory,
            jwt_secret: get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            token_ttl_hours: parse_or(
                &get,
                "TOKEN_TTL_HOURS",
                auth::DEFAULT_TOKEN_TTL_HOURS,
            )?,
            owner,
        })
    }
}

fn postgres_config<G>(get: &G) -> Result<PostgresDbConfig, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let mut postgres = match get("DATABASE_URL") {
        Some(uri) => {
            PostgresDbConfig {
                uri,
                max_conn: None,
                min_conn: None,
                logger: false,
            }
        }
        None => {
            PostgresDbConfig::from_parts(
                &get("DB_HOST").unwrap_or_else(|| "localhost".into()),
                parse_or(get, "DB_PORT", 5432)?,
                &get("DB_USER").unwrap_or_else(|| "postgres".into()),
                &get("DB_PASSWORD").unwrap_or_default(),
                &get("DB_NAME").unwrap_or_else(|| "postgres".into()),
            )
        }
    };
    postgres.max_conn = Some(parse_or(get, "DB_MAX_CONN", DEFAULT_DB_MAX_CONN)?);
    Ok(postgres)
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => {
            value.trim().parse().map_err(|_| ConfigError::Invalid { key, value })
        }
        None => Ok(default),
    }
}

fn split_addr(addr: &str) -> Result<(String, u16), ConfigError> {
    let invalid = || ConfigError::Invalid {
        key: "REDIS_ADDR",
        value: addr.to_owned(),
    };
    let (host, port) = addr.rsplit_once(':').ok_or_else(invalid)?;
    let port = port.parse().map_err(|_| invalid())?;
    if host.is_empty() {
        return Err(invalid());
    }
    Ok((host.to_owned(), port))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_need_only_a_secret() {
        let cfg = config(&[("JWT_SECRET", "s")]).unwrap();

        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.cache_mode, CacheMode::Redis);
        assert_eq!(cfg.redis.port, 6379);
        assert_eq!(cfg.token_ttl_hours, 24);
        assert!(cfg.owner.is_none());
        assert!(cfg.postgres.uri.contains("dbname='postgres'"));
    }

    #[test]
    fn missing_secret_is_an_error() {
        assert_eq!(
            config(&[]).unwrap_err(),
            ConfigError::Missing("JWT_SECRET")
        );
    }

    #[test]
    fn redis_addr_is_split_and_overridable() {
        let cfg = config(&[
            ("JWT_SECRET", "s"),
            ("REDIS_ADDR", "cache:6380"),
            ("REDIS_DB", "3"),
        ])
        .unwrap();
        assert_eq!((cfg.redis.host.as_str(), cfg.redis.port), ("cache", 6380));
        assert_eq!(cfg.redis.db, 3);

        let cfg = config(&[
            ("JWT_SECRET", "s"),
            ("REDIS_ADDR", "cache:6380"),
            ("REDIS_HOST", "other"),
        ])
        .unwrap();
        assert_eq!(cfg.redis.host, "other");
    }

    #[test]
    fn database_url_wins_over_parts() {
        let cfg = config(&[
            ("JWT_SECRET", "s"),
            ("DATABASE_URL", "postgresql://u@db/shop"),
            ("DB_HOST", "ignored"),
        ])
        .unwrap();

        assert_eq!(cfg.postgres.uri, "postgresql://u@db/shop");
    }

    #[test]
    fn malformed_values_are_reported() {
        let err = config(&[("JWT_SECRET", "s"), ("PORT", "eighty")]).unwrap_err();
        assert_eq!(err, ConfigError::Invalid {
            key: "PORT",
            value: "eighty".into(),
        });

        assert!(config(&[("JWT_SECRET", "s"), ("CACHE_BACKEND", "etcd")]).is_err());
        assert!(config(&[("JWT_SECRET", "s"), ("REDIS_ADDR", "nohost")]).is_err());
    }

    #[test]
    fn owner_needs_name_password_and_phone() {
        let cfg = config(&[
            ("JWT_SECRET", "s"),
            ("OWNER_USERNAME", "boss"),
            ("OWNER_PASSWORD", "hunter22"),
        ])
        .unwrap();
        assert!(cfg.owner.is_none());

        let cfg = config(&[
            ("JWT_SECRET", "s"),
            ("OWNER_USERNAME", "boss"),
            ("OWNER_PASSWORD", "hunter22"),
            ("OWNER_PHONE", "+79990001122"),
        ])
        .unwrap();
        let owner = cfg.owner.unwrap();
        assert_eq!(owner.username, "boss");
        assert_eq!(owner.phone_number, "+79990001122");
    }
}
