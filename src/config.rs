//! Settings read from the environment (and `.env`, loaded by `main`).

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const DEV_SESSION_SECRET: &str = "dev-session-secret-change-me";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DatabaseConfig {
    /// A private SQLite database that lives as long as the pool does.
    ///
    /// The pool is pinned to one connection so every query sees the same
    /// in-memory database.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl: Duration,
    pub remember_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = match std::env::var("SESSION_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!(
                    "SESSION_SECRET is not set; using the development secret. \
                     Sessions can be forged until a real secret is configured."
                );
                DEV_SESSION_SECRET.to_string()
            }
        };

        Ok(Self {
            bind_addr: env_or("BIND_ADDR", "127.0.0.1:3000"),
            database: DatabaseConfig {
                url: env_or("DATABASE_URL", "sqlite://blog_list.db?mode=rwc"),
                max_connections: parse_env("DB_POOL_MAX", 10)?,
                min_connections: parse_env("DB_POOL_MIN", 1)?,
            },
            session: SessionConfig {
                secret,
                ttl: scaled("SESSION_TTL_MINUTES", parse_env("SESSION_TTL_MINUTES", 120)?, 60)?,
                remember_ttl: scaled(
                    "REMEMBER_TTL_DAYS",
                    parse_env("REMEMBER_TTL_DAYS", 30)?,
                    24 * 60 * 60,
                )?,
            },
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}

/// `count` units of `unit_secs` seconds. Cookie `Max-Age` is a signed
/// 64-bit count, so anything past `i64::MAX` seconds is rejected.
fn scaled(key: &'static str, count: u64, unit_secs: u64) -> Result<Duration, ConfigError> {
    count
        .checked_mul(unit_secs)
        .filter(|secs| i64::try_from(*secs).is_ok())
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::Invalid {
            key,
            value: count.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_falls_back_when_unset() {
        let value: u32 = parse_env("POEM_BLOG_TEST_UNSET_KEY", 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_scaled_converts_units() {
        let ttl = scaled("SESSION_TTL_MINUTES", 120, 60).unwrap();
        assert_eq!(ttl, Duration::from_secs(7200));
    }

    #[test]
    fn test_scaled_rejects_overflowing_ttl() {
        let err = scaled("REMEMBER_TTL_DAYS", u64::MAX / 10, 24 * 60 * 60).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key: "REMEMBER_TTL_DAYS", .. }
        ));
        assert!(scaled("SESSION_TTL_MINUTES", u64::MAX / 60, 60).is_err());
    }

    #[test]
    fn test_in_memory_pins_single_connection() {
        let config = DatabaseConfig::in_memory();
        assert_eq!(config.max_connections, 1);
        assert!(config.url.starts_with("sqlite:"));
    }
}
