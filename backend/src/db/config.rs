//! Postgres connection configuration and environment variable handling.

use std::env;

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }

    /// Apply environment variables on top of `self`.
    ///
    /// - `DATABASE_URL` or `PG_DATABASE_URL`: connection string
    /// - `PG_POOL_MAX`, `PG_POOL_MIN`: pool bounds
    /// - `PG_CONN_TIMEOUT_SEC`, `PG_IDLE_TIMEOUT_SEC`: timeouts in seconds
    /// - `PG_MAX_RETRIES`, `PG_RETRY_DELAY_MS`: retry policy
    ///
    /// Unparseable numeric values keep the current setting.
    pub fn with_env_overrides(self) -> Self {
        let database_url = env::var("DATABASE_URL")
            .or_else(|_| env::var("PG_DATABASE_URL"))
            .unwrap_or(self.database_url);

        Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", self.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", self.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", self.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", self.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", self.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", self.retry_delay_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_url_uses_defaults() {
        let config = PostgresConfig::with_url("postgres://localhost/jalsutra");
        assert_eq!(config.database_url, "postgres://localhost/jalsutra");
        assert_eq!(config.max_pool_size, 10);
        assert_eq!(config.retry_delay_ms, 100);
    }
}
