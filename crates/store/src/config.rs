// SPDX-License-Identifier: MIT

//! Connection parameters for the durable store backend.

use std::time::Duration;

/// Parameters for connecting to the Redis-backed store. Built by the daemon's
/// configuration loader from the `SCAN_STORE_*` environment variables (see
/// `scan-daemon::config`); exposed here so both the daemon and `scanctl`
/// construct a [`crate::redis_store::RedisStore`] identically.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: i64,
    pub pool_size: usize,
    pub dial_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub retry_backoff_base: Duration,
    pub retry_max_attempts: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            password: None,
            db: 0,
            pool_size: 8,
            dial_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(5),
            retry_backoff_base: Duration::from_millis(100),
            retry_max_attempts: 5,
        }
    }
}

impl StoreConfig {
    /// Render as a `redis://[:password@]host:port/db` connection URL.
    pub fn connection_url(&self) -> String {
        match &self.password {
            Some(password) => {
                format!("redis://:{}@{}:{}/{}", password, self.host, self.port, self.db)
            }
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }
}
