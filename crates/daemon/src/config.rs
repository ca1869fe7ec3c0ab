// SPDX-License-Identifier: MIT

//! Centralized environment variable access (§6's "Environment configuration
//! (enumerated)" table), mirroring the job-orchestration lineage's own
//! `daemon::env` module: plain `std::env::var` lookups with
//! `.ok().and_then(parse).unwrap_or(default)`, one function per setting, no
//! hidden global — callers build one owned [`Config`] at startup and thread
//! it through constructors.

use std::time::Duration;

use scan_core::ResourceCaps;
use scan_queue::QueueConfig;
use scan_store::StoreConfig;
use scan_worker::{WorkerConfig, WorkerPoolConfig};

/// Build version, for `scanctl health` and startup logs.
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH"));

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

fn env_duration_ms(key: &str) -> Option<Duration> {
    env_parsed::<u64>(key).map(Duration::from_millis)
}

/// `SCAN_STORE_HOST` (default `127.0.0.1`).
pub fn store_host() -> String {
    env_string("SCAN_STORE_HOST").unwrap_or_else(|| "127.0.0.1".to_string())
}

/// `SCAN_STORE_PORT` (default `6379`).
pub fn store_port() -> u16 {
    env_parsed("SCAN_STORE_PORT").unwrap_or(6379)
}

/// `SCAN_STORE_PASSWORD`, unset means no auth.
pub fn store_password() -> Option<String> {
    env_string("SCAN_STORE_PASSWORD")
}

/// `SCAN_STORE_DB` (default `0`).
pub fn store_db() -> i64 {
    env_parsed("SCAN_STORE_DB").unwrap_or(0)
}

/// `SCAN_STORE_POOL_SIZE` (default `8`).
pub fn store_pool_size() -> usize {
    env_parsed("SCAN_STORE_POOL_SIZE").unwrap_or(8)
}

/// Whether to use the in-process store instead of Redis. Set by
/// `--role`/`SCAN_STORE_BACKEND=memory`; primarily for the single-binary
/// all-in-one deployment mode and local development.
pub fn store_backend_is_memory() -> bool {
    env_string("SCAN_STORE_BACKEND").as_deref() == Some("memory")
}

pub fn store_config() -> StoreConfig {
    StoreConfig {
        host: store_host(),
        port: store_port(),
        password: store_password(),
        db: store_db(),
        pool_size: store_pool_size(),
        ..StoreConfig::default()
    }
}

/// `SCAN_QUEUE_NAME` (default `scan`).
pub fn queue_name() -> String {
    env_string("SCAN_QUEUE_NAME").unwrap_or_else(|| "scan".to_string())
}

/// `SCAN_QUEUE_MAX_CONCURRENCY`; informational cap surfaced to the pool
/// sizing below, not enforced by the queue itself.
pub fn queue_max_concurrency() -> usize {
    env_parsed("SCAN_QUEUE_MAX_CONCURRENCY").unwrap_or(4)
}

/// `SCAN_QUEUE_DEFAULT_TIMEOUT_MS` (default 10 minutes).
pub fn queue_default_timeout() -> Duration {
    env_duration_ms("SCAN_QUEUE_DEFAULT_TIMEOUT_MS").unwrap_or(Duration::from_secs(600))
}

/// `SCAN_QUEUE_RETRY_DELAY_MS` (default 30s).
pub fn queue_retry_delay() -> Duration {
    env_duration_ms("SCAN_QUEUE_RETRY_DELAY_MS").unwrap_or(Duration::from_secs(30))
}

/// `SCAN_QUEUE_CLEANUP_INTERVAL_MS` (default 1 hour).
pub fn queue_cleanup_interval() -> Duration {
    env_duration_ms("SCAN_QUEUE_CLEANUP_INTERVAL_MS").unwrap_or(Duration::from_secs(3600))
}

pub fn queue_config() -> QueueConfig {
    QueueConfig {
        default_timeout: queue_default_timeout(),
        retry_delay: queue_retry_delay(),
        cleanup_interval: queue_cleanup_interval(),
        ..QueueConfig::new(queue_name())
    }
}

/// `SCAN_WORKER_CONCURRENCY` (default `4`).
pub fn worker_concurrency() -> usize {
    env_parsed("SCAN_WORKER_CONCURRENCY").unwrap_or(4)
}

/// `SCAN_WORKER_POLL_INTERVAL_MS` (default 200ms).
pub fn worker_poll_interval() -> Duration {
    env_duration_ms("SCAN_WORKER_POLL_INTERVAL_MS").unwrap_or(Duration::from_millis(200))
}

/// `SCAN_WORKER_SHUTDOWN_TIMEOUT_MS` (default 30s).
pub fn worker_shutdown_timeout() -> Duration {
    env_duration_ms("SCAN_WORKER_SHUTDOWN_TIMEOUT_MS").unwrap_or(Duration::from_secs(30))
}

/// `SCAN_POOL_NUM_WORKERS` (default `1`).
pub fn pool_num_workers() -> usize {
    env_parsed("SCAN_POOL_NUM_WORKERS").unwrap_or(1)
}

/// `SCAN_POOL_SHUTDOWN_TIMEOUT_MS` (default 60s).
pub fn pool_shutdown_timeout() -> Duration {
    env_duration_ms("SCAN_POOL_SHUTDOWN_TIMEOUT_MS").unwrap_or(Duration::from_secs(60))
}

pub fn worker_pool_config() -> WorkerPoolConfig {
    WorkerPoolConfig {
        num_workers: pool_num_workers(),
        shutdown_timeout: pool_shutdown_timeout(),
        worker: WorkerConfig {
            concurrency: worker_concurrency(),
            poll_interval: worker_poll_interval(),
            shutdown_timeout: worker_shutdown_timeout(),
        },
    }
}

/// Per-agent resource cap / timeout override, read as
/// `SCAN_AGENT_<NAME>_IMAGE` / `_MEM_MB` / `_CPUS` / `_TIMEOUT_MS`, where
/// `<NAME>` is the agent's descriptor name upper-cased with `-` replaced by
/// `_` (e.g. `pattern-engine` → `PATTERN_ENGINE`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentOverride {
    pub image: Option<String>,
    pub resource_caps: Option<ResourceCaps>,
    pub timeout: Option<Duration>,
}

fn agent_env_prefix(agent_name: &str) -> String {
    format!("SCAN_AGENT_{}", agent_name.to_uppercase().replace('-', "_"))
}

pub fn agent_override(agent_name: &str) -> AgentOverride {
    let prefix = agent_env_prefix(agent_name);
    let image = env_string(&format!("{prefix}_IMAGE"));
    let mem_mb: Option<u32> = env_parsed(&format!("{prefix}_MEM_MB"));
    let cpus: Option<f64> = env_parsed(&format!("{prefix}_CPUS"));
    let resource_caps = match (mem_mb, cpus) {
        (None, None) => None,
        (mem, cpu) => Some(ResourceCaps::new(
            mem.unwrap_or(ResourceCaps::default().memory_mb),
            cpu.unwrap_or(ResourceCaps::default().cpu_cores),
        )),
    };
    let timeout = env_duration_ms(&format!("{prefix}_TIMEOUT_MS"));
    AgentOverride { image, resource_caps, timeout }
}

/// `SCAN_LOG_DIR`; when set, logs also go to a daily-rolling file there.
pub fn log_dir() -> Option<String> {
    env_string("SCAN_LOG_DIR")
}

/// `SCAN_DEAD_LETTER_ALERT_THRESHOLD`; dead-letter list length that trips
/// the alert dispatcher on the next `cleanup()` pass. Default `100`.
pub fn dead_letter_alert_threshold() -> u64 {
    env_parsed("SCAN_DEAD_LETTER_ALERT_THRESHOLD").unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn store_host_defaults_without_env() {
        std::env::remove_var("SCAN_STORE_HOST");
        assert_eq!(store_host(), "127.0.0.1");
    }

    #[test]
    #[serial]
    fn store_port_reads_env_override() {
        std::env::set_var("SCAN_STORE_PORT", "7000");
        assert_eq!(store_port(), 7000);
        std::env::remove_var("SCAN_STORE_PORT");
    }

    #[test]
    #[serial]
    fn malformed_port_falls_back_to_default() {
        std::env::set_var("SCAN_STORE_PORT", "not-a-number");
        assert_eq!(store_port(), 6379);
        std::env::remove_var("SCAN_STORE_PORT");
    }

    #[test]
    fn agent_env_prefix_upper_snakes_the_name() {
        assert_eq!(agent_env_prefix("pattern-engine"), "SCAN_AGENT_PATTERN_ENGINE");
    }

    #[test]
    #[serial]
    fn agent_override_combines_mem_and_cpu_into_resource_caps() {
        std::env::set_var("SCAN_AGENT_JS_LINT_MEM_MB", "2048");
        let over = agent_override("js-lint");
        assert_eq!(over.resource_caps, Some(ResourceCaps::new(2048, ResourceCaps::default().cpu_cores)));
        std::env::remove_var("SCAN_AGENT_JS_LINT_MEM_MB");
    }

    #[test]
    #[serial]
    fn agent_override_is_empty_without_any_env() {
        let over = agent_override("dast-prober");
        assert_eq!(over, AgentOverride::default());
    }
}
