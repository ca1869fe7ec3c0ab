// SPDX-License-Identifier: MIT

//! Production [`Store`] backed by Redis, via `redis::aio::ConnectionManager`
//! for automatic reconnection.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use tracing::instrument;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::traits::Store;

/// Moves every id in `KEYS[1]` (the scheduled ZSET) scored `<= ARGV[1]` to
/// the head of its priority list. Each job's priority tier is read out of
/// the JSON blob at `KEYS[2] .. id` via `cjson`, defaulting to `medium` if
/// the field is missing or the job record itself is gone (the id is still
/// drained from the scheduled set either way, matching the "stale id is
/// discarded" rule dequeue already applies to priority lists).
const PROMOTE_SCHEDULED_SCRIPT: &str = r#"
local scheduled_key = KEYS[1]
local job_key_prefix = ARGV[1]
local list_prefix = ARGV[2]
local now = tonumber(ARGV[3])

local due = redis.call('ZRANGEBYSCORE', scheduled_key, '-inf', now)
local moved = {}
for i, id in ipairs(due) do
    redis.call('ZREM', scheduled_key, id)
    local tier = 'medium'
    local blob = redis.call('GET', job_key_prefix .. id)
    if blob then
        local ok, decoded = pcall(cjson.decode, blob)
        if ok and decoded.priority then
            tier = decoded.priority
        end
    end
    redis.call('LPUSH', list_prefix .. tier, id)
    table.insert(moved, id)
end
return moved
"#;

/// `Store` implementor backed by a Redis logical database.
///
/// Holds `config.pool_size` independent [`ConnectionManager`]s, each already
/// reconnect-on-failure, and round-robins operations across them rather than
/// serializing every call through one multiplexed connection.
#[derive(Clone)]
pub struct RedisStore {
    conns: std::sync::Arc<Vec<ConnectionManager>>,
    next: std::sync::Arc<AtomicUsize>,
    promote_script: Script,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").field("pool_size", &self.conns.len()).finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Connect using the given configuration, establishing `pool_size`
    /// connection managers that transparently reconnect on transient
    /// failures.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = redis::Client::open(config.connection_url())
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let mut conns = Vec::with_capacity(config.pool_size.max(1));
        for _ in 0..config.pool_size.max(1) {
            let conn = client
                .get_connection_manager()
                .await
                .map_err(|e| StoreError::Connection(e.to_string()))?;
            conns.push(conn);
        }
        Ok(Self {
            conns: std::sync::Arc::new(conns),
            next: std::sync::Arc::new(AtomicUsize::new(0)),
            promote_script: Script::new(PROMOTE_SCHEDULED_SCRIPT),
        })
    }

    fn pick(&self) -> ConnectionManager {
        let i = self.next.fetch_add(1, Ordering::Relaxed) % self.conns.len();
        self.conns[i].clone()
    }
}

#[async_trait]
impl Store for RedisStore {
    #[instrument(level = "debug", skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.pick();
        Ok(conn.get(key).await?)
    }

    #[instrument(level = "debug", skip(self, value))]
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let mut conn = self.pick();
        match ttl {
            Some(ttl) => {
                let _: () = conn.set_ex(key, value, ttl.as_secs().max(1)).await?;
            }
            None => {
                let _: () = conn.set(key, value).await?;
            }
        }
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.pick();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn lpush(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.pick();
        let _: () = conn.lpush(key, value).await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn brpop(&self, key: &str, timeout: Duration) -> Result<Option<String>, StoreError> {
        let mut conn = self.pick();
        let result: Option<(String, String)> =
            conn.brpop(key, timeout.as_secs_f64().max(0.001)).await?;
        Ok(result.map(|(_key, value)| value))
    }

    #[instrument(level = "debug", skip(self))]
    async fn brpop_first_nonempty(
        &self,
        keys: &[String],
        timeout: Duration,
    ) -> Result<Option<String>, StoreError> {
        let mut conn = self.pick();
        let result: Option<(String, String)> =
            conn.brpop(keys.to_vec(), timeout.as_secs_f64().max(0.001)).await?;
        Ok(result.map(|(_key, value)| value))
    }

    async fn llen(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.pick();
        Ok(conn.llen(key).await?)
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError> {
        let mut conn = self.pick();
        let _: () = conn.zadd(key, member, score).await?;
        Ok(())
    }

    async fn zrangebyscore(&self, key: &str, min: f64, max: f64) -> Result<Vec<String>, StoreError> {
        let mut conn = self.pick();
        Ok(conn.zrangebyscore(key, min, max).await?)
    }

    async fn zrem(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let mut conn = self.pick();
        let removed: i64 = conn.zrem(key, member).await?;
        Ok(removed > 0)
    }

    async fn lrem(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.pick();
        let _: () = conn.lrem(key, 0, value).await?;
        Ok(())
    }

    async fn zcard(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.pick();
        Ok(conn.zcard(key).await?)
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.pick();
        let _: () = conn.hset(key, field, value).await?;
        Ok(())
    }

    async fn hincrby(&self, key: &str, field: &str, delta: i64) -> Result<i64, StoreError> {
        let mut conn = self.pick();
        Ok(conn.hincr(key, field, delta).await?)
    }

    async fn hgetall(&self, key: &str) -> Result<Vec<(String, String)>, StoreError> {
        let mut conn = self.pick();
        let map: std::collections::HashMap<String, String> = conn.hgetall(key).await?;
        Ok(map.into_iter().collect())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.pick();
        Ok(conn.keys(pattern).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.pick();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn promote_scheduled(
        &self,
        scheduled_key: &str,
        job_key_prefix: &str,
        priority_list_prefix: &str,
        now_score: f64,
    ) -> Result<Vec<String>, StoreError> {
        let mut conn = self.pick();
        let moved: Vec<String> = self
            .promote_script
            .key(scheduled_key)
            .arg(job_key_prefix)
            .arg(priority_list_prefix)
            .arg(now_score)
            .invoke_async(&mut conn)
            .await?;
        Ok(moved)
    }
}
