// SPDX-License-Identifier: MIT

//! The [`Store`] capability: the minimum key/value + list + sorted-set + hash
//! surface the queue needs from a durable backend. The queue depends only on
//! this trait, never on `redis` directly, so unit tests can run against
//! [`crate::memory::InMemoryStore`] instead of a live Redis.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::StoreError;

/// A durable key/value + list + sorted-set + hash service: the system of
/// record for jobs, scheduled retries, and in-flight ownership.
#[async_trait]
pub trait Store: Send + Sync + std::fmt::Debug {
    /// Fetch the value stored at `key`, or `None` if absent/expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` at `key`, optionally expiring after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// Remove `key`. Not an error if it didn't exist.
    async fn del(&self, key: &str) -> Result<(), StoreError>;

    /// Prepend `value` onto the list at `key` (consumer pops from the tail).
    async fn lpush(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Pop the tail of the list at `key`, blocking up to `timeout` for an
    /// item to appear. Returns `None` on timeout, never blocks indefinitely.
    async fn brpop(&self, key: &str, timeout: Duration) -> Result<Option<String>, StoreError>;

    /// Length of the list at `key`.
    async fn llen(&self, key: &str) -> Result<u64, StoreError>;

    /// Pop the tail of the first non-empty list among `keys`, checked in
    /// order, blocking up to `timeout` total if all are empty. This is how
    /// the queue implements strict cross-tier priority in a single round
    /// trip instead of polling each tier separately.
    async fn brpop_first_nonempty(
        &self,
        keys: &[String],
        timeout: Duration,
    ) -> Result<Option<String>, StoreError>;

    /// Add `member` to the sorted set at `key` with the given `score`.
    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError>;

    /// Members of the sorted set at `key` with score in `[min, max]`, ascending.
    async fn zrangebyscore(&self, key: &str, min: f64, max: f64) -> Result<Vec<String>, StoreError>;

    /// Remove `member` from the sorted set at `key`. Returns whether it was
    /// present — callers use this as a compare-and-delete claim so two
    /// concurrent cleanups of the same id can't both win.
    async fn zrem(&self, key: &str, member: &str) -> Result<bool, StoreError>;

    /// Remove the first occurrence of `value` from the list at `key`.
    async fn lrem(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Cardinality of the sorted set at `key`.
    async fn zcard(&self, key: &str) -> Result<u64, StoreError>;

    /// Set field `field` of the hash at `key` to `value`.
    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError>;

    /// Increment field `field` of the hash at `key` by `delta`, returning the new value.
    async fn hincrby(&self, key: &str, field: &str, delta: i64) -> Result<i64, StoreError>;

    /// All fields and values of the hash at `key`.
    async fn hgetall(&self, key: &str) -> Result<Vec<(String, String)>, StoreError>;

    /// All keys matching `pattern` (glob-style). O(keys scanned); not for the hot path.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError>;

    /// Round-trip reachability check.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Atomically move every member of `scheduled_key` whose score is `<=
    /// now_score` to the head of its job's priority list, reading each job's
    /// priority tier from `job_key_prefix{id}` to pick the destination list
    /// among `priority_list_prefix{low,medium,high}`. Returns the ids moved.
    ///
    /// This is the one operation in the store's surface that must be atomic
    /// across multiple keys per §4.5/§9; backends that can't express that
    /// atomically (see [`crate::memory::InMemoryStore`]) serialize it behind
    /// a single lock instead.
    async fn promote_scheduled(
        &self,
        scheduled_key: &str,
        job_key_prefix: &str,
        priority_list_prefix: &str,
        now_score: f64,
    ) -> Result<Vec<String>, StoreError>;
}
