// SPDX-License-Identifier: MIT

//! In-process [`Store`] implementor for unit tests and the single-binary
//! deployment mode, guarded by a `parking_lot::Mutex` rather than Redis.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::StoreError;
use crate::traits::Store;

#[derive(Debug, Default)]
struct Inner {
    values: HashMap<String, (String, Option<std::time::Instant>)>,
    lists: HashMap<String, VecDeque<String>>,
    sorted_sets: HashMap<String, Vec<(String, f64)>>,
    hashes: HashMap<String, HashMap<String, String>>,
}

impl Inner {
    fn get_live(&mut self, key: &str) -> Option<String> {
        match self.values.get(key) {
            Some((_, Some(expiry))) if *expiry <= std::time::Instant::now() => {
                self.values.remove(key);
                None
            }
            Some((value, _)) => Some(value.clone()),
            None => None,
        }
    }
}

/// `Store` implementor holding all state in memory. Blocking pop is
/// approximated by a short poll loop instead of a true condvar wakeup,
/// which is adequate for the sub-second windows this store's callers use.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: std::sync::Arc<Mutex<Inner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.inner.lock().get_live(key))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let expiry = ttl.map(|d| std::time::Instant::now() + d);
        self.inner.lock().values.insert(key.to_string(), (value.to_string(), expiry));
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), StoreError> {
        self.inner.lock().values.remove(key);
        Ok(())
    }

    async fn lpush(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.lock().lists.entry(key.to_string()).or_default().push_front(value.to_string());
        Ok(())
    }

    async fn brpop(&self, key: &str, timeout: Duration) -> Result<Option<String>, StoreError> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            if let Some(value) = self.inner.lock().lists.get_mut(key).and_then(|l| l.pop_back()) {
                return Ok(Some(value));
            }
            if std::time::Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(Duration::from_millis(10).min(timeout)).await;
        }
    }

    async fn brpop_first_nonempty(
        &self,
        keys: &[String],
        timeout: Duration,
    ) -> Result<Option<String>, StoreError> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            {
                let mut inner = self.inner.lock();
                for key in keys {
                    if let Some(value) = inner.lists.get_mut(key).and_then(|l| l.pop_back()) {
                        return Ok(Some(value));
                    }
                }
            }
            if std::time::Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(Duration::from_millis(10).min(timeout)).await;
        }
    }

    async fn llen(&self, key: &str) -> Result<u64, StoreError> {
        Ok(self.inner.lock().lists.get(key).map(|l| l.len() as u64).unwrap_or(0))
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let set = inner.sorted_sets.entry(key.to_string()).or_default();
        set.retain(|(m, _)| m != member);
        set.push((member.to_string(), score));
        Ok(())
    }

    async fn zrangebyscore(&self, key: &str, min: f64, max: f64) -> Result<Vec<String>, StoreError> {
        let mut inner = self.inner.lock();
        let set = inner.sorted_sets.entry(key.to_string()).or_default();
        let mut matches: Vec<(String, f64)> =
            set.iter().filter(|(_, s)| *s >= min && *s <= max).cloned().collect();
        matches.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        Ok(matches.into_iter().map(|(m, _)| m).collect())
    }

    async fn zrem(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock();
        let Some(set) = inner.sorted_sets.get_mut(key) else {
            return Ok(false);
        };
        let before = set.len();
        set.retain(|(m, _)| m != member);
        Ok(set.len() < before)
    }

    async fn lrem(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(list) = self.inner.lock().lists.get_mut(key) {
            if let Some(pos) = list.iter().position(|v| v == value) {
                list.remove(pos);
            }
        }
        Ok(())
    }

    async fn zcard(&self, key: &str) -> Result<u64, StoreError> {
        Ok(self.inner.lock().sorted_sets.get(key).map(|s| s.len() as u64).unwrap_or(0))
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        self.inner
            .lock()
            .hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn hincrby(&self, key: &str, field: &str, delta: i64) -> Result<i64, StoreError> {
        let mut inner = self.inner.lock();
        let hash = inner.hashes.entry(key.to_string()).or_default();
        let entry = hash.entry(field.to_string()).or_insert_with(|| "0".to_string());
        let current: i64 = entry.parse().unwrap_or(0);
        let next = current + delta;
        *entry = next.to_string();
        Ok(next)
    }

    async fn hgetall(&self, key: &str) -> Result<Vec<(String, String)>, StoreError> {
        Ok(self
            .inner
            .lock()
            .hashes
            .get(key)
            .map(|h| h.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock();
        let matcher = glob_to_prefix_suffix(pattern);
        Ok(inner.values.keys().filter(|k| matcher(k)).cloned().collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn promote_scheduled(
        &self,
        scheduled_key: &str,
        job_key_prefix: &str,
        priority_list_prefix: &str,
        now_score: f64,
    ) -> Result<Vec<String>, StoreError> {
        let mut inner = self.inner.lock();
        let set = inner.sorted_sets.entry(scheduled_key.to_string()).or_default();
        let mut due: Vec<(String, f64)> = set.iter().filter(|(_, s)| *s <= now_score).cloned().collect();
        due.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        set.retain(|(_, s)| *s > now_score);

        let mut moved = Vec::with_capacity(due.len());
        for (id, _) in due {
            let tier = inner
                .values
                .get(&format!("{job_key_prefix}{id}"))
                .and_then(|(blob, _)| serde_json::from_str::<serde_json::Value>(blob).ok())
                .and_then(|v| v.get("priority").and_then(|p| p.as_str().map(str::to_string)))
                .unwrap_or_else(|| "medium".to_string());
            inner
                .lists
                .entry(format!("{priority_list_prefix}{tier}"))
                .or_default()
                .push_front(id.clone());
            moved.push(id);
        }
        Ok(moved)
    }
}

/// Minimal glob matcher sufficient for the store's own `prefix*`/`*suffix`/
/// `*mid*` patterns; not a general glob implementation.
fn glob_to_prefix_suffix(pattern: &str) -> Box<dyn Fn(&str) -> bool + Send + Sync> {
    if let Some(stripped) = pattern.strip_suffix('*') {
        let prefix = stripped.to_string();
        Box::new(move |s: &str| s.starts_with(&prefix))
    } else if let Some(stripped) = pattern.strip_prefix('*') {
        let suffix = stripped.to_string();
        Box::new(move |s: &str| s.ends_with(&suffix))
    } else {
        let exact = pattern.to_string();
        Box::new(move |s: &str| s == exact)
    }
}
