// SPDX-License-Identifier: MIT

//! The durable priority queue: enqueue/dequeue/complete/fail/cancel/get/list
//! /stats/cleanup over any [`Store`] implementor.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use scan_core::{Clock, Job, JobStatus, Priority, Stats, SystemClock};
use scan_store::Store;
use tracing::instrument;

use crate::config::QueueConfig;
use crate::error::QueueError;
use crate::filter::ListFilter;
use crate::keys::Keys;

/// How long a single `dequeue()` call is willing to wait for a job across
/// all three priority tiers combined, matching the distilled spec's "≤1s"
/// blocking-pop window.
const DEQUEUE_BUDGET: Duration = Duration::from_secs(1);

/// A durable, priority-ordered FIFO queue backed by a [`Store`].
pub struct Queue {
    store: Arc<dyn Store>,
    config: QueueConfig,
    keys: Keys,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Queue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue").field("name", &self.config.name).finish_non_exhaustive()
    }
}

impl Queue {
    /// Construct a queue over `store` using the OS wall clock.
    pub fn new(store: Arc<dyn Store>, config: QueueConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    /// Construct a queue with an injected clock, for deterministic tests of
    /// scheduled-wake, retry-backoff, and lease-expiry behavior.
    pub fn with_clock(store: Arc<dyn Store>, config: QueueConfig, clock: Arc<dyn Clock>) -> Self {
        let keys = Keys::new(config.name.clone());
        Self { store, config, keys, clock }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    fn now(&self) -> chrono::DateTime<Utc> {
        self.clock.now()
    }

    async fn persist(&self, job: &Job) -> Result<(), QueueError> {
        let json = serde_json::to_string(job)?;
        self.store.set(&self.keys.job(job.id.as_str()), &json, Some(self.config.retention)).await?;
        Ok(())
    }

    async fn load(&self, job_id: &str) -> Result<Option<Job>, QueueError> {
        match self.store.get(&self.keys.job(job_id)).await? {
            Some(blob) => Ok(Some(serde_json::from_str(&blob)?)),
            None => Ok(None),
        }
    }

    async fn increment(&self, action: &str, type_tag: &str) -> Result<(), QueueError> {
        self.store.hincrby(&self.keys.stats(), &format!("{action}:{type_tag}"), 1).await?;
        Ok(())
    }

    /// Persist a new job and make it visible to dequeue, either immediately
    /// (onto its priority tier) or in the scheduled set if `scheduled_at` is
    /// in the future. Idempotent on repeat of the same job id unless that
    /// job has already reached a terminal state.
    #[instrument(level = "info", skip(self, job), fields(job_id = %job.id))]
    pub async fn enqueue(&self, mut job: Job) -> Result<Job, QueueError> {
        if job.type_tag.trim().is_empty() {
            return Err(QueueError::Validation("job type_tag must not be empty".to_string()));
        }

        if let Some(existing) = self.load(job.id.as_str()).await? {
            if existing.is_terminal() {
                return Err(QueueError::Validation(format!(
                    "job {} already exists in terminal state {}",
                    existing.id, existing.status
                )));
            }
            return Ok(existing);
        }

        let now = self.now();
        job.status = JobStatus::Queued;
        job.updated_at = now;

        // Boundary: scheduled_at in the past is equivalent to absent.
        match job.scheduled_at {
            Some(at) if at > now => {
                self.persist(&job).await?;
                self.store
                    .zadd(&self.keys.scheduled(), job.id.as_str(), at.timestamp() as f64)
                    .await?;
            }
            _ => {
                job.scheduled_at = None;
                self.persist(&job).await?;
                self.store.lpush(&self.keys.priority_list(job.priority), job.id.as_str()).await?;
            }
        }

        self.increment("enqueued", &job.type_tag).await?;
        Ok(job)
    }

    /// Move every scheduled job whose wake time has passed onto its
    /// priority tier. Idempotent and safe to call concurrently with
    /// `dequeue`/`cleanup` on other workers.
    pub async fn promote_scheduled(&self) -> Result<Vec<String>, QueueError> {
        let now = self.now().timestamp() as f64;
        Ok(self
            .store
            .promote_scheduled(
                &self.keys.scheduled(),
                &self.keys.job_prefix(),
                &self.keys.priority_list_prefix(),
                now,
            )
            .await?)
    }

    /// Lease the next ready job, trying High, Medium, then Low tiers in
    /// strict order. Blocks up to ~1s total; returns [`QueueError::NotFound`]
    /// if nothing is ready within that window.
    #[instrument(level = "debug", skip(self))]
    pub async fn dequeue(&self, worker_id: &str) -> Result<Job, QueueError> {
        self.promote_scheduled().await?;

        let tiers = [Priority::High, Priority::Medium, Priority::Low];
        let tier_keys: Vec<String> = tiers.iter().map(|t| self.keys.priority_list(*t)).collect();

        let deadline = std::time::Instant::now() + DEQUEUE_BUDGET;
        loop {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            if remaining.is_zero() {
                return Err(QueueError::NotFound("no job ready".to_string()));
            }

            let Some(job_id) = self.store.brpop_first_nonempty(&tier_keys, remaining).await? else {
                return Err(QueueError::NotFound("no job ready".to_string()));
            };

            let Some(mut job) = self.load(&job_id).await? else {
                tracing::debug!(job_id = %job_id, "discarding stale queue entry, no job record");
                continue;
            };

            let now = self.now();
            job.status = JobStatus::Running;
            job.started_at = Some(now);
            job.updated_at = now;
            job.metadata.worker_id = Some(worker_id.to_string());
            self.persist(&job).await?;

            let lease_at = now + chrono::Duration::from_std(job.metadata.timeout).unwrap_or_default();
            self.store.zadd(&self.keys.processing(), job.id.as_str(), lease_at.timestamp() as f64).await?;

            return Ok(job);
        }
    }

    /// Mark a leased job Completed and optionally persist its result.
    #[instrument(level = "info", skip(self, result))]
    pub async fn complete(
        &self,
        job_id: &str,
        result: Option<&scan_core::AgentResult>,
    ) -> Result<Job, QueueError> {
        let mut job =
            self.load(job_id).await?.ok_or_else(|| QueueError::NotFound(job_id.to_string()))?;
        if job.status != JobStatus::Running {
            return Err(QueueError::Validation(format!(
                "job {job_id} is not running (status={})",
                job.status
            )));
        }

        let now = self.now();
        job.status = JobStatus::Completed;
        job.completed_at = Some(now);
        job.updated_at = now;
        self.persist(&job).await?;
        self.store.zrem(&self.keys.processing(), job_id).await?;

        if let Some(result) = result {
            let json = serde_json::to_string(result)?;
            self.store.set(&self.keys.result(job_id), &json, Some(self.config.retention)).await?;
        }

        self.increment("completed", &job.type_tag).await?;
        Ok(job)
    }

    /// Record a handler failure: retries if budget remains, otherwise
    /// terminally fails the job onto the dead-letter list.
    #[instrument(level = "info", skip(self))]
    pub async fn fail(&self, job_id: &str, error_msg: &str) -> Result<Job, QueueError> {
        let mut job =
            self.load(job_id).await?.ok_or_else(|| QueueError::NotFound(job_id.to_string()))?;
        if !matches!(job.status, JobStatus::Running | JobStatus::Retrying) {
            return Err(QueueError::Validation(format!(
                "job {job_id} is not running or retrying (status={})",
                job.status
            )));
        }

        let now = self.now();
        job.metadata.retry_count += 1;
        job.metadata.last_error_message = Some(error_msg.to_string());
        job.updated_at = now;

        if job.metadata.retry_count <= job.metadata.max_retries {
            job.status = JobStatus::Retrying;
            let wake_at = now + chrono::Duration::from_std(job.metadata.retry_delay).unwrap_or_default();
            job.scheduled_at = Some(wake_at);
            self.persist(&job).await?;
            self.store.zadd(&self.keys.scheduled(), job_id, wake_at.timestamp() as f64).await?;
            self.increment("retried", &job.type_tag).await?;
        } else {
            job.status = JobStatus::Failed;
            job.completed_at = Some(now);
            self.persist(&job).await?;
            self.store.lpush(&self.keys.dead(), job_id).await?;
            self.increment("failed", &job.type_tag).await?;
        }

        self.store.zrem(&self.keys.processing(), job_id).await?;
        Ok(job)
    }

    /// Cancel a job before it has been leased. Fails Validation once a
    /// worker owns it.
    #[instrument(level = "info", skip(self))]
    pub async fn cancel(&self, job_id: &str) -> Result<Job, QueueError> {
        let mut job =
            self.load(job_id).await?.ok_or_else(|| QueueError::NotFound(job_id.to_string()))?;
        let cancellable = job.status == JobStatus::Queued || job.scheduled_at.is_some();
        if !cancellable {
            return Err(QueueError::Validation(format!(
                "job {job_id} has already been leased (status={})",
                job.status
            )));
        }

        let now = self.now();
        job.status = JobStatus::Cancelled;
        job.completed_at = Some(now);
        job.updated_at = now;
        job.scheduled_at = None;
        self.persist(&job).await?;

        for priority in [Priority::High, Priority::Medium, Priority::Low] {
            self.store.lrem(&self.keys.priority_list(priority), job_id).await?;
        }
        self.store.zrem(&self.keys.scheduled(), job_id).await?;
        self.store.zrem(&self.keys.processing(), job_id).await?;

        Ok(job)
    }

    /// Fetch a snapshot of a job by id.
    pub async fn get(&self, job_id: &str) -> Result<Job, QueueError> {
        self.load(job_id).await?.ok_or_else(|| QueueError::NotFound(job_id.to_string()))
    }

    /// Scan and filter jobs. O(keys scanned); not on the hot path.
    pub async fn list(
        &self,
        filter: &ListFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Job>, QueueError> {
        let pattern = format!("{}*", self.keys.job_prefix());
        let mut ids = self.store.keys(&pattern).await?;
        ids.truncate(self.config.max_list_scan);

        let mut jobs = Vec::with_capacity(ids.len());
        for key in ids {
            if let Some(blob) = self.store.get(&key).await? {
                if let Ok(job) = serde_json::from_str::<Job>(&blob) {
                    if filter.matches(&job) {
                        jobs.push(job);
                    }
                }
            }
        }
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs.into_iter().skip(offset).take(limit).collect())
    }

    /// Per-priority queue lengths, in-flight/scheduled/dead-letter counts,
    /// and monotonic `<action>:<type>` counters.
    pub async fn stats(&self) -> Result<Stats, QueueError> {
        let mut priority_lengths = HashMap::new();
        for priority in [Priority::High, Priority::Medium, Priority::Low] {
            let len = self.store.llen(&self.keys.priority_list(priority)).await?;
            priority_lengths.insert(crate::keys::priority_tier(priority).to_string(), len);
        }

        let in_flight = self.store.zcard(&self.keys.processing()).await?;
        let scheduled = self.store.zcard(&self.keys.scheduled()).await?;
        let dead_letter = self.store.llen(&self.keys.dead()).await?;
        let counters = self
            .store
            .hgetall(&self.keys.stats())
            .await?
            .into_iter()
            .filter_map(|(field, value)| value.parse::<u64>().ok().map(|v| (field, v)))
            .collect();

        Ok(Stats { priority_lengths, in_flight, scheduled, dead_letter, counters })
    }

    /// Periodic maintenance: reclaim expired leases and promote due
    /// scheduled jobs. Idempotent and safe to run concurrently with
    /// `dequeue` and other workers' `cleanup` — each reclaim first claims the
    /// id out of the in-flight set via compare-and-delete so only one caller
    /// wins the race.
    #[instrument(level = "debug", skip(self))]
    pub async fn cleanup(&self) -> Result<usize, QueueError> {
        let now = self.now().timestamp() as f64;
        let expired = self.store.zrangebyscore(&self.keys.processing(), f64::NEG_INFINITY, now).await?;

        let mut reclaimed = 0;
        for job_id in expired {
            if !self.store.zrem(&self.keys.processing(), &job_id).await? {
                // another cleanup pass already claimed this id.
                continue;
            }
            // fail() also calls zrem on processing, which is now a harmless no-op.
            if self.fail(&job_id, "job timeout").await.is_ok() {
                reclaimed += 1;
            }
        }

        self.promote_scheduled().await?;
        Ok(reclaimed)
    }
}
