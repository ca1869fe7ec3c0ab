// SPDX-License-Identifier: MIT

//! Job identity and the queue's unit-of-work state machine.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Globally unique identifier for a queued job.
    pub struct JobId("job-");
}

/// Scheduling priority. Only these three values are valid; queues are
/// partitioned by tier rather than ranked by an arbitrary numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low = 1,
    Medium = 5,
    High = 10,
}

impl Priority {
    pub fn weight(self) -> u8 {
        self as u8
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

crate::simple_display! {
    Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
    Retrying,
}

impl JobStatus {
    /// Whether this status ends the job's lifecycle (no further transitions).
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled)
    }
}

crate::simple_display! {
    JobStatus {
        Queued => "queued",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
        Retrying => "retrying",
    }
}

/// Retry/lease/attribution bookkeeping carried alongside a job's payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMetadata {
    #[serde(with = "crate::duration::nanos")]
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_count: u32,
    #[serde(with = "crate::duration::nanos")]
    pub retry_delay: Duration,
    pub last_error_message: Option<String>,
    /// Set while a worker holds the lease; cleared on release.
    pub worker_id: Option<String>,
    pub tags: Vec<String>,
}

impl Default for JobMetadata {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            max_retries: 3,
            retry_count: 0,
            retry_delay: Duration::from_secs(30),
            last_error_message: None,
            worker_id: None,
            tags: Vec::new(),
        }
    }
}

/// Construction-time configuration for a new job, consumed by [`JobBuilder`].
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub type_tag: String,
    pub priority: Priority,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub tags: Vec<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            type_tag: "scan".to_string(),
            priority: Priority::default(),
            timeout: Duration::from_secs(300),
            max_retries: 3,
            retry_delay: Duration::from_secs(30),
            tags: Vec::new(),
            scheduled_at: None,
        }
    }
}

/// The unit of work tracked by the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub type_tag: String,
    pub priority: Priority,
    pub status: JobStatus,
    pub payload: HashMap<String, serde_json::Value>,
    pub metadata: JobMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn builder() -> JobBuilder {
        JobBuilder::new()
    }

    /// Whether this job is eligible to sit in a priority tier right now
    /// (i.e. it is not scheduled for future execution).
    pub fn is_ready(&self, now: DateTime<Utc>) -> bool {
        match self.scheduled_at {
            Some(at) => at <= now,
            None => true,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Builds a [`Job`] from a [`JobConfig`] and a payload, stamping timestamps
/// from a supplied clock.
#[derive(Debug, Clone, Default)]
pub struct JobBuilder {
    config: JobConfig,
    payload: HashMap<String, serde_json::Value>,
}

impl JobBuilder {
    pub fn new() -> Self {
        Self { config: JobConfig::default(), payload: HashMap::new() }
    }

    pub fn type_tag(mut self, type_tag: impl Into<String>) -> Self {
        self.config.type_tag = type_tag.into();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.config.priority = priority;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.config.retry_delay = retry_delay;
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.config.tags = tags;
        self
    }

    pub fn scheduled_at(mut self, at: DateTime<Utc>) -> Self {
        self.config.scheduled_at = Some(at);
        self
    }

    pub fn payload_value(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    /// Replace the entire payload with a serialized value.
    pub fn payload(mut self, payload: impl Serialize) -> Result<Self, crate::error::CoreError> {
        let value = serde_json::to_value(payload)?;
        let serde_json::Value::Object(map) = value else {
            return Err(crate::error::CoreError::Validation(
                "payload must serialize to a JSON object".to_string(),
            ));
        };
        self.payload = map.into_iter().collect();
        Ok(self)
    }

    pub fn build(self, now: DateTime<Utc>) -> Job {
        Job {
            id: JobId::new(),
            type_tag: self.config.type_tag,
            priority: self.config.priority,
            status: JobStatus::Queued,
            payload: self.payload,
            metadata: JobMetadata {
                timeout: self.config.timeout,
                max_retries: self.config.max_retries,
                retry_delay: self.config.retry_delay,
                tags: self.config.tags,
                ..JobMetadata::default()
            },
            created_at: now,
            updated_at: now,
            scheduled_at: self.config.scheduled_at,
            started_at: None,
            completed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    fn epoch(seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(seconds, 0).unwrap()
    }

    #[test]
    fn builder_defaults_to_medium_priority_and_queued() {
        let job = Job::builder().build(epoch(0));
        assert_eq!(job.priority, Priority::Medium);
        assert_eq!(job.status, JobStatus::Queued);
        assert!(job.started_at.is_none());
        assert!(job.completed_at.is_none());
    }

    #[test]
    fn job_with_future_schedule_is_not_ready() {
        let job = Job::builder().scheduled_at(epoch(100)).build(epoch(0));
        assert!(!job.is_ready(epoch(0)));
        assert!(job.is_ready(epoch(100)));
        assert!(job.is_ready(epoch(200)));
    }

    #[test]
    fn job_with_no_schedule_is_always_ready() {
        let job = Job::builder().build(epoch(0));
        assert!(job.is_ready(epoch(0)));
    }

    #[parameterized(
        queued = { JobStatus::Queued, false },
        running = { JobStatus::Running, false },
        retrying = { JobStatus::Retrying, false },
        completed = { JobStatus::Completed, true },
        failed = { JobStatus::Failed, true },
        cancelled = { JobStatus::Cancelled, true },
    )]
    fn status_terminality(status: JobStatus, expected: bool) {
        assert_eq!(status.is_terminal(), expected);
    }

    #[test]
    fn priority_ordering_matches_weight() {
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }

    #[test]
    fn payload_helper_rejects_non_object() {
        let result = Job::builder().payload(42);
        assert!(result.is_err());
    }

    #[test]
    fn payload_helper_accepts_object() {
        #[derive(Serialize)]
        struct P {
            repo_url: String,
        }
        let job = Job::builder()
            .payload(P { repo_url: "https://example.com/r.git".to_string() })
            .unwrap()
            .build(epoch(0));
        assert_eq!(
            job.payload.get("repo_url").and_then(|v| v.as_str()),
            Some("https://example.com/r.git")
        );
    }
}
