// SPDX-License-Identifier: MIT

//! Per-worker observability counters.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WorkerStats {
    pub jobs_processed: u64,
    pub jobs_succeeded: u64,
    pub jobs_failed: u64,
    pub last_job_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
}

impl WorkerStats {
    pub(crate) fn record_success(&mut self, now: DateTime<Utc>) {
        self.jobs_processed += 1;
        self.jobs_succeeded += 1;
        self.last_job_at = Some(now);
    }

    pub(crate) fn record_failure(&mut self, now: DateTime<Utc>) {
        self.jobs_processed += 1;
        self.jobs_failed += 1;
        self.last_job_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_success_increments_processed_and_succeeded() {
        let mut stats = WorkerStats::default();
        stats.record_success(Utc::now());
        assert_eq!(stats.jobs_processed, 1);
        assert_eq!(stats.jobs_succeeded, 1);
        assert_eq!(stats.jobs_failed, 0);
    }

    #[test]
    fn record_failure_increments_processed_and_failed() {
        let mut stats = WorkerStats::default();
        stats.record_failure(Utc::now());
        assert_eq!(stats.jobs_processed, 1);
        assert_eq!(stats.jobs_failed, 1);
    }
}
