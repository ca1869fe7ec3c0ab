// SPDX-License-Identifier: MIT

//! Filter criteria for [`crate::Queue::list`].

use chrono::{DateTime, Utc};
use scan_core::{JobStatus, Priority};

/// Criteria for `list()`. Every field is optional; `None` means "don't filter
/// on this".
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub type_tag: Option<String>,
    pub status: Option<JobStatus>,
    pub priority: Option<Priority>,
    /// Only jobs created at or after this instant.
    pub since: Option<DateTime<Utc>>,
    /// Only jobs created at or before this instant.
    pub until: Option<DateTime<Utc>>,
}

impl ListFilter {
    pub fn matches(&self, job: &scan_core::Job) -> bool {
        if let Some(type_tag) = &self.type_tag {
            if &job.type_tag != type_tag {
                return false;
            }
        }
        if let Some(status) = self.status {
            if job.status != status {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if job.priority != priority {
                return false;
            }
        }
        if let Some(since) = self.since {
            if job.created_at < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if job.created_at > until {
                return false;
            }
        }
        true
    }
}
