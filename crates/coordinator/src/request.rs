// SPDX-License-Identifier: MIT

//! Deserializing a [`scan_core::Job`]'s payload into a [`ScanRequest`],
//! computing the per-scan deadline, and building each selected agent's
//! [`scan_agents::ScanConfig`].

use std::time::Duration;

use scan_agents::ScanConfig;
use scan_core::{AgentDescriptor, Job, ScanRequest};

use crate::error::CoordinatorError;

/// Deserialize `job.payload` into a [`ScanRequest`] (§3: the Job's payload
/// for scan jobs).
pub fn load_scan_request(job: &Job) -> Result<ScanRequest, CoordinatorError> {
    let value = serde_json::Value::Object(job.payload.clone().into_iter().collect());
    serde_json::from_value(value).map_err(|e| CoordinatorError::InvalidPayload(e.to_string()))
}

/// `deadline = min(job.timeout, request.timeout or unlimited)` (§4.4 step 1).
pub fn effective_deadline(job_timeout: Duration, request_timeout: Option<Duration>) -> Duration {
    match request_timeout {
        Some(requested) => job_timeout.min(requested),
        None => job_timeout,
    }
}

/// Build one agent's [`ScanConfig`] from the request, applying any
/// per-agent resource cap override and bounding the agent's own timeout by
/// both its descriptor default and the scan-wide deadline.
pub fn build_scan_config(request: &ScanRequest, descriptor: &AgentDescriptor, deadline: Duration) -> ScanConfig {
    let resource_caps =
        request.resource_caps.get(&descriptor.name).copied().unwrap_or(descriptor.resource_caps);

    let mut config = ScanConfig::new(request.repo_url.clone())
        .languages(request.languages.clone())
        .files(request.files.clone())
        .resource_caps(resource_caps)
        .timeout(deadline.min(descriptor.default_timeout));

    if let Some(git_ref) = &request.git_ref {
        config = config.git_ref(git_ref.clone());
    }
    if let Some(commit) = &request.commit {
        config = config.commit(commit.clone());
    }
    config
}
