// SPDX-License-Identifier: MIT

//! A thin alert dispatcher (§6's "[ADD] Alert dispatcher"): fires on a job
//! reaching terminal `Failed` after exhausting retries, and on the
//! dead-letter list crossing an operator-configured length.

use async_trait::async_trait;

/// One alertable event. Kept small and data-only so implementors don't need
/// to know about `scan-core`/`scan-queue` internals beyond a job id.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    JobFailedPermanently { job_id: String, error: String },
    DeadLetterThresholdExceeded { queue: String, length: u64, threshold: u64 },
}

impl Alert {
    fn summary(&self) -> String {
        match self {
            Alert::JobFailedPermanently { job_id, error } => {
                format!("job {job_id} failed permanently: {error}")
            }
            Alert::DeadLetterThresholdExceeded { queue, length, threshold } => {
                format!("queue {queue} dead-letter list at {length} (threshold {threshold})")
            }
        }
    }
}

/// Where alerts go. `fire` is expected to be best-effort: a failing alert
/// sink must never fail the caller's job-processing path.
#[async_trait]
pub trait Alerter: Send + Sync {
    async fn fire(&self, alert: Alert);
}

/// Default alerter: drops every alert. Used in tests and library contexts
/// that don't want desktop notifications.
#[derive(Debug, Default)]
pub struct NullAlerter;

#[async_trait]
impl Alerter for NullAlerter {
    async fn fire(&self, _alert: Alert) {}
}

/// Desktop notification alerter, matching the `notify-rust` dependency the
/// job-orchestration lineage already carries for its own user-facing
/// notifications.
#[derive(Debug, Default)]
pub struct DesktopAlerter;

#[async_trait]
impl Alerter for DesktopAlerter {
    async fn fire(&self, alert: Alert) {
        let summary = alert.summary();
        if let Err(err) =
            notify_rust::Notification::new().summary("scan-daemon").body(&summary).show()
        {
            tracing::warn!(error = %err, "failed to show desktop notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct RecordingAlerter {
        fired: Arc<Mutex<Vec<Alert>>>,
    }

    #[async_trait]
    impl Alerter for RecordingAlerter {
        async fn fire(&self, alert: Alert) {
            self.fired.lock().push(alert);
        }
    }

    #[tokio::test]
    async fn null_alerter_drops_everything() {
        let alerter = NullAlerter;
        alerter
            .fire(Alert::JobFailedPermanently { job_id: "job-1".to_string(), error: "boom".to_string() })
            .await;
    }

    #[tokio::test]
    async fn recording_alerter_observes_fired_alerts() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let alerter = RecordingAlerter { fired: fired.clone() };
        alerter
            .fire(Alert::DeadLetterThresholdExceeded {
                queue: "scan".to_string(),
                length: 150,
                threshold: 100,
            })
            .await;
        assert_eq!(fired.lock().len(), 1);
    }

    #[test]
    fn summary_mentions_job_id_and_error() {
        let alert = Alert::JobFailedPermanently { job_id: "job-42".to_string(), error: "timeout".to_string() };
        let summary = alert.summary();
        assert!(summary.contains("job-42"));
        assert!(summary.contains("timeout"));
    }
}
