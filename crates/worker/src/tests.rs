// SPDX-License-Identifier: MIT

//! Worker and worker-pool dispatch scenarios, run against `InMemoryStore`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use scan_core::{AgentResult, Job, JobStatus, Priority};
use scan_queue::{Queue, QueueConfig};
use scan_store::InMemoryStore;
use tokio_util::sync::CancellationToken;

use crate::config::{WorkerConfig, WorkerPoolConfig};
use crate::handler::JobHandler;
use crate::pool::WorkerPool;
use crate::worker::Worker;

struct AlwaysSucceeds {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl JobHandler for AlwaysSucceeds {
    async fn handle(
        &self,
        _job: Job,
        _cancel: CancellationToken,
    ) -> Result<Option<AgentResult>, anyhow::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(AgentResult::completed("test-agent", Duration::from_millis(1), vec![])))
    }
}

struct AlwaysFails;

#[async_trait]
impl JobHandler for AlwaysFails {
    async fn handle(
        &self,
        _job: Job,
        _cancel: CancellationToken,
    ) -> Result<Option<AgentResult>, anyhow::Error> {
        Err(anyhow::anyhow!("handler always fails"))
    }
}

struct NeverReturns;

#[async_trait]
impl JobHandler for NeverReturns {
    async fn handle(
        &self,
        _job: Job,
        cancel: CancellationToken,
    ) -> Result<Option<AgentResult>, anyhow::Error> {
        cancel.cancelled().await;
        Err(anyhow::anyhow!("cancelled"))
    }
}

fn test_queue() -> Arc<Queue> {
    Arc::new(Queue::new(Arc::new(InMemoryStore::new()), QueueConfig::new("scan")))
}

#[tokio::test]
async fn worker_dispatches_registered_handler_and_completes_job() {
    let queue = test_queue();
    let calls = Arc::new(AtomicUsize::new(0));
    let worker = Worker::new(
        "w1",
        Arc::clone(&queue),
        WorkerConfig { poll_interval: Duration::from_millis(20), ..Default::default() },
    );
    worker.register_handler("scan", Arc::new(AlwaysSucceeds { calls: Arc::clone(&calls) }));

    let job = queue.enqueue(Job::builder().type_tag("scan").build(chrono::Utc::now())).await.unwrap();
    worker.start();

    wait_until(|| calls.load(Ordering::SeqCst) >= 1, Duration::from_secs(2)).await;
    worker.stop().await.unwrap();

    let finished = queue.get(job.id.as_str()).await.unwrap();
    assert_eq!(finished.status, JobStatus::Completed);
    assert_eq!(worker.stats().jobs_succeeded, 1);
}

#[tokio::test]
async fn worker_fails_job_when_handler_returns_error() {
    let queue = test_queue();
    let worker = Worker::new(
        "w1",
        Arc::clone(&queue),
        WorkerConfig { poll_interval: Duration::from_millis(20), ..Default::default() },
    );
    worker.register_handler("scan", Arc::new(AlwaysFails));

    let job = queue
        .enqueue(Job::builder().type_tag("scan").max_retries(0).build(chrono::Utc::now()))
        .await
        .unwrap();
    worker.start();

    wait_until_status(&queue, job.id.as_str(), JobStatus::Failed, Duration::from_secs(2)).await;
    worker.stop().await.unwrap();

    assert_eq!(worker.stats().jobs_failed, 1);
}

#[tokio::test]
async fn worker_fails_job_with_no_registered_handler() {
    let queue = test_queue();
    let worker = Worker::new(
        "w1",
        Arc::clone(&queue),
        WorkerConfig { poll_interval: Duration::from_millis(20), ..Default::default() },
    );

    let job = queue
        .enqueue(Job::builder().type_tag("unregistered").max_retries(0).build(chrono::Utc::now()))
        .await
        .unwrap();
    worker.start();

    wait_until_status(&queue, job.id.as_str(), JobStatus::Failed, Duration::from_secs(2)).await;
    worker.stop().await.unwrap();

    let finished = queue.get(job.id.as_str()).await.unwrap();
    assert!(finished.metadata.last_error_message.unwrap().contains("no handler"));
}

#[tokio::test]
async fn worker_stop_is_cooperative_and_idempotent() {
    let queue = test_queue();
    let worker = Worker::new("w1", queue, WorkerConfig::default());
    worker.start();
    assert!(worker.is_running());
    worker.stop().await.unwrap();
    assert!(!worker.is_running());
    // Second stop is a no-op, not an error.
    worker.stop().await.unwrap();
}

#[tokio::test]
async fn worker_pool_registers_handler_on_every_worker_and_drains_jobs() {
    let queue = test_queue();
    let calls = Arc::new(AtomicUsize::new(0));
    let pool = WorkerPool::new(
        "pool",
        Arc::clone(&queue),
        WorkerPoolConfig {
            num_workers: 3,
            worker: WorkerConfig { poll_interval: Duration::from_millis(10), ..Default::default() },
            ..Default::default()
        },
    );
    pool.register_handler("scan", Arc::new(AlwaysSucceeds { calls: Arc::clone(&calls) }));

    for _ in 0..6 {
        queue
            .enqueue(Job::builder().type_tag("scan").priority(Priority::High).build(chrono::Utc::now()))
            .await
            .unwrap();
    }
    pool.start();

    wait_until(|| calls.load(Ordering::SeqCst) >= 6, Duration::from_secs(3)).await;
    pool.stop().await.unwrap();

    let stats = queue.stats().await.unwrap();
    assert_eq!(*stats.counters.get("completed:scan").unwrap_or(&0), 6);
}

#[tokio::test]
async fn handler_exceeding_timeout_is_cancelled_and_job_fails() {
    let queue = test_queue();
    let worker = Worker::new(
        "w1",
        Arc::clone(&queue),
        WorkerConfig { poll_interval: Duration::from_millis(20), ..Default::default() },
    );
    worker.register_handler("scan", Arc::new(NeverReturns));

    let job = queue
        .enqueue(
            Job::builder()
                .type_tag("scan")
                .timeout(Duration::from_millis(100))
                .max_retries(0)
                .build(chrono::Utc::now()),
        )
        .await
        .unwrap();
    worker.start();

    wait_until_status(&queue, job.id.as_str(), JobStatus::Failed, Duration::from_secs(3)).await;
    worker.stop().await.unwrap();

    let finished = queue.get(job.id.as_str()).await.unwrap();
    assert_eq!(finished.metadata.last_error_message.as_deref(), Some("job timeout"));
}

async fn wait_until_status(queue: &Arc<Queue>, job_id: &str, status: JobStatus, timeout: Duration) {
    let deadline = std::time::Instant::now() + timeout;
    loop {
        if let Ok(job) = queue.get(job_id).await {
            if job.status == status {
                return;
            }
        }
        if std::time::Instant::now() >= deadline {
            panic!("job {job_id} did not reach status {status} within timeout");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

async fn wait_until(mut predicate: impl FnMut() -> bool, timeout: Duration) {
    let deadline = std::time::Instant::now() + timeout;
    while !predicate() {
        if std::time::Instant::now() >= deadline {
            panic!("condition not met within timeout");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
