// SPDX-License-Identifier: MIT

//! A single worker: `concurrency` cooperative routines pulling jobs off a
//! [`Queue`] and dispatching them to the [`JobHandler`] registered for each
//! job's type tag.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use scan_core::Job;
use scan_queue::{Queue, QueueError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::config::WorkerConfig;
use crate::handler::JobHandler;
use crate::stats::WorkerStats;

/// Owns a registry of [`JobHandler`]s keyed by job type, and a pool of
/// cooperative routines that dequeue and dispatch.
pub struct Worker {
    id: String,
    queue: Arc<Queue>,
    handlers: Arc<RwLock<HashMap<String, Arc<dyn JobHandler>>>>,
    config: WorkerConfig,
    stats: Arc<Mutex<WorkerStats>>,
    running: Arc<AtomicBool>,
    cancel: Mutex<CancellationToken>,
    routines: Mutex<Vec<JoinHandle<()>>>,
}

impl Worker {
    pub fn new(id: impl Into<String>, queue: Arc<Queue>, config: WorkerConfig) -> Self {
        Self {
            id: id.into(),
            queue,
            handlers: Arc::new(RwLock::new(HashMap::new())),
            config,
            stats: Arc::new(Mutex::new(WorkerStats::default())),
            running: Arc::new(AtomicBool::new(false)),
            cancel: Mutex::new(CancellationToken::new()),
            routines: Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Register a handler for `type_tag`. Must happen before [`Worker::start`];
    /// registrations made after start are visible to future dispatches since
    /// the registry is a read-mostly lock, but any job already mid-poll when
    /// you call this won't retroactively pick it up.
    pub fn register_handler(&self, type_tag: impl Into<String>, handler: Arc<dyn JobHandler>) {
        self.handlers.write().insert(type_tag.into(), handler);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> WorkerStats {
        self.stats.lock().clone()
    }

    /// Launch `config.concurrency` persistent polling routines. Each routine
    /// ticks on `config.poll_interval`, attempts one dequeue, and dispatches
    /// the matched handler on its own task so a handler panic surfaces as a
    /// failed job rather than crashing the poll loop.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let cancel = CancellationToken::new();
        *self.cancel.lock() = cancel.clone();

        let mut routines = self.routines.lock();
        routines.clear();

        for _ in 0..self.config.concurrency.max(1) {
            let queue = Arc::clone(&self.queue);
            let handlers = Arc::clone(&self.handlers);
            let stats = Arc::clone(&self.stats);
            let worker_id = self.id.clone();
            let poll_interval = self.config.poll_interval;
            let routine_cancel = cancel.clone();

            let handle = tokio::spawn(async move {
                poll_loop(queue, handlers, stats, worker_id, poll_interval, routine_cancel).await;
            });
            routines.push(handle);
        }
    }

    /// Stop accepting new jobs and wait up to `config.shutdown_timeout` for
    /// in-flight dispatches to finish. Jobs still running past the deadline
    /// are left for a later `Queue::cleanup` lease reclaim.
    #[instrument(level = "info", skip(self), fields(worker_id = %self.id))]
    pub async fn stop(&self) -> Result<(), QueueError> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        self.cancel.lock().cancel();

        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.routines.lock());
        let wait = async {
            for handle in handles {
                let _ = handle.await;
            }
        };

        if tokio::time::timeout(self.config.shutdown_timeout, wait).await.is_err() {
            tracing::warn!(worker_id = %self.id, "shutdown timed out with routines still in flight");
        }
        Ok(())
    }
}

#[instrument(level = "debug", skip(queue, handlers, stats, cancel), fields(worker_id = %worker_id))]
async fn poll_loop(
    queue: Arc<Queue>,
    handlers: Arc<RwLock<HashMap<String, Arc<dyn JobHandler>>>>,
    stats: Arc<Mutex<WorkerStats>>,
    worker_id: String,
    poll_interval: Duration,
    cancel: CancellationToken,
) {
    {
        let mut s = stats.lock();
        if s.started_at.is_none() {
            s.started_at = Some(chrono::Utc::now());
        }
    }

    loop {
        if cancel.is_cancelled() {
            return;
        }

        match queue.dequeue(&worker_id).await {
            Ok(job) => {
                dispatch(&queue, &handlers, &stats, job).await;
            }
            Err(QueueError::NotFound(_)) => {
                tokio::select! {
                    _ = tokio::time::sleep(poll_interval) => {}
                    _ = cancel.cancelled() => return,
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "dequeue failed");
                tokio::select! {
                    _ = tokio::time::sleep(poll_interval) => {}
                    _ = cancel.cancelled() => return,
                }
            }
        }
    }
}

async fn dispatch(
    queue: &Arc<Queue>,
    handlers: &Arc<RwLock<HashMap<String, Arc<dyn JobHandler>>>>,
    stats: &Arc<Mutex<WorkerStats>>,
    job: Job,
) {
    let job_id = job.id.as_str().to_string();
    let type_tag = job.type_tag.clone();
    let timeout = job.metadata.timeout;

    let handler = handlers.read().get(&type_tag).cloned();
    let Some(handler) = handler else {
        tracing::warn!(job_id = %job_id, type_tag = %type_tag, "no handler registered for job type");
        let _ = queue.fail(&job_id, &format!("no handler registered for type '{type_tag}'")).await;
        stats.lock().record_failure(chrono::Utc::now());
        return;
    };

    let dispatch_cancel = CancellationToken::new();
    let task_cancel = dispatch_cancel.clone();
    let task = tokio::spawn(async move { handler.handle(job, task_cancel).await });

    let outcome = tokio::time::timeout(timeout, task).await;
    match outcome {
        Ok(Ok(Ok(result))) => {
            if queue.complete(&job_id, result.as_ref()).await.is_ok() {
                stats.lock().record_success(chrono::Utc::now());
            } else {
                stats.lock().record_failure(chrono::Utc::now());
            }
        }
        Ok(Ok(Err(err))) => {
            tracing::warn!(job_id = %job_id, error = %err, "handler returned an error");
            let _ = queue.fail(&job_id, &err.to_string()).await;
            stats.lock().record_failure(chrono::Utc::now());
        }
        Ok(Err(join_err)) => {
            tracing::error!(job_id = %job_id, error = %join_err, "handler task panicked");
            let _ = queue.fail(&job_id, "handler panicked").await;
            stats.lock().record_failure(chrono::Utc::now());
        }
        Err(_elapsed) => {
            dispatch_cancel.cancel();
            tracing::warn!(job_id = %job_id, "handler exceeded its deadline");
            let _ = queue.fail(&job_id, "job timeout").await;
            stats.lock().record_failure(chrono::Utc::now());
        }
    }
}
