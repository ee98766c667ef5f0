//! Checks manager - owns the work queue, the result history and the worker pool.
//!
//! Each worker holds the endpoint it just checked for the endpoint's whole
//! frequency before requeueing it. With more endpoints than workers the
//! achieved cadence of every endpoint drops below its configured frequency;
//! size the pool accordingly.

mod config;
mod stats;

pub use config::{
    DEFAULT_MAX_REDIRECTS, DEFAULT_QUEUE_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, DEFAULT_THREAD_COUNT,
    DEFAULT_USER_AGENT, DEFAULT_WAIT_INCREMENT, ManagerConfig,
};
pub use stats::{ManagerStats, WorkerStatus};

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::history::{ResultHistory, Snapshot};
use crate::probe::{HttpProber, ProbeResult, Prober};
use crate::queue::WorkQueue;
use crate::shutdown::{self, ShutdownTrigger};
use crate::worker::{Worker, WorkerState};

struct WorkerHandle {
    name: String,
    state: watch::Receiver<WorkerState>,
    task: JoinHandle<Option<Endpoint>>,
}

struct WorkerPool {
    trigger: ShutdownTrigger,
    workers: Vec<WorkerHandle>,
}

/// Supervises a pool of workers probing the endpoints in a shared queue.
pub struct ChecksManager {
    config: ManagerConfig,
    queue: Arc<WorkQueue>,
    history: Arc<ResultHistory>,
    prober: Arc<dyn Prober>,
    pool: Option<WorkerPool>,
    spawned: usize,
}

impl ChecksManager {
    /// Create a manager probing over HTTP.
    pub fn new(config: ManagerConfig) -> Result<Self> {
        let prober =
            HttpProber::new(config.request_timeout, &config.user_agent, config.max_redirects)?;
        Ok(Self::with_prober(config, Arc::new(prober)))
    }

    /// Create a manager using a custom prober.
    pub fn with_prober(config: ManagerConfig, prober: Arc<dyn Prober>) -> Self {
        debug!("Created a new checks manager");
        Self {
            queue: Arc::new(WorkQueue::new()),
            history: Arc::new(ResultHistory::new(config.window_size)),
            config,
            prober,
            pool: None,
            spawned: 0,
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Queue an endpoint for checking.
    pub fn enqueue(&self, endpoint: Endpoint) {
        self.queue.push(endpoint);
    }

    pub fn enqueue_all(&self, endpoints: impl IntoIterator<Item = Endpoint>) {
        for endpoint in endpoints {
            self.queue.push(endpoint);
        }
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Discard every queued endpoint.
    ///
    /// Endpoints held by workers are not affected; stop the pool first when
    /// reloading so stale endpoints do not resume.
    pub fn clear(&self) -> usize {
        let discarded = self.queue.clear();
        info!("Cleared {} endpoints from the queue", discarded);
        discarded
    }

    /// Start a fresh pool of `thread_count` workers.
    ///
    /// A running pool is signaled to stop first, without waiting for it, and
    /// the endpoints its workers hold are dropped. Use [`resize`](Self::resize)
    /// to change the pool size while keeping them. Must be called from within
    /// a tokio runtime.
    pub fn start(&mut self, thread_count: usize) {
        if self.pool.is_some() {
            self.signal_stop();
        }

        self.config.thread_count = thread_count;
        let (trigger, signal) = shutdown::channel();
        let workers = (0..thread_count)
            .map(|_| {
                self.spawned += 1;
                let name = format!("checks-worker-{}", self.spawned);
                let (worker, state) = Worker::new(
                    name.clone(),
                    Arc::clone(&self.queue),
                    Arc::clone(&self.history),
                    Arc::clone(&self.prober),
                    signal.clone(),
                    self.config.timings(),
                );
                WorkerHandle { name, state, task: tokio::spawn(worker.run()) }
            })
            .collect();

        self.pool = Some(WorkerPool { trigger, workers });
        info!("Started a new worker pool with {} workers", thread_count);
    }

    /// Restart the pool with a different number of workers.
    ///
    /// The old pool is joined first and every endpoint its workers were
    /// holding goes back at the tail of the queue, so nothing stops being
    /// checked. Those endpoints are due again immediately. Queue and history
    /// are kept.
    pub async fn resize(&mut self, thread_count: usize) {
        if let Some(pool) = self.signal_stop() {
            let held = join_pool(pool).await;
            debug!("Requeueing {} endpoints held by the previous pool", held.len());
            self.enqueue_all(held);
        }
        self.start(thread_count);
    }

    /// Signal the current pool and detach it from the manager.
    fn signal_stop(&mut self) -> Option<WorkerPool> {
        let pool = self.pool.take()?;
        for worker in &pool.workers {
            debug!("Stopping {}", worker.name);
        }
        pool.trigger.trigger();
        Some(pool)
    }

    /// Tell every worker to terminate after its current unit of work.
    ///
    /// With `join` this waits until every worker has exited. Without it the
    /// call returns immediately and a worker in the middle of a request may
    /// outlive it briefly; it exits as soon as it observes the signal.
    /// Endpoints held by the workers are dropped either way and have to be
    /// enqueued again. Stopping a stopped manager does nothing.
    pub async fn stop(&mut self, join: bool) {
        let Some(pool) = self.signal_stop() else {
            return;
        };
        info!("Stopping worker pool of {} workers", pool.workers.len());

        if !join {
            return;
        }

        let dropped = join_pool(pool).await;
        if !dropped.is_empty() {
            debug!("Dropped {} endpoints held by stopped workers", dropped.len());
        }
    }

    /// Whether a pool is currently attached
    pub fn is_running(&self) -> bool {
        self.pool.is_some()
    }

    /// Copy of every endpoint's result window, keyed by slug.
    pub async fn snapshot(&self) -> Snapshot {
        self.history.snapshot().await
    }

    /// Copy of one endpoint's result window.
    pub async fn window(&self, slug: &str) -> Option<Vec<ProbeResult>> {
        self.history.window(slug).await
    }

    /// Queue depth and per-worker status.
    pub fn stats(&self) -> ManagerStats {
        let workers: Vec<WorkerStatus> = self
            .pool
            .iter()
            .flat_map(|pool| pool.workers.iter())
            .map(|worker| WorkerStatus {
                name: worker.name.clone(),
                status: worker.state.borrow().to_string(),
                alive: !worker.task.is_finished(),
            })
            .collect();

        ManagerStats {
            thread_count: self.config.thread_count,
            queue_size: self.queue.len(),
            running: workers.len(),
            workers,
        }
    }
}

/// Wait for every worker of a signaled pool, collecting the endpoints they
/// handed back.
async fn join_pool(pool: WorkerPool) -> Vec<Endpoint> {
    let names: Vec<String> = pool.workers.iter().map(|w| w.name.clone()).collect();
    let results = join_all(pool.workers.into_iter().map(|w| w.task)).await;

    let mut held = Vec::new();
    for (name, result) in names.iter().zip(results) {
        match result {
            Ok(Some(endpoint)) => {
                debug!("Joined {}, it was holding {}", name, endpoint.slug());
                held.push(endpoint);
            }
            Ok(None) => debug!("Joined {}", name),
            Err(e) => error!("{} did not exit cleanly: {}", name, e),
        }
    }
    held
}
