//! Pool member that repeatedly probes, records, waits and requeues endpoints.

use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::endpoint::Endpoint;
use crate::history::ResultHistory;
use crate::probe::Prober;
use crate::queue::WorkQueue;
use crate::shutdown::Shutdown;

/// What a worker is currently doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerState {
    /// Waiting for an endpoint to show up in the queue
    Idle,
    /// Request in flight for the named endpoint
    Probing(String),
    /// Writing the result into the history
    Recording(String),
    /// Holding the endpoint until its frequency expires
    Waiting { endpoint: String, frequency: u64 },
    /// Told to stop, finishing up
    Terminating,
    Terminated,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerState::Idle => write!(f, "Checking queue for an endpoint"),
            WorkerState::Probing(name) => write!(f, "Sending a request to an endpoint, {name}"),
            WorkerState::Recording(name) => write!(f, "Updating result window, {name}"),
            WorkerState::Waiting { endpoint, frequency } => {
                write!(f, "Waiting for endpoint frequency to expire, {endpoint}, {frequency}")
            }
            WorkerState::Terminating => write!(f, "Terminating"),
            WorkerState::Terminated => write!(f, "Terminated"),
        }
    }
}

/// Polling intervals used by a worker.
#[derive(Debug, Clone, Copy)]
pub struct WorkerTimings {
    /// How long to wait on an empty queue before rechecking the signal
    pub queue_timeout: Duration,
    /// Granularity of the frequency wait
    pub wait_increment: Duration,
}

pub struct Worker {
    name: String,
    queue: Arc<WorkQueue>,
    history: Arc<ResultHistory>,
    prober: Arc<dyn Prober>,
    shutdown: Shutdown,
    timings: WorkerTimings,
    state: watch::Sender<WorkerState>,
}

impl Worker {
    /// Create a worker and the receiver its state is published on.
    pub fn new(
        name: String,
        queue: Arc<WorkQueue>,
        history: Arc<ResultHistory>,
        prober: Arc<dyn Prober>,
        shutdown: Shutdown,
        timings: WorkerTimings,
    ) -> (Self, watch::Receiver<WorkerState>) {
        let (state, state_rx) = watch::channel(WorkerState::Idle);
        let worker = Self { name, queue, history, prober, shutdown, timings, state };
        (worker, state_rx)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn set_state(&self, state: WorkerState) {
        self.state.send_replace(state);
    }

    /// Run until the shutdown signal is observed.
    ///
    /// Returns the endpoint the worker was holding when it was signaled, if
    /// any, so the caller can decide whether it keeps being checked.
    pub async fn run(mut self) -> Option<Endpoint> {
        debug!("{} started", self.name);
        let mut held = None;

        while !self.shutdown.is_signaled() {
            self.set_state(WorkerState::Idle);

            let endpoint = tokio::select! {
                endpoint = self.queue.pop(self.timings.queue_timeout) => endpoint,
                _ = self.shutdown.signaled() => break,
            };
            let Some(endpoint) = endpoint else {
                continue;
            };

            if let ControlFlow::Break(endpoint) = self.cycle(endpoint).await {
                held = Some(endpoint);
                break;
            }
        }

        self.set_state(WorkerState::Terminated);
        debug!("{} exited", self.name);
        held
    }

    /// Probe, record, wait and requeue one endpoint.
    ///
    /// Breaks with the endpoint when the worker was signaled during the wait;
    /// it is handed back instead of requeued.
    async fn cycle(&mut self, endpoint: Endpoint) -> ControlFlow<Endpoint> {
        debug!("{} is checking {}", self.name, endpoint.name());

        self.set_state(WorkerState::Probing(endpoint.name().to_string()));
        let result = self.prober.probe(&endpoint).await;
        if result.success() {
            debug!(
                "{} answered {} in {:.1} ms",
                endpoint.slug(),
                result.status_code(),
                result.elapsed_ms()
            );
        } else {
            warn!("Check of {} failed: {}", endpoint.slug(), result.message());
        }

        self.set_state(WorkerState::Recording(endpoint.name().to_string()));
        self.history.record(endpoint.slug(), result).await;

        self.set_state(WorkerState::Waiting {
            endpoint: endpoint.name().to_string(),
            frequency: endpoint.frequency(),
        });
        let waited = self
            .shutdown
            .sleep(endpoint.frequency_duration(), self.timings.wait_increment)
            .await;

        if !waited {
            self.set_state(WorkerState::Terminating);
            debug!("{} handing back {} on shutdown", self.name, endpoint.slug());
            return ControlFlow::Break(endpoint);
        }

        self.queue.push(endpoint);
        ControlFlow::Continue(())
    }
}
