//! Manager configuration.

use std::time::Duration;

use crate::history::DEFAULT_WINDOW_SIZE;
use crate::worker::WorkerTimings;

pub const DEFAULT_THREAD_COUNT: usize = 1;
pub const DEFAULT_QUEUE_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_WAIT_INCREMENT: Duration = Duration::from_secs(1);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_REDIRECTS: usize = 10;
pub const DEFAULT_USER_AGENT: &str = concat!("epmonitor-checks/", env!("CARGO_PKG_VERSION"));

/// Configuration options for a [`ChecksManager`](super::ChecksManager)
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Number of workers spawned when `start` is called without a pool size
    pub thread_count: usize,

    /// Results kept per endpoint
    pub window_size: usize,

    /// Bounded wait on an empty queue
    pub queue_timeout: Duration,

    /// Step of the frequency wait, bounds how long a stop takes to be noticed
    pub wait_increment: Duration,

    /// Timeout applied to each HTTP request
    pub request_timeout: Duration,

    /// Redirects followed before the probe is failed
    pub max_redirects: usize,

    pub user_agent: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            thread_count: DEFAULT_THREAD_COUNT,
            window_size: DEFAULT_WINDOW_SIZE,
            queue_timeout: DEFAULT_QUEUE_TIMEOUT,
            wait_increment: DEFAULT_WAIT_INCREMENT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ManagerConfig {
    pub fn with_thread_count(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count;
        self
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_queue_timeout(mut self, timeout: Duration) -> Self {
        self.queue_timeout = timeout;
        self
    }

    pub fn with_wait_increment(mut self, increment: Duration) -> Self {
        self.wait_increment = increment;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub(crate) fn timings(&self) -> WorkerTimings {
        WorkerTimings { queue_timeout: self.queue_timeout, wait_increment: self.wait_increment }
    }
}
