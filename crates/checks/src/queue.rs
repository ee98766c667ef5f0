//! FIFO of endpoints waiting for their next check.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::{Instant, timeout_at};

use crate::endpoint::Endpoint;

/// Unbounded, multi-producer multi-consumer queue of endpoints.
///
/// The lock is only held for the push or pop itself and never across an
/// await point.
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: Mutex<VecDeque<Endpoint>>,
    available: Notify,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> MutexGuard<'_, VecDeque<Endpoint>> {
        // A panic while holding the lock cannot leave the deque half updated.
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an endpoint at the tail of the queue.
    pub fn push(&self, endpoint: Endpoint) {
        self.items().push_back(endpoint);
        self.available.notify_one();
    }

    /// Take the endpoint at the head of the queue without waiting.
    pub fn try_pop(&self) -> Option<Endpoint> {
        self.items().pop_front()
    }

    /// Take the endpoint at the head of the queue, waiting up to `wait` for one
    /// to be pushed. Returns `None` on timeout.
    pub async fn pop(&self, wait: Duration) -> Option<Endpoint> {
        let deadline = Instant::now() + wait;
        loop {
            // Register interest before looking so a push in between is not missed.
            let notified = self.available.notified();
            if let Some(endpoint) = self.try_pop() {
                return Some(endpoint);
            }
            if timeout_at(deadline, notified).await.is_err() {
                return self.try_pop();
            }
        }
    }

    /// Remove every queued endpoint, returning how many were discarded.
    pub fn clear(&self) -> usize {
        let mut items = self.items();
        let discarded = items.len();
        items.clear();
        discarded
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}
