//! Cooperative termination signal shared by a worker pool.

use std::time::Duration;

use tokio::sync::watch;

/// Sending half, owned by the manager. Dropping it also signals termination.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

/// Receiving half, cloned into every worker of a pool.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

/// Create a connected trigger and signal.
pub fn channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

impl ShutdownTrigger {
    /// Ask every holder of the matching [`Shutdown`] to terminate.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Shutdown {
    pub fn is_signaled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Resolve once termination has been requested.
    pub async fn signaled(&mut self) {
        // `wait_for` errors only when the trigger is gone, which also means stop.
        let _ = self.rx.wait_for(|stop| *stop).await;
    }

    /// Sleep for `duration` in steps of `increment`, returning early when
    /// signaled. Returns `true` if the full duration elapsed.
    pub async fn sleep(&mut self, duration: Duration, increment: Duration) -> bool {
        let increment = increment.max(Duration::from_millis(1));
        let mut remaining = duration;

        while !remaining.is_zero() {
            if self.is_signaled() {
                return false;
            }
            let step = remaining.min(increment);
            tokio::select! {
                _ = tokio::time::sleep(step) => remaining -= step,
                _ = self.signaled() => return false,
            }
        }

        !self.is_signaled()
    }
}
