//! Operational statistics of a running manager.

use std::fmt;

use serde::Serialize;

/// Status of one worker in the pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerStatus {
    pub name: String,
    pub status: String,
    pub alive: bool,
}

/// Point-in-time view of the worker pool and queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagerStats {
    /// Configured pool size
    pub thread_count: usize,
    /// Endpoints waiting in the queue
    pub queue_size: usize,
    /// Workers in the current pool
    pub running: usize,
    pub workers: Vec<WorkerStatus>,
}

impl ManagerStats {
    /// Workers whose task has not exited yet
    pub fn alive(&self) -> usize {
        self.workers.iter().filter(|worker| worker.alive).count()
    }
}

impl fmt::Display for ManagerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "threads: {} configured, {} running, {} alive; queue size: {}",
            self.thread_count,
            self.running,
            self.alive(),
            self.queue_size
        )?;
        for worker in &self.workers {
            writeln!(
                f,
                "  {} [{}] {}",
                worker.name,
                if worker.alive { "alive" } else { "exited" },
                worker.status
            )?;
        }
        Ok(())
    }
}
