//! Rolling window of probe results per endpoint.

use std::collections::{BTreeMap, HashMap, VecDeque};

use tokio::sync::RwLock;

use crate::probe::ProbeResult;

/// Default number of results kept per endpoint
pub const DEFAULT_WINDOW_SIZE: usize = 20;

/// Copy of every endpoint's window, keyed by slug, oldest result first
pub type Snapshot = BTreeMap<String, Vec<ProbeResult>>;

/// Shared, fixed-capacity history of probe results.
///
/// A single lock guards the whole mapping so that a snapshot sees every
/// endpoint's window at the same instant.
#[derive(Debug)]
pub struct ResultHistory {
    capacity: usize,
    windows: RwLock<HashMap<String, VecDeque<ProbeResult>>>,
}

impl ResultHistory {
    /// Create a history keeping at most `capacity` results per endpoint.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), windows: RwLock::new(HashMap::new()) }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a result to the endpoint's window, evicting the oldest one when full.
    pub async fn record(&self, slug: &str, result: ProbeResult) {
        let mut windows = self.windows.write().await;
        let window = windows
            .entry(slug.to_string())
            .or_insert_with(|| VecDeque::with_capacity(self.capacity));
        if window.len() == self.capacity {
            window.pop_front();
        }
        window.push_back(result);
    }

    /// Copy every window.
    pub async fn snapshot(&self) -> Snapshot {
        let windows = self.windows.read().await;
        windows
            .iter()
            .map(|(slug, window)| (slug.clone(), window.iter().cloned().collect()))
            .collect()
    }

    /// Copy a single endpoint's window, if it has been checked yet.
    pub async fn window(&self, slug: &str) -> Option<Vec<ProbeResult>> {
        let windows = self.windows.read().await;
        windows.get(slug).map(|window| window.iter().cloned().collect())
    }

    /// Drop every recorded window.
    pub async fn reset(&self) {
        self.windows.write().await.clear();
    }
}

impl Default for ResultHistory {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}
