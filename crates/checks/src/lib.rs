//! Checks - synthetic endpoint monitoring core
//!
//! A fixed pool of workers pulls endpoints from a shared queue, probes them
//! over HTTP, records each outcome in a bounded per-endpoint window and puts
//! the endpoint back in the queue once its frequency has expired.
//!
//! ```no_run
//! use checks::{ChecksManager, Endpoint, ManagerConfig};
//!
//! # async fn run() -> checks::Result<()> {
//! let mut manager = ChecksManager::new(ManagerConfig::default())?;
//!
//! let mut endpoint = Endpoint::new("example")?;
//! endpoint.set_server("example.com")?.set_frequency(30)?;
//! manager.enqueue(endpoint);
//!
//! manager.start(4);
//! // ...
//! let snapshot = manager.snapshot().await;
//! manager.stop(true).await;
//! # Ok(())
//! # }
//! ```

pub mod endpoint;
pub mod error;
pub mod history;
pub mod manager;
pub mod probe;
pub mod queue;
pub mod shutdown;
pub mod window;
pub mod worker;

pub use endpoint::{Endpoint, HttpVerb};
pub use error::{ChecksError, Result, ValidationError};
pub use history::{DEFAULT_WINDOW_SIZE, ResultHistory, Snapshot};
pub use manager::{ChecksManager, ManagerConfig, ManagerStats, WorkerStatus};
pub use probe::{HttpProber, ProbeResult, Prober};
pub use queue::WorkQueue;
pub use window::WindowSummary;
pub use worker::WorkerState;
