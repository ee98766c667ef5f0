//! Probing endpoints and recording what happened.

mod http;
mod types;

pub use http::{HttpProber, Prober};
pub use types::ProbeResult;
