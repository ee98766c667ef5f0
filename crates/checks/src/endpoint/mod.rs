//! Endpoint definitions.
//!
//! This module defines what a probe target looks like: the URI parts, the
//! verb, the headers and payload, and how often it may be checked.

mod types;
mod verb;

pub use types::{
    DEFAULT_FREQUENCY_SECS, DEFAULT_PORT, DEFAULT_SCHEME, DEFAULT_SERVER, Endpoint, IntoPort,
};
pub use verb::HttpVerb;
