use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Serialize;

/// Outcome of a single check against an endpoint.
///
/// A result is created exactly once per probe attempt and is never modified
/// afterwards. Timings are expressed in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    /// When the probe started, in UTC
    started_at: DateTime<Utc>,

    /// `started_at` as seconds since the Unix epoch
    timestamp: f64,

    /// Whether the endpoint answered with a 2xx status
    success: bool,

    /// HTTP status code, 0 when no response was received
    status_code: u16,

    /// Time to first byte, summed over every redirect hop
    ttfb_ms: f64,

    /// Wall clock time from sending the request to receiving the body
    elapsed_ms: f64,

    /// Response body, absent when no response was received
    body: Option<String>,

    /// Failure description, empty on success
    message: String,
}

fn millis(duration: Duration) -> f64 {
    duration.as_micros() as f64 / 1000.0
}

fn epoch_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp() as f64 + f64::from(at.timestamp_subsec_micros()) / 1_000_000.0
}

impl ProbeResult {
    /// Build a result from a received response.
    ///
    /// Any status outside of 2xx is recorded as a failure, with the body and
    /// timings kept.
    pub fn completed(
        started_at: DateTime<Utc>,
        status_code: u16,
        ttfb: Duration,
        elapsed: Duration,
        body: String,
    ) -> Self {
        let status = StatusCode::from_u16(status_code).ok();
        let success = status.is_some_and(|status| status.is_success());
        let message = if success {
            String::new()
        } else {
            match status.and_then(|status| status.canonical_reason()) {
                Some(reason) => format!("Endpoint responded with {status_code} {reason}"),
                None => format!("Endpoint responded with {status_code}"),
            }
        };

        Self {
            started_at,
            timestamp: epoch_seconds(started_at),
            success,
            status_code,
            ttfb_ms: millis(ttfb),
            elapsed_ms: millis(elapsed),
            body: Some(body),
            message,
        }
    }

    /// Build a result for a probe that never got a response.
    pub fn failed(
        started_at: DateTime<Utc>,
        elapsed: Duration,
        message: impl Into<String>,
    ) -> Self {
        Self {
            started_at,
            timestamp: epoch_seconds(started_at),
            success: false,
            status_code: 0,
            ttfb_ms: 0.0,
            elapsed_ms: millis(elapsed),
            body: None,
            message: message.into(),
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn ttfb_ms(&self) -> f64 {
        self.ttfb_ms
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
