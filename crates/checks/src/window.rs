//! Summary metrics over a window of probe results.
//!
//! A data point counts as available only when the endpoint answered 200;
//! latency metrics are computed over the total elapsed times.

use serde::Serialize;
use statrs::statistics::Statistics;

use crate::probe::ProbeResult;

const AVAILABLE_STATUS: u16 = 200;

/// Percentage of results that answered 200, `None` for an empty window
pub fn availability(window: &[ProbeResult]) -> Option<f64> {
    if window.is_empty() {
        return None;
    }
    let available = window.iter().filter(|r| r.status_code() == AVAILABLE_STATUS).count();
    Some(available as f64 / window.len() as f64 * 100.0)
}

/// Percentage of results that did not answer 200, `None` for an empty window
pub fn fail_rate(window: &[ProbeResult]) -> Option<f64> {
    if window.is_empty() {
        return None;
    }
    let failures = window.iter().filter(|r| r.status_code() != AVAILABLE_STATUS).count();
    if failures == 0 {
        return Some(0.0);
    }
    Some(failures as f64 / window.len() as f64 * 100.0)
}

/// Elapsed times of a window, in milliseconds
pub fn elapsed_series(window: &[ProbeResult]) -> Vec<f64> {
    window.iter().map(ProbeResult::elapsed_ms).collect()
}

/// `p`-th percentile (0 to 100) of `values`, interpolating linearly between
/// the two closest ranks.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=100.0).contains(&p) {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Sample standard deviation (n - 1 denominator), `None` below two values
pub fn stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    Some(values.std_dev())
}

/// `p`-th percentile of the window's elapsed times
pub fn elapsed_percentile(window: &[ProbeResult], p: f64) -> Option<f64> {
    percentile(&elapsed_series(window), p)
}

/// Sample standard deviation of the window's elapsed times
pub fn elapsed_stddev(window: &[ProbeResult]) -> Option<f64> {
    stddev(&elapsed_series(window))
}

/// Everything the dashboard shows for one endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowSummary {
    pub samples: usize,
    pub availability: Option<f64>,
    pub fail_rate: Option<f64>,
    pub p50_ms: Option<f64>,
    pub p95_ms: Option<f64>,
    pub p99_ms: Option<f64>,
    pub stddev_ms: Option<f64>,
}

impl WindowSummary {
    pub fn of(window: &[ProbeResult]) -> Self {
        let elapsed = elapsed_series(window);
        Self {
            samples: window.len(),
            availability: availability(window),
            fail_rate: fail_rate(window),
            p50_ms: percentile(&elapsed, 50.0),
            p95_ms: percentile(&elapsed, 95.0),
            p99_ms: percentile(&elapsed, 99.0),
            stddev_ms: stddev(&elapsed),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;

    use super::*;

    fn response(status: u16, elapsed_ms: u64) -> ProbeResult {
        ProbeResult::completed(
            Utc::now(),
            status,
            Duration::ZERO,
            Duration::from_millis(elapsed_ms),
            String::new(),
        )
    }

    #[test]
    fn test_availability_and_fail_rate() {
        let window = [response(200, 10), response(500, 10), response(200, 10), response(301, 10)];
        assert_eq!(availability(&window), Some(50.0));
        assert_eq!(fail_rate(&window), Some(50.0));

        let healthy = [response(200, 10), response(200, 10)];
        assert_eq!(fail_rate(&healthy), Some(0.0));
        assert_eq!(availability(&healthy), Some(100.0));
    }

    #[test]
    fn test_unreachable_results_count_as_failures() {
        let window = [
            ProbeResult::failed(Utc::now(), Duration::from_millis(3), "refused"),
            response(200, 10),
        ];
        assert_eq!(fail_rate(&window), Some(50.0));
    }

    #[test]
    fn test_empty_window() {
        assert_eq!(availability(&[]), None);
        assert_eq!(fail_rate(&[]), None);
        assert_eq!(percentile(&[], 50.0), None);
        assert_eq!(stddev(&[1.0]), None);
        assert_eq!(WindowSummary::of(&[]).samples, 0);
    }

    #[test]
    fn test_percentile_interpolates_linearly() {
        let values = [15.0, 20.0, 35.0, 40.0, 50.0];
        assert_eq!(percentile(&values, 0.0), Some(15.0));
        assert_eq!(percentile(&values, 50.0), Some(35.0));
        assert_eq!(percentile(&values, 100.0), Some(50.0));
        assert!((percentile(&values, 40.0).unwrap() - 29.0).abs() < 1e-9);
        assert_eq!(percentile(&[4.0, 1.0, 3.0, 2.0], 50.0), Some(2.5));
        assert_eq!(percentile(&values, 101.0), None);
    }

    #[test]
    fn test_sample_stddev() {
        let sd = stddev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((sd - 2.138_089_935_299_395).abs() < 1e-9);
    }

    #[test]
    fn test_summary_uses_elapsed_times() {
        let window = [response(200, 100), response(200, 200), response(500, 300)];
        let summary = WindowSummary::of(&window);
        assert_eq!(summary.samples, 3);
        assert_eq!(summary.p50_ms, Some(200.0));
        assert!((summary.stddev_ms.unwrap() - 100.0).abs() < 1e-9);
        assert!((summary.fail_rate.unwrap() - 100.0 / 3.0).abs() < 1e-9);
    }
}
