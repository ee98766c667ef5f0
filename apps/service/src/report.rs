use std::fmt::Write;

use checks::{ChecksManager, WindowSummary};
use tracing::info;

fn metric(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(value) => format!("{value:.2}{unit}"),
        None => "n/a".to_string(),
    }
}

pub fn summary_line(slug: &str, summary: &WindowSummary) -> String {
    let mut line = format!("{slug}: {} samples", summary.samples);
    let _ = write!(
        line,
        ", availability {}, fail rate {}, p50 {}, p95 {}, p99 {}, stddev {}",
        metric(summary.availability, "%"),
        metric(summary.fail_rate, "%"),
        metric(summary.p50_ms, "ms"),
        metric(summary.p95_ms, "ms"),
        metric(summary.p99_ms, "ms"),
        metric(summary.stddev_ms, "ms"),
    );
    line
}

/// Log pool statistics and the window metrics of every endpoint.
pub async fn log_report(manager: &ChecksManager) {
    let stats = manager.stats();
    info!("{}", stats.to_string().trim_end());

    for (slug, window) in manager.snapshot().await {
        info!("{}", summary_line(&slug, &WindowSummary::of(&window)));
    }
}
