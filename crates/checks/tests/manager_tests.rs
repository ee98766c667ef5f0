//! End-to-end tests of the worker pool against mock servers

mod common;

use std::time::{Duration, Instant};

use checks::{ChecksManager, ManagerConfig, window};
use common::{Alternating, closed_addr, endpoint_at, endpoint_for, init_tracing};
use wiremock::matchers::path;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config() -> ManagerConfig {
    ManagerConfig::default()
        .with_queue_timeout(Duration::from_millis(200))
        .with_wait_increment(Duration::from_millis(100))
        .with_request_timeout(Duration::from_secs(5))
}

#[tokio::test]
async fn test_alternating_endpoint_fills_window_with_mixed_results() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(path("/flaky")).respond_with(Alternating::default()).mount(&server).await;

    let mut manager = ChecksManager::new(config()).unwrap();
    manager.enqueue(endpoint_for(&server, "flaky", "flaky"));
    manager.start(1);

    tokio::time::sleep(Duration::from_secs(5)).await;
    manager.stop(true).await;

    let snapshot = manager.snapshot().await;
    let results = &snapshot["flaky"];
    assert!((4..=6).contains(&results.len()), "unexpected sample count {}", results.len());
    assert!(results.iter().any(|r| r.success()));
    assert!(results.iter().any(|r| !r.success()));

    let failures = results.iter().filter(|r| r.status_code() != 200).count();
    let expected = failures as f64 / results.len() as f64 * 100.0;
    assert_eq!(window::fail_rate(results), Some(expected));
    assert!((window::availability(results).unwrap() - (100.0 - expected)).abs() < 1e-9);
}

#[tokio::test]
async fn test_window_is_capped_and_keeps_latest_results() {
    let server = MockServer::start().await;
    Mock::given(path("/flaky")).respond_with(Alternating::default()).mount(&server).await;

    let mut manager = ChecksManager::new(config().with_window_size(3)).unwrap();
    manager.enqueue(endpoint_for(&server, "flaky", "flaky"));
    manager.start(1);

    tokio::time::sleep(Duration::from_millis(4500)).await;
    manager.stop(true).await;

    let results = manager.window("flaky").await.unwrap();
    assert_eq!(results.len(), 3);
    let requests = server.received_requests().await.unwrap().len();
    assert!(requests > 3);

    // Oldest first, strictly increasing start times.
    assert!(results.windows(2).all(|pair| pair[0].started_at() < pair[1].started_at()));
    // The last probe was request number `requests`, odd numbers answered 200.
    let last_ok = requests % 2 == 1;
    assert_eq!(results[2].success(), last_ok);
}

#[tokio::test]
async fn test_unreachable_endpoint_accumulates_failures() {
    let mut manager = ChecksManager::new(config()).unwrap();
    manager.enqueue(endpoint_at(closed_addr(), "down", "status"));
    manager.start(1);

    tokio::time::sleep(Duration::from_millis(2500)).await;
    manager.stop(true).await;

    let results = manager.window("down").await.unwrap();
    assert!(results.len() >= 2);
    for result in &results {
        assert!(!result.success());
        assert_eq!(result.status_code(), 0);
        assert_eq!(result.ttfb_ms(), 0.0);
        assert!(result.elapsed_ms() > 0.0);
        assert!(!result.message().is_empty());
    }
    assert_eq!(window::fail_rate(&results), Some(100.0));
}

#[tokio::test]
async fn test_every_endpoint_gets_checked_by_the_pool() {
    let server = MockServer::start().await;
    Mock::given(path("/ok")).respond_with(ResponseTemplate::new(200)).mount(&server).await;

    let mut manager = ChecksManager::new(config()).unwrap();
    manager.enqueue_all((0..4).map(|n| endpoint_for(&server, &format!("ep-{n}"), "ok")));
    manager.start(2);

    tokio::time::sleep(Duration::from_secs(3)).await;
    manager.stop(true).await;

    let snapshot = manager.snapshot().await;
    assert_eq!(snapshot.keys().collect::<Vec<_>>(), ["ep-0", "ep-1", "ep-2", "ep-3"]);
    assert!(snapshot.values().all(|results| results.iter().all(|r| r.success())));
}

#[tokio::test]
async fn test_stop_without_join_returns_while_probe_is_in_flight() {
    let server = MockServer::start().await;
    Mock::given(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(1500)))
        .mount(&server)
        .await;

    let mut manager = ChecksManager::new(config()).unwrap();
    manager.enqueue(endpoint_for(&server, "slow", "slow"));
    manager.start(1);
    tokio::time::sleep(Duration::from_millis(300)).await;

    let called = Instant::now();
    manager.stop(false).await;
    assert!(called.elapsed() < Duration::from_millis(100));
    assert!(!manager.is_running());
    assert!(manager.snapshot().await.is_empty());

    // The request already underway completes and is still recorded.
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(manager.window("slow").await.map(|w| w.len()), Some(1));
    assert_eq!(manager.queue_len(), 0);
}

#[tokio::test]
async fn test_stop_with_join_waits_for_in_flight_probe() {
    let server = MockServer::start().await;
    Mock::given(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(1000)))
        .mount(&server)
        .await;

    let mut manager = ChecksManager::new(config()).unwrap();
    manager.enqueue(endpoint_for(&server, "slow", "slow"));
    manager.start(1);
    tokio::time::sleep(Duration::from_millis(300)).await;

    let called = Instant::now();
    manager.stop(true).await;
    assert!(called.elapsed() >= Duration::from_millis(500));
    assert_eq!(manager.window("slow").await.map(|w| w.len()), Some(1));
}

#[tokio::test]
async fn test_resize_keeps_endpoints_held_by_old_workers() {
    let server = MockServer::start().await;
    Mock::given(path("/ok")).respond_with(ResponseTemplate::new(200)).mount(&server).await;

    let mut manager = ChecksManager::new(config()).unwrap();
    manager.enqueue(endpoint_for(&server, "ok", "ok"));
    manager.start(1);
    tokio::time::sleep(Duration::from_millis(500)).await;

    // The only endpoint is held by the worker waiting out its frequency.
    let before = server.received_requests().await.unwrap().len();
    assert_eq!(before, 1);
    assert_eq!(manager.queue_len(), 0);

    manager.resize(2).await;
    let stats = manager.stats();
    assert_eq!(stats.running, 2);
    assert_eq!(stats.workers[0].name, "checks-worker-2");

    tokio::time::sleep(Duration::from_millis(2500)).await;
    manager.stop(true).await;

    let after = server.received_requests().await.unwrap().len();
    assert!(after >= before + 2, "only {} checks after the resize", after - before);
    assert!(manager.window("ok").await.unwrap().iter().all(|r| r.success()));
}

#[tokio::test]
async fn test_clear_after_reload_discards_stale_endpoints() {
    let server = MockServer::start().await;
    Mock::given(path("/ok")).respond_with(ResponseTemplate::new(200)).mount(&server).await;

    let mut manager = ChecksManager::new(config()).unwrap();
    manager.enqueue_all((0..5).map(|n| endpoint_for(&server, &format!("ep-{n}"), "ok")));
    manager.start(1);
    tokio::time::sleep(Duration::from_millis(300)).await;

    manager.stop(true).await;
    manager.clear();
    assert_eq!(manager.queue_len(), 0);
    assert_eq!(manager.stats().queue_size, 0);
}

#[tokio::test]
async fn test_stats_report_worker_status() {
    let server = MockServer::start().await;
    Mock::given(path("/ok")).respond_with(ResponseTemplate::new(200)).mount(&server).await;

    let mut manager = ChecksManager::new(config()).unwrap();
    let mut endpoint = endpoint_for(&server, "ok", "ok");
    endpoint.set_name("Homepage").set_frequency(30).unwrap();
    manager.enqueue(endpoint);
    manager.start(2);
    tokio::time::sleep(Duration::from_millis(500)).await;

    let stats = manager.stats();
    assert_eq!(stats.thread_count, 2);
    assert_eq!(stats.running, 2);
    assert_eq!(stats.alive(), 2);
    assert_eq!(stats.queue_size, 0);
    let statuses: Vec<&str> = stats.workers.iter().map(|w| w.status.as_str()).collect();
    assert!(statuses.contains(&"Waiting for endpoint frequency to expire, Homepage, 30"));
    assert!(statuses.contains(&"Checking queue for an endpoint"));

    manager.stop(true).await;
}
