//! Probe client behavior against live mock backends.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use sticky_probe::config::SimulationConfig;
use sticky_probe::probe::{DualProbeClient, ProbeClient};
use sticky_probe::types::{ERROR_ORIGIN, MISSING_ORIGIN};

mod common;
use common::{config_for, Reply, SeenRequest};

fn client_for(addr: std::net::SocketAddr, stickiness: bool, timeout_ms: u64) -> ProbeClient {
    let mut config = config_for(addr);
    config.probe.timeout_ms = timeout_ms;
    ProbeClient::from_config(&config.probe, &SimulationConfig::default(), stickiness).unwrap()
}

#[tokio::test]
async fn test_identity_from_header() {
    let addr = common::start_mock_backend(Reply::origin("us-east-1")).await;
    let result = client_for(addr, false, 2_000).probe(None).await;

    assert_eq!(result.origin_id, "us-east-1");
    assert_eq!(result.status, 200);
    assert!(result.error.is_none());
    assert!(result.sticky_header_sent.is_none());
}

#[tokio::test]
async fn test_identity_from_body_fields() {
    let addr = common::start_mock_backend(Reply::ok(r#"{"origin":"eu-west-1","id":"x"}"#)).await;
    let result = client_for(addr, false, 2_000).probe(None).await;
    assert_eq!(result.origin_id, "eu-west-1");

    let addr = common::start_mock_backend(Reply::ok(r#"{"id":7}"#)).await;
    let result = client_for(addr, false, 2_000).probe(None).await;
    assert_eq!(result.origin_id, "7");
}

#[tokio::test]
async fn test_missing_identity_keeps_status() {
    let addr = common::start_mock_backend(Reply::ok("Hello from Lambda")).await;
    let result = client_for(addr, false, 2_000).probe(None).await;

    assert_eq!(result.origin_id, MISSING_ORIGIN);
    assert_eq!(result.status, 200);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_non_success_status_is_not_a_failure() {
    let addr = common::start_mock_backend(Reply::Respond {
        status: 503,
        headers: vec![("x-origin-id".into(), "1".into())],
        body: String::new(),
    })
    .await;
    let result = client_for(addr, false, 2_000).probe(None).await;

    assert_eq!(result.origin_id, "1");
    assert_eq!(result.status, 503);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_timeout_reports_sticky_header() {
    let addr = common::start_mock_backend(Reply::Hang).await;
    let client = client_for(addr, true, 300);

    let started = std::time::Instant::now();
    let result = client.probe(Some("1")).await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(result.origin_id, ERROR_ORIGIN);
    assert_eq!(result.status, 0);
    assert!(result.error.as_deref().unwrap().contains("timed out"));
    assert_eq!(result.sticky_header_sent.as_deref(), Some("1"));
}

#[tokio::test]
async fn test_dropped_connection_is_error() {
    let addr = common::start_mock_backend(Reply::Drop).await;
    let result = client_for(addr, false, 2_000).probe(None).await;

    assert_eq!(result.origin_id, ERROR_ORIGIN);
    assert_eq!(result.status, 0);
    assert!(result.error.is_some());
}

#[tokio::test]
async fn test_header_sent_only_with_stickiness_and_anchor() {
    let seen: Arc<Mutex<Vec<SeenRequest>>> = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    let addr = common::start_programmable_backend(move |req| {
        log.lock().unwrap().push(req);
        async { Reply::origin("0") }
    })
    .await;

    let sticky = client_for(addr, true, 2_000);
    let plain = client_for(addr, false, 2_000);

    sticky.probe(None).await;
    sticky.probe(Some("0")).await;
    plain.probe(Some("0")).await;

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0].path, "/api");
    assert!(!seen[0].headers.contains_key("x-origin-id"));
    assert_eq!(seen[1].headers.get("x-origin-id").map(String::as_str), Some("0"));
    assert!(!seen[2].headers.contains_key("x-origin-id"));
}

#[tokio::test]
async fn test_dual_probe_runs_concurrently() {
    let addr = common::start_programmable_backend(|req| async move {
        tokio::time::sleep(Duration::from_millis(400)).await;
        match req.headers.get("x-origin-id") {
            Some(id) => Reply::origin(id),
            None => Reply::origin("2"),
        }
    })
    .await;

    let dual = DualProbeClient::new(&client_for(addr, false, 2_000));
    let started = std::time::Instant::now();
    let result = dual.probe_both(Some("1")).await;

    // Two sequential 400 ms calls would take at least 800 ms.
    assert!(started.elapsed() < Duration::from_millis(780));
    assert_eq!(result.sticky.origin_id, "1");
    assert_eq!(result.sticky.sticky_header_sent.as_deref(), Some("1"));
    assert_eq!(result.non_sticky.origin_id, "2");
    assert!(result.non_sticky.sticky_header_sent.is_none());
}
