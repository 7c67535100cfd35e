//! Failure injection tests against a raw TCP backend.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use iam_client::config::{RetryConfig, TimeoutConfig};
use iam_client::{CallContext, ClientError, ErrorKind, Exhaustion, Group, IamClient};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing_test::traced_test;

mod common;

const GROUP_JSON: &str = r#"{"id":"g1","name":"x","description":"y"}"#;

fn client(addr: std::net::SocketAddr, retry: RetryConfig) -> IamClient {
    IamClient::builder(&format!("http://{}", addr), "test-token")
        .retry_config(retry)
        .build()
        .unwrap()
}

fn count_retry_logs(lines: &[&str]) -> usize {
    lines
        .iter()
        .filter(|line| line.contains("Retry attempt scheduled"))
        .count()
}

#[tokio::test]
#[traced_test]
async fn test_update_recovers_after_one_503() {
    let (addr, calls) = common::start_scripted_backend(vec![(503, "busy"), (200, GROUP_JSON)]).await;
    let client = client(addr, common::fast_retry(3));

    let group = client
        .update_group(&CallContext::new(), "g1", "x", "y")
        .await
        .expect("update should succeed after one retry");

    assert_eq!(
        group,
        Group {
            id: "g1".into(),
            name: "x".into(),
            description: "y".into(),
        }
    );
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    logs_assert(|lines: &[&str]| match count_retry_logs(lines) {
        1 => Ok(()),
        n => Err(format!("expected exactly one retry log, saw {}", n)),
    });
}

#[tokio::test]
async fn test_exhaustion_after_max_retries() {
    let (addr, calls) = common::start_scripted_backend(vec![(503, "down")]).await;
    let client = client(addr, common::fast_retry(2));

    let err = client.get_group(&CallContext::new(), "g1").await.unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    match err {
        ClientError::RetriesExhausted {
            attempts, reason, ..
        } => {
            assert_eq!(attempts, 3);
            assert_eq!(reason, Exhaustion::MaxRetries);
        }
        other => panic!("expected exhaustion, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rate_limited_then_success() {
    let (addr, calls) = common::start_scripted_backend(vec![(429, ""), (429, ""), (200, GROUP_JSON)]).await;
    let client = client(addr, common::fast_retry(3));

    let group = client.get_group(&CallContext::new(), "g1").await.unwrap();

    assert_eq!(group.id, "g1");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    for status in [400u16, 401, 403, 409, 422] {
        let (addr, calls) = common::start_scripted_backend(vec![(status, r#"{"error":"nope"}"#)]).await;
        let client = client(addr, common::fast_retry(3));

        let err = client
            .create_group(&CallContext::new(), "team-a", "desc")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Other, "status {}", status);
        assert!(err.to_string().contains(&status.to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1, "status {}", status);
    }
}

#[tokio::test]
async fn test_decode_failure_is_not_retried() {
    let (addr, calls) = common::start_scripted_backend(vec![(200, "not json")]).await;
    let client = client(addr, common::fast_retry(3));

    let err = client.get_group(&CallContext::new(), "g1").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Decoding);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_dropped_connection_is_retried() {
    let (addr, calls) =
        common::start_scripted_backend(vec![(common::DROP_CONNECTION, ""), (200, GROUP_JSON)]).await;
    let client = client(addr, common::fast_retry(3));

    let group = client.get_group(&CallContext::new(), "g1").await.unwrap();

    assert_eq!(group.name, "x");
    assert!(calls.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn test_connection_refused_exhausts_with_network_cause() {
    let addr = common::unused_addr().await;
    let client = client(addr, common::fast_retry(1));

    let err = client.list_groups(&CallContext::new()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RetriesExhausted);
    assert_eq!(
        err.last_cause().map(ClientError::kind),
        Some(ErrorKind::NetworkFailure)
    );
}

#[tokio::test]
async fn test_cancel_during_backoff_returns_promptly() {
    let (addr, calls) = common::start_scripted_backend(vec![(503, "")]).await;
    let retry = RetryConfig {
        max_retries: 5,
        initial_interval_ms: 5_000,
        ..RetryConfig::default()
    };
    let client = client(addr, retry);

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        canceller.cancel();
    });

    let start = Instant::now();
    let err = client
        .get_group(&CallContext::with_cancellation(token), "g1")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Cancelled));
    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_deadline_on_hanging_backend() {
    let addr = common::start_programmable_backend(|_| async {
        tokio::time::sleep(Duration::from_secs(10)).await;
        (200, GROUP_JSON.to_string())
    })
    .await;
    let client = IamClient::builder(&format!("http://{}", addr), "test-token")
        .timeout_config(TimeoutConfig::uniform(Duration::from_millis(300)))
        .build()
        .unwrap();

    let start = Instant::now();
    let err = client.get_group(&CallContext::new(), "g1").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DeadlineExceeded);
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_elapsed_ceiling_wins_over_retry_budget() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let addr = common::start_programmable_backend(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        async {
            tokio::time::sleep(Duration::from_millis(150)).await;
            (503, String::new())
        }
    })
    .await;
    let retry = RetryConfig {
        max_retries: 50,
        initial_interval_ms: 10,
        max_elapsed_ms: 400,
        ..RetryConfig::default()
    };
    let client = client(addr, retry);

    let start = Instant::now();
    let err = client.get_group(&CallContext::new(), "g1").await.unwrap_err();

    match err {
        ClientError::RetriesExhausted { reason, .. } => assert_eq!(reason, Exhaustion::MaxElapsedTime),
        other => panic!("expected elapsed exhaustion, got {:?}", other),
    }
    assert!(start.elapsed() < Duration::from_secs(2));
    assert!(calls.load(Ordering::SeqCst) < 10);
}
