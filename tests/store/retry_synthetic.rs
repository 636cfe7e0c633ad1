use std::time::Duration;

use httpmock::Method::GET;
use httpmock::MockServer;
use url::Url;

use fundwatch_rs::store::Backoff;
use fundwatch_rs::{FwError, RemoteStore, RetryConfig, SnapshotStore};

fn store_with(server: &MockServer, retry: Option<RetryConfig>) -> RemoteStore {
    let mut b = RemoteStore::builder()
        .base_url(Url::parse(&format!("{}/", server.base_url())).unwrap())
        .timeout(Duration::from_secs(5));
    if let Some(cfg) = retry {
        b = b.retry_policy(cfg);
    }
    b.build().unwrap()
}

fn quick_retry(max_retries: u32) -> RetryConfig {
    RetryConfig {
        max_retries,
        backoff: Backoff::Fixed(Duration::from_millis(1)),
        ..RetryConfig::standard()
    }
}

#[tokio::test]
async fn retry_is_off_by_default() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/sectors");
        then.status(503);
    });

    let err = store_with(&server, None)
        .read_sector_reference()
        .await
        .unwrap_err();

    assert!(matches!(err, FwError::Status { status: 503, .. }), "got {err:?}");
    assert_eq!(mock.hits(), 1);
}

#[tokio::test]
async fn retryable_status_is_retried_up_to_the_limit() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/sectors");
        then.status(503);
    });

    let err = store_with(&server, Some(quick_retry(2)))
        .read_sector_reference()
        .await
        .unwrap_err();

    assert!(matches!(err, FwError::Status { status: 503, .. }), "got {err:?}");
    assert_eq!(mock.hits(), 3, "one attempt plus two retries");
}

#[tokio::test]
async fn other_statuses_are_not_retried() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/sectors");
        then.status(400);
    });

    let err = store_with(&server, Some(quick_retry(3)))
        .read_sector_reference()
        .await
        .unwrap_err();

    assert!(matches!(err, FwError::Status { status: 400, .. }), "got {err:?}");
    assert_eq!(mock.hits(), 1);
}

#[test]
fn exponential_backoff_is_capped() {
    let b = Backoff::Exponential {
        base: Duration::from_millis(200),
        factor: 2.0,
        max: Duration::from_secs(1),
    };
    assert_eq!(b.delay(0), Duration::from_millis(200));
    assert_eq!(b.delay(1), Duration::from_millis(400));
    assert_eq!(b.delay(3), Duration::from_secs(1));
    assert_eq!(b.delay(60), Duration::from_secs(1));
}
