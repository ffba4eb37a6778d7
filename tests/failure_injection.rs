//! Failure injection tests: unreachable, slow and misbehaving providers.

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde_json::Value;

mod common;

use common::{Facade, MockUpstream, Reply, ECAN_BODY, YOURS_BODY};

const ROUTE: &[(&str, &str)] = &[
    ("origin", "-43.5359,172.6395"),
    ("destination", "-43.53479,172.6396"),
];

async fn get(facade: &Facade, path: &str) -> (StatusCode, Value) {
    let res = common::client()
        .get(facade.url(path))
        .query(ROUTE)
        .send()
        .await
        .unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

#[tokio::test]
async fn test_unreachable_provider_is_bad_gateway() {
    let dead = common::closed_port().await;
    let ecan = MockUpstream::start(Reply::ok(ECAN_BODY)).await;
    let facade = Facade::start(common::facade_config(
        &format!("http://{}/gosmore.php", dead),
        &ecan.url("/solve"),
    ))
    .await;

    let (status, body) = get(&facade, "/api/v1/yours").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("yours"));

    // Other providers are unaffected
    let (status, _) = get(&facade, "/api/v1/ecan").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let slow = MockUpstream::start(Reply::ok(YOURS_BODY).delayed(Duration::from_secs(5))).await;
    let ecan = MockUpstream::start(Reply::ok(ECAN_BODY)).await;
    let facade = Facade::start(common::facade_config(&slow.url("/gosmore.php"), &ecan.url("/solve"))).await;

    let start = Instant::now();
    let (status, body) = get(&facade, "/api/v1/yours").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("unavailable"));
    // Provider timeout is 1s in the test config
    assert!(start.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_provider_server_error_is_bad_gateway() {
    let yours = MockUpstream::start(Reply::status(503, "maintenance")).await;
    let ecan = MockUpstream::start(Reply::ok(ECAN_BODY)).await;
    let facade = Facade::start(common::facade_config(&yours.url("/gosmore.php"), &ecan.url("/solve"))).await;

    let (status, _) = get(&facade, "/api/v1/yours").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(yours.requests().len(), 1, "no retries");
}

#[tokio::test]
async fn test_provider_client_error_is_bad_request() {
    let yours = MockUpstream::start(Reply::status(400, "bad coordinates")).await;
    let ecan = MockUpstream::start(Reply::ok(ECAN_BODY)).await;
    let facade = Facade::start(common::facade_config(&yours.url("/gosmore.php"), &ecan.url("/solve"))).await;

    let (status, _) = get(&facade, "/api/v1/yours").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_payload_is_bad_gateway() {
    let yours = MockUpstream::start(Reply::ok(r#"{"type":"LineString","properties":{}}"#)).await;
    let ecan = MockUpstream::start(Reply::ok("<html>not json</html>")).await;
    let facade = Facade::start(common::facade_config(&yours.url("/gosmore.php"), &ecan.url("/solve"))).await;

    for path in ["/api/v1/yours", "/api/v1/ecan"] {
        let (status, body) = get(&facade, path).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY, "{path}");
        let message = body["error"].as_str().unwrap();
        assert!(!message.contains("html"), "payload leaked: {message}");
    }
}

#[tokio::test]
async fn test_arcgis_error_object() {
    let yours = MockUpstream::start(Reply::ok(YOURS_BODY)).await;
    let ecan = MockUpstream::start(Reply::ok(
        r#"{"error":{"code":400,"message":"Unable to complete operation.","details":["Need at least 2 valid stops."]}}"#,
    ))
    .await;
    let facade = Facade::start(common::facade_config(&yours.url("/gosmore.php"), &ecan.url("/solve"))).await;

    let (status, body) = get(&facade, "/api/v1/ecan").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Need at least 2 valid stops"));
}

#[tokio::test]
async fn test_disabled_provider_is_unknown() {
    let yours = MockUpstream::start(Reply::ok(YOURS_BODY)).await;
    let ecan = MockUpstream::start(Reply::ok(ECAN_BODY)).await;
    let mut config = common::facade_config(&yours.url("/gosmore.php"), &ecan.url("/solve"));
    config.providers.ecan.enabled = false;
    let facade = Facade::start(config).await;

    let (status, _) = get(&facade, "/api/v1/ecan").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(ecan.requests().is_empty());
}

#[tokio::test]
async fn test_client_disconnect_cancels_upstream_call() {
    let slow = MockUpstream::start(Reply::ok(YOURS_BODY).delayed(Duration::from_secs(5))).await;
    let ecan = MockUpstream::start(Reply::ok(ECAN_BODY)).await;
    let mut config = common::facade_config(&slow.url("/gosmore.php"), &ecan.url("/solve"));
    config.providers.yours.timeout_secs = 30;
    config.timeouts.request_secs = 30;
    let facade = Facade::start(config).await;

    let impatient = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_millis(300))
        .build()
        .unwrap();
    let err = impatient
        .get(facade.url("/api/v1/yours"))
        .query(ROUTE)
        .send()
        .await
        .unwrap_err();
    assert!(err.is_timeout());
    let dropped_at = Instant::now();

    // The facade drops its provider call once the client is gone
    while slow.abandoned() == 0 {
        assert!(
            dropped_at.elapsed() < Duration::from_secs(3),
            "provider connection still open"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(slow.requests().len(), 1);

    let res = common::client().get(facade.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
