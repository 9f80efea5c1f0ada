// Integration tests for `StatusClient` using wiremock.
#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mirrorwatch_api::{Error, StatusClient, TestStatus};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, StatusClient) {
    let server = MockServer::start().await;
    let client = StatusClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

// ── Snapshot loader ─────────────────────────────────────────────────

#[tokio::test]
async fn test_load_snapshot() {
    let (server, client) = setup().await;

    let body = json!([
        {
            "distribution": "Debian",
            "version": "8",
            "status": "success",
            "repository": "http://deb.debian.org/debian",
            "duration_seconds": 15,
            "error_message": null
        },
        {
            "distribution": "Ubuntu",
            "version": "20.04",
            "status": "failure",
            "repository": "http://archive.ubuntu.com/ubuntu",
            "error_message": "connection refused",
            "test_details": {
                "connectivity": { "status": "failure", "duration": 5, "error": "connection refused" },
                "update": { "status": "pending", "duration": 0, "error": null },
                "install": { "status": "pending", "duration": 0, "error": null }
            }
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/api/v1/test/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = client.load_snapshot().await.unwrap();

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].title(), "Debian 8");
    assert_eq!(snapshot[0].duration(), Some(15.0));
    assert_eq!(snapshot[1].status, TestStatus::Failure);
    assert_eq!(snapshot[1].error(), Some("connection refused"));
    let details = snapshot[1].test_details.as_ref().unwrap();
    assert_eq!(details.update.status, "pending");
}

#[tokio::test]
async fn test_load_snapshot_preserves_order() {
    let (server, client) = setup().await;

    let body = json!([
        { "distribution": "Kali", "version": "kali-rolling", "status": "running", "repository": "http://kali.download/kali" },
        { "distribution": "Debian", "version": "7", "status": "running", "repository": "http://deb.debian.org/debian" },
        { "distribution": "Debian", "version": "7", "status": "success", "repository": "http://deb.debian.org/debian" }
    ]);

    Mock::given(method("GET"))
        .and(path("/api/v1/test/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let snapshot = client.load_snapshot().await.unwrap();
    let titles: Vec<String> = snapshot.iter().map(|r| r.title()).collect();
    // Duplicated identities are kept as-is: no client-side dedup.
    assert_eq!(titles, ["Kali kali-rolling", "Debian 7", "Debian 7"]);
}

#[tokio::test]
async fn test_load_snapshot_http_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/test/test"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = client.load_snapshot().await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(err.status_code(), Some(502));
    match err {
        Error::Status { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body, "bad gateway");
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_load_snapshot_not_json() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/test/test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nginx</html>"))
        .mount(&server)
        .await;

    let err = client.load_snapshot().await.unwrap_err();
    assert!(err.is_transport());
    assert!(matches!(err, Error::Deserialization { .. }));
}

#[tokio::test]
async fn test_load_snapshot_connection_refused() {
    // Bind then release a port so nothing is listening on it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client =
        StatusClient::from_reqwest(&format!("http://{addr}"), reqwest::Client::new()).unwrap();
    let err = client.load_snapshot().await.unwrap_err();
    assert!(err.is_transport());
    assert!(err.is_connect(), "expected connect error, got {err:?}");
}

// ── Manual trigger ──────────────────────────────────────────────────

#[tokio::test]
async fn test_trigger_test() {
    let (server, client) = setup().await;

    let body = json!({
        "distribution": "Debian",
        "version": "12",
        "status": "running",
        "repository": "http://deb.debian.org/debian",
        "duration_seconds": 0,
        "error_message": null
    });

    Mock::given(method("POST"))
        .and(path("/api/v1/test/test"))
        .and(body_string(""))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let record = client.trigger_test().await.unwrap();
    assert_eq!(record.title(), "Debian 12");
    assert_eq!(record.status, TestStatus::Running);
    assert!(record.duration().is_none());
}

#[tokio::test]
async fn test_trigger_test_validation_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/test/test"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({ "detail": "missing field" })))
        .mount(&server)
        .await;

    let err = client.trigger_test().await.unwrap_err();
    assert_eq!(err.status_code(), Some(422));
}

#[tokio::test]
async fn test_live_url_from_mock_server() {
    let (server, client) = setup().await;
    let live = client.live_url().unwrap();
    assert_eq!(live.scheme(), "ws");
    assert_eq!(live.path(), "/test/ws");
    assert_eq!(
        live.port_or_known_default(),
        url::Url::parse(&server.uri()).unwrap().port_or_known_default()
    );
}
