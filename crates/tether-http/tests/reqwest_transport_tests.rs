//! Exercises the production reqwest transport against a local mock server.

use std::collections::HashMap;

use tether_http::{HttpTransport, HttpVersion, ReqwestTransport, RequestSnapshot};
use wiremock::matchers::{body_bytes, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport() -> ReqwestTransport {
    ReqwestTransport::new(false, false).expect("reqwest client builds")
}

#[tokio::test]
async fn get_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"pong".to_vec()))
        .mount(&server)
        .await;

    let snapshot = RequestSnapshot::bare(format!("{}/ping", server.uri()), None);
    let response = transport().send(&snapshot).await.expect("send");

    assert_eq!(response.status, 200);
    assert_eq!(response.version, HttpVersion::Http11);
    assert_eq!(response.body, b"pong");
}

#[tokio::test]
async fn post_carries_snapshot_headers_params_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .and(header("x-token", "abc"))
        .and(query_param("q", "42"))
        .and(body_bytes(b"hello".to_vec()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"accepted".to_vec()))
        .mount(&server)
        .await;

    let mut snapshot =
        RequestSnapshot::bare(format!("{}/submit", server.uri()), Some(b"hello".to_vec()));
    snapshot
        .headers
        .insert("x-token".to_string(), "abc".to_string());
    snapshot.params.insert("q".to_string(), "42".to_string());

    let response = transport().send(&snapshot).await.expect("send");
    assert_eq!(response.status, 200);
    assert_eq!(response.body, b"accepted");
}

#[tokio::test]
async fn non_success_status_is_an_outcome_with_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_bytes(b"ignored".to_vec()))
        .mount(&server)
        .await;

    let snapshot = RequestSnapshot::bare(format!("{}/missing", server.uri()), None);
    let response = transport().send(&snapshot).await.expect("send");

    assert_eq!(response.status, 404);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn connection_failure_is_a_transport_error() {
    let mut params = HashMap::new();
    params.insert("unused".to_string(), "1".to_string());
    let snapshot = RequestSnapshot {
        url: "http://127.0.0.1:1/unreachable".to_string(),
        body: None,
        headers: HashMap::new(),
        params,
    };

    let error = transport()
        .send(&snapshot)
        .await
        .expect_err("nothing listens on port 1");
    assert!(!error.0.is_empty());
}
