//! Contract tests for the answering service client.
//!
//! These run against a wiremock server and check the request format, the
//! status probe and how each kind of failure is classified.

use std::time::Duration;

use gia::client::{AnswerClient, AskError};
use serde_json::json;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> AnswerClient {
    AnswerClient::new(server.uri(), Some(Duration::from_secs(5))).expect("client builds")
}

#[tokio::test]
async fn question_is_posted_as_form_data() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/get_answer"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("question=What+is+aspirin%3F"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "A pain reliever."
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let answer = client_for(&mock_server).ask("What is aspirin?").await;

    assert_eq!(answer.ok().flatten().as_deref(), Some("A pain reliever."));
}

#[tokio::test]
async fn empty_answer_counts_as_missing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/get_answer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": ""})))
        .mount(&mock_server)
        .await;

    let answer = client_for(&mock_server).ask("hello").await;

    assert!(matches!(answer, Ok(None)));
}

#[tokio::test]
async fn non_json_body_is_malformed_even_on_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/get_answer"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<h1>Bad Gateway</h1>"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .ask("hello")
        .await
        .expect_err("body is not JSON");

    match err {
        AskError::MalformedResponse { body } => assert_eq!(body, "<h1>Bad Gateway</h1>"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn error_status_carries_server_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/get_answer"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"error": "Model not loaded"})),
        )
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .ask("hello")
        .await
        .expect_err("status is 503");

    assert!(matches!(
        &err,
        AskError::Status { status, error: Some(text) }
            if status.as_u16() == 503 && text == "Model not loaded"
    ));
    assert_eq!(err.to_string(), "request failed: 503 - Model not loaded");
}

#[tokio::test]
async fn slow_service_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/get_answer"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"answer": "late"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let client = AnswerClient::new(mock_server.uri(), Some(Duration::from_millis(100)))
        .expect("client builds");
    let err = client.ask("hello").await.expect_err("request is too slow");

    assert!(matches!(err, AskError::Timeout));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let client = AnswerClient::new("http://127.0.0.1:1", Some(Duration::from_secs(5)))
        .expect("client builds");
    let err = client.ask("hello").await.expect_err("nothing listens there");

    assert!(matches!(err, AskError::Transport(_)));
}

#[tokio::test]
async fn status_probe_reports_readiness() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ready",
            "message": "Model loaded"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let status = client_for(&mock_server).status().await.expect("status parsed");

    assert!(status.is_ready());
    assert_eq!(status.message, "Model loaded");
}

#[tokio::test]
async fn status_probe_reads_not_ready_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "status": "not_ready",
            "message": "Restart the server"
        })))
        .mount(&mock_server)
        .await;

    let status = client_for(&mock_server).status().await.expect("status parsed");

    assert!(!status.is_ready());
    assert_eq!(status.message, "Restart the server");
}

#[tokio::test]
async fn status_probe_without_endpoint_fails() {
    let mock_server = MockServer::start().await;

    let err = client_for(&mock_server)
        .status()
        .await
        .expect_err("no status route");

    assert!(matches!(err, AskError::Status { status, .. } if status.as_u16() == 404));
}
