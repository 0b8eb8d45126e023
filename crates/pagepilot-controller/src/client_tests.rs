use super::*;

use serde_json::json;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

fn fast_client(server: &MockServer) -> SessionClient {
    SessionClient::with_timing(
        &server.uri(),
        Duration::from_millis(5),
        Duration::from_secs(1),
    )
}

#[tokio::test]
async fn test_create_returns_session_id() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/session/create"))
        .and(matchers::body_json(json!({"url": "http://example.com"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"session_id": "s-1"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server);
    let id = client.create("http://example.com").await.unwrap();
    assert_eq!(id, "s-1");
}

#[tokio::test]
async fn test_create_surfaces_capacity_rejection() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/session/create"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(json!({"error": "session limit reached (4 active)"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server);
    match client.create("http://example.com").await.unwrap_err() {
        ControllerError::Status { status, body } => {
            assert_eq!(status, 409);
            assert!(body.contains("session limit reached"));
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn test_result_success_returns_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/session/result"))
        .and(matchers::body_json(json!({"session_id": "s-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "Success",
            "result": {"type": "Success", "screenshot": "cGl4ZWxz"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server);
    let result = client.get_result("s-1").await.unwrap();
    assert_eq!(result.screenshot(), "cGl4ZWxz");
}

#[tokio::test]
async fn test_result_retries_while_worker_is_busy() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/session/result"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"type": "Failed", "state": "Running"})),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/session/result"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "Success",
            "result": {"type": "Error", "message": "label 4 vanished", "screenshot": "cGl4ZWxz"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server);
    let result = client.get_result("s-1").await.unwrap();
    assert_eq!(result.error_message(), Some("label 4 vanished"));
}

#[tokio::test]
async fn test_result_poll_gives_up_after_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/session/result"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"type": "Failed", "state": "Idle"})),
        )
        .mount(&mock_server)
        .await;

    let client = SessionClient::with_timing(
        &mock_server.uri(),
        Duration::from_millis(5),
        Duration::from_millis(20),
    );
    let err = client.get_result("s-1").await.unwrap_err();
    assert!(matches!(err, ControllerError::PollTimeout { .. }));
}

#[tokio::test]
async fn test_result_terminal_state_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/session/result"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"type": "Failed", "state": "Finish"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server);
    match client.get_result("s-1").await.unwrap_err() {
        ControllerError::Terminal { state } => assert_eq!(state, SessionState::Finish),
        other => panic!("expected Terminal, got {other:?}"),
    }
}

#[tokio::test]
async fn test_result_for_missing_session() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/session/result"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "NotExist"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server);
    let err = client.get_result("s-1").await.unwrap_err();
    assert!(matches!(err, ControllerError::SessionGone));
}

#[tokio::test]
async fn test_result_claimed_without_payload_is_protocol_violation() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/session/result"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "Success"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server);
    let err = client.get_result("s-1").await.unwrap_err();
    assert!(matches!(err, ControllerError::Protocol(_)));
}

#[tokio::test]
async fn test_instruction_accepted() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/session/instruction"))
        .and(matchers::body_json(json!({
            "session_id": "s-1",
            "instruction": {"type": "Click", "label": 3}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "Success"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server);
    client
        .send_instruction("s-1", Instruction::Click { label: 3 })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_instruction_retries_until_slot_frees() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/session/instruction"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"type": "Failed", "state": "Running"})),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/session/instruction"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "Success"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server);
    client
        .send_instruction("s-1", Instruction::Wait)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_instruction_against_dead_session() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/session/instruction"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"type": "Failed", "state": "Fatal"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server);
    match client
        .send_instruction("s-1", Instruction::Wait)
        .await
        .unwrap_err()
    {
        ControllerError::Terminal { state } => assert_eq!(state, SessionState::Fatal),
        other => panic!("expected Terminal, got {other:?}"),
    }
}

#[tokio::test]
async fn test_stop_and_delete_report_outcomes() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/session/stop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"stopped": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/session/delete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deleted": false})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server);
    assert!(client.stop("s-1").await.unwrap());
    assert!(!client.delete("s-1").await.unwrap());
}
