use lantern::api::{
    ApiError, HelixBackend, HelixService, NewInference, SessionChunk, SessionType,
};
use tokio::sync::mpsc;
use tokio_test::assert_ok;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

// ============================================================================
// Helper Functions
// ============================================================================

fn backend(server: &MockServer, api_key: Option<&str>) -> HelixBackend {
    HelixBackend::new(server.uri(), api_key.map(str::to_string))
}

fn text_request(message: &str, model: &str) -> NewInference {
    NewInference {
        session_type: SessionType::Text,
        message: message.to_string(),
        model_name: model.to_string(),
    }
}

/// Collects chunks until the stream reports done or the channel closes.
async fn collect_chunks(mut receiver: mpsc::Receiver<SessionChunk>) -> Vec<SessionChunk> {
    let mut chunks = Vec::new();
    while let Some(chunk) = receiver.recv().await {
        let done = chunk.done;
        chunks.push(chunk);
        if done {
            break;
        }
    }
    chunks
}

fn streamed_text(chunks: &[SessionChunk]) -> String {
    chunks.iter().map(|c| c.text.as_str()).collect()
}

// ============================================================================
// Session start (streaming chat)
// ============================================================================

#[tokio::test]
async fn test_start_inference_reads_session_id_and_streams() {
    let mock_server = MockServer::start().await;

    let sse_response = "\
data: {\"id\":\"ses_01\",\"object\":\"chat.completion.chunk\",\"choices\":[{\"delta\":{\"role\":\"assistant\",\"content\":\"\"}}]}

data: {\"id\":\"ses_01\",\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}

data: {\"id\":\"ses_01\",\"choices\":[{\"delta\":{\"content\":\" there\"}}]}

data: {\"id\":\"ses_01\",\"choices\":[{\"delta\":{\"content\":\"\"},\"finish_reason\":\"stop\"}]}

data: [DONE]

";

    Mock::given(method("POST"))
        .and(path("/api/v1/sessions/chat"))
        .and(body_partial_json(serde_json::json!({
            "type": "text",
            "model": "llama3:instruct",
            "stream": true,
            "messages": [{"role": "user", "content": {"content_type": "text", "parts": ["Say hi"]}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_response))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = backend(&mock_server, Some("hl-key"));
    let (tx, rx) = mpsc::channel(100);
    let session = assert_ok!(
        backend
            .start_inference(text_request("Say hi", "llama3:instruct"), tx)
            .await
    )
    .expect("server named a session");

    assert_eq!(session.id, "ses_01");
    assert_eq!(session.session_type, SessionType::Text);
    assert_eq!(session.model_name, "llama3:instruct");

    let chunks = collect_chunks(rx).await;
    assert_eq!(streamed_text(&chunks), "Hello there");
    assert!(chunks.iter().all(|c| c.session_id == "ses_01"));
    assert!(chunks.last().is_some_and(|c| c.done));
}

#[tokio::test]
async fn test_start_inference_closes_stream_without_finish_reason() {
    let mock_server = MockServer::start().await;

    // Connection drops after one content chunk
    let sse_response = "\
data: {\"id\":\"ses_02\",\"choices\":[{\"delta\":{\"content\":\"partial\"}}]}

";

    Mock::given(method("POST"))
        .and(path("/api/v1/sessions/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_response))
        .mount(&mock_server)
        .await;

    let backend = backend(&mock_server, Some("hl-key"));
    let (tx, rx) = mpsc::channel(100);
    let session = assert_ok!(backend.start_inference(text_request("Hi", ""), tx).await);
    assert_eq!(session.map(|s| s.id).as_deref(), Some("ses_02"));

    let chunks = collect_chunks(rx).await;
    assert_eq!(streamed_text(&chunks), "partial");
    assert!(chunks.last().is_some_and(|c| c.done));
}

#[tokio::test]
async fn test_start_inference_empty_stream_yields_no_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/sessions/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("data: [DONE]\n\n"))
        .mount(&mock_server)
        .await;

    let backend = backend(&mock_server, Some("hl-key"));
    let (tx, _rx) = mpsc::channel(100);
    let session = assert_ok!(backend.start_inference(text_request("Hi", ""), tx).await);
    assert!(session.is_none());
}

#[tokio::test]
async fn test_start_inference_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/sessions/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&mock_server)
        .await;

    let backend = backend(&mock_server, Some("hl-key"));
    let (tx, _rx) = mpsc::channel(100);
    let result = backend.start_inference(text_request("Hi", ""), tx).await;

    match result {
        Err(ApiError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert!(message.contains("model not loaded"));
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_start_inference_network_error() {
    // Nothing listens on this port
    let backend = HelixBackend::new("http://127.0.0.1:1".to_string(), None);
    let (tx, _rx) = mpsc::channel(100);
    let result = backend.start_inference(text_request("Hi", ""), tx).await;
    assert!(matches!(result, Err(ApiError::Network(_))));
}

// ============================================================================
// Account
// ============================================================================

#[tokio::test]
async fn test_current_user_sends_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/status"))
        .and(header("authorization", "Bearer hl-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"user": "alice", "admin": true})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = backend(&mock_server, Some("hl-key"));
    let user = assert_ok!(backend.current_user().await).expect("signed in");
    assert_eq!(user.id, "alice");
    assert!(user.admin);
}

#[tokio::test]
async fn test_current_user_without_key_skips_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/status"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let backend = backend(&mock_server, None);
    assert_eq!(assert_ok!(backend.current_user().await), None);
}

#[tokio::test]
async fn test_current_user_rejected_key_is_signed_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/status"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&mock_server)
        .await;

    let backend = backend(&mock_server, Some("bad-key"));
    assert_eq!(assert_ok!(backend.current_user().await), None);
}

#[tokio::test]
async fn test_current_user_empty_user_is_signed_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"user": ""})))
        .mount(&mock_server)
        .await;

    let backend = backend(&mock_server, Some("hl-key"));
    assert_eq!(assert_ok!(backend.current_user().await), None);
}

#[tokio::test]
async fn test_set_api_key_applies_to_later_calls() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/status"))
        .and(header("authorization", "Bearer fresh-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"user": "bob"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = backend(&mock_server, None);
    backend.set_api_key("fresh-key".to_string());
    let user = assert_ok!(backend.current_user().await);
    assert_eq!(user.map(|u| u.id).as_deref(), Some("bob"));
}

// ============================================================================
// Apps, sessions and models
// ============================================================================

#[tokio::test]
async fn test_list_apps_parses_and_tolerates_null() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/apps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "id": "app_1",
                "updated": "2024-01-03T10:00:00Z",
                "config": {"helix": {"name": "Writer", "avatar": "https://img/w.png"}}
            },
            {"id": "app_2", "config": {"helix": {"name": "", "avatar": ""}}}
        ])))
        .mount(&mock_server)
        .await;

    let backend = backend(&mock_server, Some("hl-key"));
    let apps = assert_ok!(backend.list_apps().await);
    assert_eq!(apps.len(), 2);
    assert_eq!(apps[0].name(), "Writer");
    assert_eq!(apps[0].avatar(), Some("https://img/w.png"));
    assert_eq!(apps[1].avatar(), None);

    let empty_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/apps"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&empty_server)
        .await;
    let apps = assert_ok!(self::backend(&empty_server, Some("hl-key")).list_apps().await);
    assert!(apps.is_empty());
}

#[tokio::test]
async fn test_create_empty_app_posts_blank_config() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/apps"))
        .and(body_partial_json(serde_json::json!({
            "app_source": "helix",
            "config": {"helix": {"name": "", "description": "", "assistants": []}}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "app_new"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = backend(&mock_server, Some("hl-key"));
    let app = assert_ok!(backend.create_empty_app().await);
    assert_eq!(app.map(|a| a.id).as_deref(), Some("app_new"));
}

#[tokio::test]
async fn test_create_empty_app_null_body_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/apps"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&mock_server)
        .await;

    let backend = backend(&mock_server, Some("hl-key"));
    assert_eq!(assert_ok!(backend.create_empty_app().await), None);
}

#[tokio::test]
async fn test_list_sessions() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sessions": [
                {"session_id": "ses_1", "name": "Poem", "type": "text", "model_name": "llama3"},
                {"session_id": "ses_2", "type": "image"}
            ]
        })))
        .mount(&mock_server)
        .await;

    let backend = backend(&mock_server, Some("hl-key"));
    let sessions = assert_ok!(backend.list_sessions().await);
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].session_id, "ses_1");
    assert_eq!(sessions[0].model_name, "llama3");
    assert_eq!(sessions[1].session_type, SessionType::Image);
}

#[tokio::test]
async fn test_list_models_maps_types() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                {"id": "llama3:instruct", "type": "chat", "description": "General chat"},
                {"id": "sdxl", "type": "image"},
                {"id": "mystery"}
            ]
        })))
        .mount(&mock_server)
        .await;

    let backend = backend(&mock_server, Some("hl-key"));
    let models = assert_ok!(backend.list_models().await);
    assert_eq!(models.len(), 3);
    assert_eq!(models[0].name, "llama3:instruct");
    assert_eq!(models[0].session_type, Some(SessionType::Text));
    assert_eq!(models[0].description.as_deref(), Some("General chat"));
    assert!(models[1].supports(SessionType::Image));
    assert!(!models[1].supports(SessionType::Text));
    assert!(models[2].supports(SessionType::Text));
}
