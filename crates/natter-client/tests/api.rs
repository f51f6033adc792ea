//! Contract tests for [`ApiClient`] against a mocked backend.
//!
//! Each test pins one endpoint: path shape, auth header, body naming and
//! response decoding. The backend's mixed field naming (camelCase ids,
//! snake_case auth fields) makes these worth checking byte-for-byte.

use natter_client::types::{ChatSummary, SendMessageRequest, SignUpRequest, UploadImageRequest};
use natter_client::{ApiClient, ApiConfig, ApiError, AuthToken};
use serde_json::json;
use wiremock::matchers::{body_json, body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(ApiConfig::new(server.uri())).unwrap()
}

fn token() -> AuthToken {
    AuthToken::new("secret-token").unwrap()
}

#[tokio::test]
async fn test_sign_in_posts_form_encoded_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("username=ada&password=pw"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-1",
            "user_id": "u-1",
            "chat_id": "c-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = client_for(&server).sign_in("ada", "pw").await.unwrap();
    assert_eq!(session.access_token, "tok-1");
    assert_eq!(session.user_id, "u-1");
    assert_eq!(session.chat_id.as_deref(), Some("c-1"));
}

#[tokio::test]
async fn test_sign_in_surfaces_server_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).sign_in("ada", "wrong").await.unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_sign_up_posts_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .and(body_json(json!({
            "username": "ada",
            "email": "ada@example.com",
            "password": "pw"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok-2"})))
        .expect(1)
        .mount(&server)
        .await;

    let request = SignUpRequest {
        username: "ada".into(),
        email: "ada@example.com".into(),
        password: "pw".into(),
    };
    let response = client_for(&server).sign_up(&request).await.unwrap();
    assert_eq!(response.access_token, "tok-2");
}

#[tokio::test]
async fn test_list_chats_sends_bearer_and_unwraps_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/u-1/chats"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chats": [
                {"chatId": "c-1", "title": "First", "userId": "u-1"},
                {"chatId": "c-2", "title": "Second", "userId": "u-1"}
            ]
        })))
        .mount(&server)
        .await;

    let chats = client_for(&server)
        .list_chats(&token(), "u-1")
        .await
        .unwrap();
    assert_eq!(chats.len(), 2);
    assert_eq!(chats[0].chat_id, "c-1");
    assert_eq!(chats[1].title, "Second");
}

#[tokio::test]
async fn test_create_chat_round_trips_camel_case_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/u-1/chats"))
        .and(body_json(json!({
            "chatId": "c-9",
            "title": "New Chat",
            "userId": "u-1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chatId": "c-9",
            "title": "New Chat",
            "userId": "u-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let chat = ChatSummary {
        chat_id: "c-9".into(),
        title: "New Chat".into(),
        user_id: "u-1".into(),
    };
    let created = client_for(&server)
        .create_chat(&token(), &chat)
        .await
        .unwrap();
    assert_eq!(created, chat);
}

#[tokio::test]
async fn test_delete_chat_hits_singular_chat_path() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/u-1/chat/c-1"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .delete_chat(&token(), "u-1", "c-1")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_list_messages_decodes_history() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/u-1/chat/c-1/message"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"role": "user", "content": "hello"},
            {"role": "assistant", "content": "hi"},
            {"role": "user", "content": "", "imageFilename": "photo.png"}
        ])))
        .mount(&server)
        .await;

    let records = client_for(&server)
        .list_messages(&token(), "u-1", "c-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2].image_filename.as_deref(), Some("photo.png"));
}

#[tokio::test]
async fn test_list_messages_maps_404_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/u-1/chat/c-empty/message"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found"})))
        .mount(&server)
        .await;

    let records = client_for(&server)
        .list_messages(&token(), "u-1", "c-empty")
        .await
        .unwrap();
    assert!(records.is_none());
}

#[tokio::test]
async fn test_list_messages_other_errors_still_fail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/u-1/chat/c-1/message"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .list_messages(&token(), "u-1", "c-1")
        .await
        .unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(500));
}

#[tokio::test]
async fn test_send_message_posts_full_body_and_decodes_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/u-1/chat/c-1/message"))
        .and(body_json(json!({
            "chatId": "c-1",
            "userId": "u-1",
            "content": "hello",
            "role": "user"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"role": "user", "content": "hello"},
            "assistant": {"content": "hi there"},
            "generated_title": "Greetings",
            "chatId": "c-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = SendMessageRequest {
        chat_id: "c-1".into(),
        user_id: "u-1".into(),
        content: "hello".into(),
        role: "user".into(),
        image_filename: None,
    };
    let response = client_for(&server)
        .send_message(&token(), &request)
        .await
        .unwrap();
    assert_eq!(response.assistant.unwrap().content, "hi there");
    assert_eq!(response.generated_title.as_deref(), Some("Greetings"));
}

#[tokio::test]
async fn test_upload_image_uses_short_path_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/u-1/c-1/upload_image"))
        .and(body_json(json!({
            "image_data": "aGVsbG8=",
            "chatId": "c-1",
            "userId": "u-1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"filename": "img-7.png"})))
        .expect(1)
        .mount(&server)
        .await;

    let request = UploadImageRequest {
        image_data: "aGVsbG8=".into(),
        chat_id: "c-1".into(),
        user_id: "u-1".into(),
    };
    let uploaded = client_for(&server)
        .upload_image(&token(), &request)
        .await
        .unwrap();
    assert_eq!(uploaded.filename, "img-7.png");
}

#[tokio::test]
async fn test_status_error_without_detail_falls_back_to_status_line() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/u-1/chats"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .list_chats(&token(), "u-1")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("502"));
}

#[tokio::test]
async fn test_path_segments_are_percent_encoded() {
    let server = MockServer::start().await;
    // A user id with a space must not split the path; the matcher sees the
    // path exactly as sent, still encoded.
    Mock::given(method("GET"))
        .and(path("/odd%20user/chats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"chats": []})))
        .expect(1)
        .mount(&server)
        .await;

    let chats = client_for(&server)
        .list_chats(&token(), "odd user")
        .await
        .unwrap();
    assert!(chats.is_empty());
}
