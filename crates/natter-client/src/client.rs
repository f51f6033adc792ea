//! HTTP client for the chat backend.
//!
//! One method per endpoint, mirroring the REST contract exactly. Auth is
//! explicit: chat operations take the [`AuthToken`] as a parameter instead
//! of reading ambient credential storage.

use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, PercentEncode, utf8_percent_encode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::auth::AuthToken;
use crate::error::{ApiError, ApiResult};
use crate::types::{
    ChatListResponse, ChatSummary, ErrorBody, MessageRecord, SendMessageRequest,
    SendMessageResponse, SignInResponse, SignUpRequest, SignUpResponse, UploadImageRequest,
    UploadedImage,
};

/// Applied to every request unless the caller opts out.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// RFC 3986 unreserved characters stay raw, everything else is escaped.
// Used both for path segments and for form-encoded bodies.
const ESCAPED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn seg(raw: &str) -> PercentEncode<'_> {
    utf8_percent_encode(raw, ESCAPED)
}

fn form_encode(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", seg(key), seg(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the backend, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Per-request timeout. `None` disables the timeout entirely.
    pub timeout: Option<Duration>,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Some(DEFAULT_REQUEST_TIMEOUT),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }
}

/// HTTP client for the chat backend's REST API.
///
/// Cheap to clone; all clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ApiError::BadBaseUrl(config.base_url));
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("natter/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self { http, base_url })
    }

    /// Base URL this client talks to, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL under which the backend serves an uploaded image.
    pub fn image_url(&self, filename: &str) -> String {
        format!("{}/static/{}", self.base_url, seg(filename))
    }

    /// Exchange credentials for a token via `POST /login`.
    ///
    /// The endpoint takes a form-encoded body, unlike the rest of the API.
    pub async fn sign_in(&self, username: &str, password: &str) -> ApiResult<SignInResponse> {
        let url = format!("{}/login", self.base_url);
        debug!(url = %url, "signing in");

        let body = form_encode(&[("username", username), ("password", password)]);
        let response = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        Self::decode(Self::check_status(response).await?).await
    }

    /// Create an account via `POST /register`.
    pub async fn sign_up(&self, request: &SignUpRequest) -> ApiResult<SignUpResponse> {
        let url = format!("{}/register", self.base_url);
        debug!(url = %url, username = %request.username, "registering account");

        let response = self.http.post(&url).json(request).send().await?;
        Self::decode(Self::check_status(response).await?).await
    }

    /// List a user's chats via `GET /{userId}/chats`.
    pub async fn list_chats(&self, token: &AuthToken, user_id: &str) -> ApiResult<Vec<ChatSummary>> {
        let url = format!("{}/{}/chats", self.base_url, seg(user_id));
        debug!(url = %url, "listing chats");

        let response = self
            .http
            .get(&url)
            .bearer_auth(token.as_str())
            .send()
            .await?;
        let body: ChatListResponse = Self::decode(Self::check_status(response).await?).await?;
        Ok(body.chats)
    }

    /// Create a chat via `POST /{userId}/chats`. The caller supplies the id
    /// and title; the response echoes the chat as the server stored it.
    pub async fn create_chat(&self, token: &AuthToken, chat: &ChatSummary) -> ApiResult<ChatSummary> {
        let url = format!("{}/{}/chats", self.base_url, seg(&chat.user_id));
        debug!(url = %url, chat_id = %chat.chat_id, "creating chat");

        let response = self
            .http
            .post(&url)
            .bearer_auth(token.as_str())
            .json(chat)
            .send()
            .await?;
        Self::decode(Self::check_status(response).await?).await
    }

    /// Delete a chat via `DELETE /{userId}/chat/{chatId}`. Any 2xx counts
    /// as deleted; the response body is not interpreted.
    pub async fn delete_chat(&self, token: &AuthToken, user_id: &str, chat_id: &str) -> ApiResult<()> {
        let url = format!("{}/{}/chat/{}", self.base_url, seg(user_id), seg(chat_id));
        debug!(url = %url, "deleting chat");

        let response = self
            .http
            .delete(&url)
            .bearer_auth(token.as_str())
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// Fetch a chat's history via `GET /{userId}/chat/{chatId}/message`.
    ///
    /// Returns `Ok(None)` on 404: the backend answers that way for chats
    /// that exist but have no stored messages yet, so it is a normal state
    /// rather than a failure.
    pub async fn list_messages(
        &self,
        token: &AuthToken,
        user_id: &str,
        chat_id: &str,
    ) -> ApiResult<Option<Vec<MessageRecord>>> {
        let url = format!(
            "{}/{}/chat/{}/message",
            self.base_url,
            seg(user_id),
            seg(chat_id)
        );
        debug!(url = %url, "fetching history");

        let response = self
            .http
            .get(&url)
            .bearer_auth(token.as_str())
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!(chat_id = chat_id, "no history stored for chat");
            return Ok(None);
        }
        let records = Self::decode(Self::check_status(response).await?).await?;
        Ok(Some(records))
    }

    /// Submit a message via `POST /{userId}/chat/{chatId}/message` and wait
    /// for the assistant's reply.
    pub async fn send_message(
        &self,
        token: &AuthToken,
        request: &SendMessageRequest,
    ) -> ApiResult<SendMessageResponse> {
        let url = format!(
            "{}/{}/chat/{}/message",
            self.base_url,
            seg(&request.user_id),
            seg(&request.chat_id)
        );
        debug!(url = %url, chars = request.content.len(), "sending message");

        let response = self
            .http
            .post(&url)
            .bearer_auth(token.as_str())
            .json(request)
            .send()
            .await?;
        Self::decode(Self::check_status(response).await?).await
    }

    /// Upload a base64-encoded image via `POST /{userId}/{chatId}/upload_image`.
    /// Note the path shape: this endpoint has no `/chat/` segment.
    pub async fn upload_image(
        &self,
        token: &AuthToken,
        request: &UploadImageRequest,
    ) -> ApiResult<UploadedImage> {
        let url = format!(
            "{}/{}/{}/upload_image",
            self.base_url,
            seg(&request.user_id),
            seg(&request.chat_id)
        );
        debug!(url = %url, encoded_bytes = request.image_data.len(), "uploading image");

        let response = self
            .http
            .post(&url)
            .bearer_auth(token.as_str())
            .json(request)
            .send()
            .await?;
        Self::decode(Self::check_status(response).await?).await
    }

    /// Pass 2xx responses through; turn anything else into
    /// [`ApiError::Status`], salvaging the server's `detail` message when
    /// the body carries one.
    async fn check_status(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = response
            .text()
            .await
            .ok()
            .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
            .and_then(|body| body.detail)
            .filter(|detail| !detail.trim().is_empty());
        let message = match detail {
            Some(detail) => detail,
            None => format!("server returned {status}"),
        };
        warn!(status = %status, message = %message, "request rejected");
        Err(ApiError::Status { status, message })
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_base_url() {
        let result = ApiClient::new(ApiConfig::new("localhost:8000"));
        assert!(matches!(result, Err(ApiError::BadBaseUrl(_))));
    }

    #[test]
    fn test_trims_trailing_slash() {
        let client = ApiClient::new(ApiConfig::new("http://localhost:8000/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_image_url_escapes_filename() {
        let client = ApiClient::new(ApiConfig::new("http://localhost:8000")).unwrap();
        assert_eq!(
            client.image_url("cat photo.png"),
            "http://localhost:8000/static/cat%20photo.png"
        );
    }

    #[test]
    fn test_form_encode_escapes_reserved_characters() {
        let body = form_encode(&[("username", "ada@example.com"), ("password", "p&ss=1")]);
        assert_eq!(body, "username=ada%40example.com&password=p%26ss%3D1");
    }
}
