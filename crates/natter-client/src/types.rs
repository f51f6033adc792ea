//! Wire types for the backend's REST contract.
//!
//! The contract mixes naming conventions: identifiers travel as camelCase
//! (`chatId`, `userId`, `imageFilename`) while auth and upload fields are
//! snake_case (`access_token`, `image_data`). The renames below are
//! per-field on purpose; a container-level `rename_all` would silently
//! break half of them.

use serde::{Deserialize, Serialize};

/// A chat as the backend reports it. Doubles as the create-chat request
/// body, which carries exactly the same three fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    #[serde(rename = "chatId")]
    pub chat_id: String,
    pub title: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Response body of `GET /{userId}/chats`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatListResponse {
    pub chats: Vec<ChatSummary>,
}

/// One entry of a chat's stored history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub role: String,
    pub content: String,
    #[serde(
        rename = "imageFilename",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub image_filename: Option<String>,
}

/// Request body of `POST /{userId}/chat/{chatId}/message`.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    #[serde(rename = "chatId")]
    pub chat_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub content: String,
    pub role: String,
    #[serde(
        rename = "imageFilename",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub image_filename: Option<String>,
}

/// The assistant half of a send-message response.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantReply {
    pub content: String,
}

/// Response body of `POST /{userId}/chat/{chatId}/message`.
///
/// All fields are optional in practice; the session layer decides what a
/// missing assistant reply means rather than failing the decode.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendMessageResponse {
    #[serde(default)]
    pub user: Option<MessageRecord>,
    #[serde(default)]
    pub assistant: Option<AssistantReply>,
    /// Set when the backend derived a chat title from the first exchange.
    #[serde(default)]
    pub generated_title: Option<String>,
    #[serde(rename = "chatId", default)]
    pub chat_id: Option<String>,
}

/// Request body of `POST /{userId}/{chatId}/upload_image`.
#[derive(Debug, Clone, Serialize)]
pub struct UploadImageRequest {
    /// Base64-encoded file contents.
    pub image_data: String,
    #[serde(rename = "chatId")]
    pub chat_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Response body of a successful image upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedImage {
    /// Server-assigned filename, later referenced by history records and
    /// served under the backend's static path.
    pub filename: String,
}

/// Response body of `POST /login`.
#[derive(Debug, Clone, Deserialize)]
pub struct SignInResponse {
    pub access_token: String,
    pub user_id: String,
    /// Chat the backend suggests opening first.
    #[serde(default)]
    pub chat_id: Option<String>,
}

/// Request body of `POST /register`.
#[derive(Debug, Clone, Serialize)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Response body of `POST /register`. Registration returns a token but no
/// user id, so a fresh account still signs in normally afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct SignUpResponse {
    pub access_token: String,
}

/// Error body most endpoints use for non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}
