//! Backend abstraction for the remote chat service.
//!
//! The session layer talks to this trait, never to HTTP directly. The
//! shipped implementations are [`HttpBackend`] for a real server and
//! [`InMemoryBackend`] for tests and offline development.

use std::future::Future;
use std::pin::Pin;

use natter_client::ApiError;
use natter_client::types::{
    ChatSummary, MessageRecord, SendMessageRequest, SendMessageResponse, UploadImageRequest,
    UploadedImage,
};
use thiserror::Error;

pub mod http;
pub mod in_memory;

pub use http::HttpBackend;
pub use in_memory::InMemoryBackend;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Error type for backend operations
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("{0}")]
    Other(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// The remote chat service at its seam.
///
/// Every operation attempts its request exactly once and reports failure;
/// what a failure means (banner, fallback text, abandoned navigation) is
/// session policy, not backend policy.
///
/// This trait is object-safe and used as `Arc<dyn ChatBackend>`.
pub trait ChatBackend: Send + Sync + 'static {
    /// List the user's chats.
    fn list_chats(&self, user_id: &str) -> BoxFuture<'static, BackendResult<Vec<ChatSummary>>>;

    /// Create a chat from a client-chosen id and title; the result is the
    /// chat as the server stored it.
    fn create_chat(&self, chat: ChatSummary) -> BoxFuture<'static, BackendResult<ChatSummary>>;

    /// Delete a chat.
    fn delete_chat(&self, user_id: &str, chat_id: &str) -> BoxFuture<'static, BackendResult<()>>;

    /// Fetch a chat's stored history.
    ///
    /// # Returns
    /// * `Ok(Some(records))` - stored history, oldest first
    /// * `Ok(None)` - the chat has no history yet; a normal state
    /// * `Err(e)` - the fetch itself failed
    fn fetch_history(
        &self,
        user_id: &str,
        chat_id: &str,
    ) -> BoxFuture<'static, BackendResult<Option<Vec<MessageRecord>>>>;

    /// Submit a message and wait for the assistant's reply.
    fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> BoxFuture<'static, BackendResult<SendMessageResponse>>;

    /// Store an image and learn the server-assigned filename.
    fn upload_image(
        &self,
        request: UploadImageRequest,
    ) -> BoxFuture<'static, BackendResult<UploadedImage>>;
}
