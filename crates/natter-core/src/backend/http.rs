use natter_client::types::{
    ChatSummary, MessageRecord, SendMessageRequest, SendMessageResponse, UploadImageRequest,
    UploadedImage,
};
use natter_client::{ApiClient, AuthToken};

use super::{BackendResult, BoxFuture, ChatBackend};

/// Backend implementation speaking to a real server through [`ApiClient`].
///
/// The bearer token is part of the value: a backend cannot be built
/// without credentials, so no call site ever consults ambient storage or
/// sends an unauthenticated chat request.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    api: ApiClient,
    token: AuthToken,
}

impl HttpBackend {
    pub fn new(api: ApiClient, token: AuthToken) -> Self {
        Self { api, token }
    }

    /// The underlying API client, e.g. for building image URLs.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}

impl ChatBackend for HttpBackend {
    fn list_chats(&self, user_id: &str) -> BoxFuture<'static, BackendResult<Vec<ChatSummary>>> {
        let this = self.clone();
        let user_id = user_id.to_string();
        Box::pin(async move { Ok(this.api.list_chats(&this.token, &user_id).await?) })
    }

    fn create_chat(&self, chat: ChatSummary) -> BoxFuture<'static, BackendResult<ChatSummary>> {
        let this = self.clone();
        Box::pin(async move { Ok(this.api.create_chat(&this.token, &chat).await?) })
    }

    fn delete_chat(&self, user_id: &str, chat_id: &str) -> BoxFuture<'static, BackendResult<()>> {
        let this = self.clone();
        let user_id = user_id.to_string();
        let chat_id = chat_id.to_string();
        Box::pin(async move { Ok(this.api.delete_chat(&this.token, &user_id, &chat_id).await?) })
    }

    fn fetch_history(
        &self,
        user_id: &str,
        chat_id: &str,
    ) -> BoxFuture<'static, BackendResult<Option<Vec<MessageRecord>>>> {
        let this = self.clone();
        let user_id = user_id.to_string();
        let chat_id = chat_id.to_string();
        Box::pin(async move { Ok(this.api.list_messages(&this.token, &user_id, &chat_id).await?) })
    }

    fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> BoxFuture<'static, BackendResult<SendMessageResponse>> {
        let this = self.clone();
        Box::pin(async move { Ok(this.api.send_message(&this.token, &request).await?) })
    }

    fn upload_image(
        &self,
        request: UploadImageRequest,
    ) -> BoxFuture<'static, BackendResult<UploadedImage>> {
        let this = self.clone();
        Box::pin(async move { Ok(this.api.upload_image(&this.token, &request).await?) })
    }
}
