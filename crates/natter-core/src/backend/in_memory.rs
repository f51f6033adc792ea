use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use natter_client::types::{
    AssistantReply, ChatSummary, MessageRecord, SendMessageRequest, SendMessageResponse,
    UploadImageRequest, UploadedImage,
};

use super::{BackendError, BackendResult, BoxFuture, ChatBackend};

/// In-memory chat backend for tests and offline development.
///
/// Behaves like a well-mannered server: echoes the user's message back as
/// the assistant reply, derives a chat title from the first exchange, and
/// accepts any upload. Chats with no stored messages report no history,
/// matching the real backend's 404 rule.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    chats: Vec<ChatSummary>,
    histories: HashMap<String, Vec<MessageRecord>>,
}

/// First line of the message, capped for the sidebar.
fn derive_title(content: &str) -> String {
    let first_line = content.trim().lines().next().unwrap_or("").trim();
    let capped: String = first_line.chars().take(40).collect();
    if capped.len() < first_line.len() {
        format!("{capped}...")
    } else {
        capped
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chat with pre-existing history, as if restored from a
    /// previous session.
    pub fn seed_chat(&self, chat: ChatSummary, history: Vec<MessageRecord>) {
        let mut state = self.state.lock();
        if !history.is_empty() {
            state.histories.insert(chat.chat_id.clone(), history);
        }
        state.chats.push(chat);
    }
}

impl ChatBackend for InMemoryBackend {
    fn list_chats(&self, user_id: &str) -> BoxFuture<'static, BackendResult<Vec<ChatSummary>>> {
        let state = self.state.clone();
        let user_id = user_id.to_string();

        Box::pin(async move {
            let state = state.lock();
            Ok(state
                .chats
                .iter()
                .filter(|chat| chat.user_id == user_id)
                .cloned()
                .collect())
        })
    }

    fn create_chat(&self, chat: ChatSummary) -> BoxFuture<'static, BackendResult<ChatSummary>> {
        let state = self.state.clone();

        Box::pin(async move {
            let mut state = state.lock();
            if state.chats.iter().any(|existing| existing.chat_id == chat.chat_id) {
                return Err(BackendError::Other(format!(
                    "chat {} already exists",
                    chat.chat_id
                )));
            }
            state.chats.push(chat.clone());
            Ok(chat)
        })
    }

    fn delete_chat(&self, _user_id: &str, chat_id: &str) -> BoxFuture<'static, BackendResult<()>> {
        let state = self.state.clone();
        let chat_id = chat_id.to_string();

        Box::pin(async move {
            let mut state = state.lock();
            state.chats.retain(|chat| chat.chat_id != chat_id);
            state.histories.remove(&chat_id);
            Ok(())
        })
    }

    fn fetch_history(
        &self,
        _user_id: &str,
        chat_id: &str,
    ) -> BoxFuture<'static, BackendResult<Option<Vec<MessageRecord>>>> {
        let state = self.state.clone();
        let chat_id = chat_id.to_string();

        Box::pin(async move {
            let state = state.lock();
            Ok(state.histories.get(&chat_id).cloned())
        })
    }

    fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> BoxFuture<'static, BackendResult<SendMessageResponse>> {
        let state = self.state.clone();

        Box::pin(async move {
            let mut state = state.lock();
            if !state.chats.iter().any(|chat| chat.chat_id == request.chat_id) {
                return Err(BackendError::Other(format!(
                    "no such chat: {}",
                    request.chat_id
                )));
            }

            let history = state.histories.entry(request.chat_id.clone()).or_default();
            let first_exchange = history.is_empty();

            let user_record = MessageRecord {
                role: request.role.clone(),
                content: request.content.clone(),
                image_filename: request.image_filename.clone(),
            };
            history.push(user_record.clone());

            let reply = match &request.image_filename {
                Some(filename) => format!("Received {filename}."),
                None => format!("You said: {}", request.content),
            };
            history.push(MessageRecord {
                role: "assistant".to_string(),
                content: reply.clone(),
                image_filename: None,
            });

            let generated_title = if first_exchange && !request.content.trim().is_empty() {
                let title = derive_title(&request.content);
                if let Some(chat) = state
                    .chats
                    .iter_mut()
                    .find(|chat| chat.chat_id == request.chat_id)
                {
                    chat.title = title.clone();
                }
                Some(title)
            } else {
                None
            };

            Ok(SendMessageResponse {
                user: Some(user_record),
                assistant: Some(AssistantReply { content: reply }),
                generated_title,
                chat_id: Some(request.chat_id),
            })
        })
    }

    fn upload_image(
        &self,
        request: UploadImageRequest,
    ) -> BoxFuture<'static, BackendResult<UploadedImage>> {
        let state = self.state.clone();

        Box::pin(async move {
            let state = state.lock();
            if !state.chats.iter().any(|chat| chat.chat_id == request.chat_id) {
                return Err(BackendError::Other(format!(
                    "no such chat: {}",
                    request.chat_id
                )));
            }
            Ok(UploadedImage {
                filename: format!("upload-{}.png", Uuid::new_v4()),
            })
        })
    }
}
