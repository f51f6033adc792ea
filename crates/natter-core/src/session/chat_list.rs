use tracing::{debug, warn};
use uuid::Uuid;

use natter_client::types::ChatSummary;

use crate::models::{Chat, DEFAULT_CHAT_TITLE};

use super::ChatSession;

impl ChatSession {
    /// Fetch the user's chats and replace the sidebar list wholesale.
    ///
    /// Safe to call repeatedly; a failure raises the banner and keeps
    /// whatever list was already shown.
    pub async fn load_chats(&self) {
        let user_id = self.user_id();
        debug!(user_id = %user_id, "loading chat list");

        match self.backend().list_chats(&user_id).await {
            Ok(summaries) => {
                let chats: Vec<Chat> = summaries.into_iter().map(Chat::from).collect();
                debug!(count = chats.len(), "chat list loaded");
                self.lock().set_chats(chats);
            }
            Err(err) => {
                warn!(error = %err, "failed to load chat list");
                self.lock().set_error(err.to_string());
            }
        }
    }

    /// Create a chat under a fresh client-generated id, make it active and
    /// navigate into it.
    ///
    /// Returns the confirmed chat, or `None` when nothing was created; in
    /// that case the session state is exactly as before, plus the banner.
    pub async fn create_chat(&self) -> Option<Chat> {
        let user_id = self.user_id();
        let request = ChatSummary {
            chat_id: Uuid::new_v4().to_string(),
            title: DEFAULT_CHAT_TITLE.to_string(),
            user_id: user_id.clone(),
        };
        debug!(chat_id = %request.chat_id, "creating chat");

        match self.backend().create_chat(request).await {
            Ok(confirmed) => {
                let chat = Chat::from(confirmed);
                {
                    let mut store = self.lock();
                    store.push_chat(chat.clone());
                    store.set_active_chat(Some(chat.chat_id.clone()));
                }
                self.navigator().open_chat(&user_id, &chat.chat_id);
                Some(chat)
            }
            Err(err) => {
                warn!(error = %err, "failed to create chat");
                self.lock().set_error(err.to_string());
                None
            }
        }
    }

    /// Apply a server-generated title to exactly the matching chat.
    ///
    /// Titles only arrive embedded in message-send responses; the session
    /// never asks for one. A signal for an unknown chat is dropped.
    pub fn rename_chat_title(&self, chat_id: &str, title: &str) {
        if self.lock().rename_chat(chat_id, title) {
            debug!(chat_id = chat_id, title = title, "chat title updated from server");
        } else {
            warn!(chat_id = chat_id, "title signal for unknown chat, ignoring");
        }
    }
}
