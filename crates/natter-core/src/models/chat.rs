use natter_client::types::ChatSummary;

/// Title given to chats the user has not named yet. The backend replaces
/// it once it derives a real title from the first exchange.
pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

/// A chat as the session tracks it in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    pub chat_id: String,
    pub title: String,
    pub user_id: String,
}

impl From<ChatSummary> for Chat {
    fn from(summary: ChatSummary) -> Self {
        Self {
            chat_id: summary.chat_id,
            title: summary.title,
            user_id: summary.user_id,
        }
    }
}

impl From<Chat> for ChatSummary {
    fn from(chat: Chat) -> Self {
        Self {
            chat_id: chat.chat_id,
            title: chat.title,
            user_id: chat.user_id,
        }
    }
}
