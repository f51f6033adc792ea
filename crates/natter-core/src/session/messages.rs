use tracing::{debug, warn};

use natter_client::types::SendMessageRequest;

use crate::models::{Message, Sender};

use super::ChatSession;

/// Assistant text substituted when a reply arrives without content; the
/// transcript never shows a one-sided exchange.
pub const FALLBACK_ASSISTANT_REPLY: &str = "No response.";

impl ChatSession {
    /// Point the view at a chat without refreshing its history. Used when
    /// the transcript is known to be empty (a chat created seconds ago) or
    /// when the caller schedules the refresh itself.
    pub fn activate_chat(&self, chat_id: &str) {
        self.lock().set_active_chat(Some(chat_id.to_string()));
    }

    /// Switch to a chat and load its transcript.
    pub async fn open_chat(&self, chat_id: &str) {
        self.activate_chat(chat_id);
        self.load_messages().await;
    }

    /// Fetch the active chat's history and replace the transcript.
    ///
    /// No-op while an upload is in flight: the optimistically shown image
    /// message is not in the server's history yet, so a refresh would drop
    /// it. Results that return after the view moved on (chat switched, or
    /// a local append since the fetch was issued) are discarded unseen.
    pub async fn load_messages(&self) {
        let (user_id, chat_id, issued_epoch) = {
            let store = self.lock();
            if store.upload_in_flight() {
                debug!("history fetch suppressed while upload in flight");
                return;
            }
            let Some(chat_id) = store.active_chat_id() else {
                debug!("no active chat, nothing to load");
                return;
            };
            (
                store.user_id().to_string(),
                chat_id.to_string(),
                store.history_epoch(),
            )
        };

        debug!(chat_id = %chat_id, "loading history");
        let result = self.backend().fetch_history(&user_id, &chat_id).await;

        let mut store = self.lock();
        if store.history_epoch() != issued_epoch {
            debug!(chat_id = %chat_id, "history result is stale, discarding");
            return;
        }
        match result {
            Ok(Some(records)) => {
                let messages: Vec<Message> = records.into_iter().map(Message::from).collect();
                debug!(count = messages.len(), "history loaded");
                store.set_messages(messages);
            }
            // A chat with no stored messages is a normal state.
            Ok(None) => {
                debug!(chat_id = %chat_id, "no history yet, showing empty chat");
                store.set_messages(Vec::new());
            }
            Err(err) => {
                warn!(error = %err, chat_id = %chat_id, "failed to load history, keeping current view");
                store.set_error(err.to_string());
            }
        }
    }

    /// Send a text message in the active chat and append the confirmed
    /// `[user, assistant]` pair as one atomic update.
    ///
    /// Whitespace-only input is a no-op: no request, no state change. On
    /// failure the banner is raised and the transcript stays as it was;
    /// the input the caller already cleared is not restored. A reply that
    /// lands after the user switched chats is dropped, though an embedded
    /// title signal still applies, titles address the list rather than the
    /// transcript.
    pub async fn send_message(&self, text: &str) {
        let body = text.trim();
        if body.is_empty() {
            debug!("ignoring empty message");
            return;
        }

        let (user_id, chat_id, issued_generation) = {
            let store = self.lock();
            let Some(chat_id) = store.active_chat_id() else {
                debug!("no active chat, dropping message");
                return;
            };
            (
                store.user_id().to_string(),
                chat_id.to_string(),
                store.generation(),
            )
        };

        let request = SendMessageRequest {
            chat_id: chat_id.clone(),
            user_id,
            content: body.to_string(),
            role: Sender::User.as_role().to_string(),
            image_filename: None,
        };
        debug!(chat_id = %chat_id, chars = body.len(), "sending message");

        match self.backend().send_message(request).await {
            Ok(response) => {
                let reply = response
                    .assistant
                    .map(|a| a.content)
                    .filter(|content| !content.trim().is_empty())
                    .unwrap_or_else(|| {
                        warn!(chat_id = %chat_id, "reply carried no assistant content, using fallback");
                        FALLBACK_ASSISTANT_REPLY.to_string()
                    });

                {
                    let mut store = self.lock();
                    if store.is_current_chat(issued_generation) {
                        store.push_exchange(
                            Message::text(Sender::User, body),
                            Message::text(Sender::Assistant, reply),
                        );
                    } else {
                        debug!(chat_id = %chat_id, "reply arrived after chat switch, not shown");
                    }
                }

                if let Some(title) = response.generated_title {
                    let target = response.chat_id.unwrap_or(chat_id);
                    self.rename_chat_title(&target, &title);
                }
            }
            Err(err) => {
                warn!(error = %err, chat_id = %chat_id, "failed to send message");
                self.lock().set_error(err.to_string());
            }
        }
    }
}
