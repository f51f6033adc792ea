use tracing::{debug, warn};

use super::ChatSession;

impl ChatSession {
    /// Arm deletion of a chat so the front-end can ask for confirmation.
    /// No network traffic happens here.
    pub fn request_delete(&self, chat_id: impl Into<String>) {
        let chat_id = chat_id.into();
        debug!(chat_id = %chat_id, "delete requested, awaiting confirmation");
        self.lock().set_pending_delete(Some(chat_id));
    }

    /// Disarm a pending deletion.
    pub fn cancel_delete(&self) {
        self.lock().set_pending_delete(None);
    }

    /// Delete the armed chat. The pending id is taken up front, so the
    /// confirmation prompt disarms whatever the outcome.
    ///
    /// Deleting the active chat re-homes the session: a fresh chat when
    /// the backend lets us create one, otherwise the neutral home
    /// location. The session never ends up pointing at a chat that no
    /// longer exists.
    pub async fn confirm_delete(&self) {
        let Some(chat_id) = self.lock().take_pending_delete() else {
            debug!("confirm_delete with nothing armed, ignoring");
            return;
        };
        let user_id = self.user_id();

        debug!(chat_id = %chat_id, "deleting chat");
        if let Err(err) = self.backend().delete_chat(&user_id, &chat_id).await {
            warn!(error = %err, chat_id = %chat_id, "failed to delete chat");
            self.lock().set_error(err.to_string());
            return;
        }

        let was_active = {
            let mut store = self.lock();
            store.remove_chat(&chat_id);
            store.active_chat_id() == Some(chat_id.as_str())
        };
        if !was_active {
            return;
        }

        debug!(chat_id = %chat_id, "deleted the active chat, picking a new home");
        if self.create_chat().await.is_none() {
            // No replacement chat; a neutral location beats pointing at a
            // chat that is gone.
            self.lock().set_active_chat(None);
            self.navigator().open_home();
        }
    }
}
