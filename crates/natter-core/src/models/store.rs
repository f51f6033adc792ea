use tracing::warn;

use super::chat::Chat;
use super::message::Message;
use super::upload::UploadPhase;

/// Client-side state for one signed-in chat session.
///
/// The store is plain data plus atomic mutations: every mutator finishes
/// in a single call under the caller's lock, so a render never observes a
/// half-applied update (a user message without its reply, a removed chat
/// still marked active). Each observable change bumps [`revision`];
/// front-ends redraw when the revision moves.
///
/// Two more counters order asynchronous results against the state they
/// were issued for:
///
/// * [`generation`] advances when the active chat changes. An operation
///   that wants to append something "to the chat the user was looking at"
///   captures it first and checks it on completion.
/// * [`history_epoch`] advances on chat changes and additionally on every
///   local append. A history fetch replaces the whole transcript, so its
///   result is only valid if nothing diverged the view after it was
///   issued.
///
/// [`revision`]: SessionStore::revision
/// [`generation`]: SessionStore::generation
/// [`history_epoch`]: SessionStore::history_epoch
#[derive(Debug)]
pub struct SessionStore {
    user_id: String,
    active_chat_id: Option<String>,
    chats: Vec<Chat>,
    messages: Vec<Message>,
    upload: UploadPhase,
    pending_delete: Option<String>,
    last_error: Option<String>,
    generation: u64,
    history_epoch: u64,
    revision: u64,
}

impl SessionStore {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            active_chat_id: None,
            chats: Vec::new(),
            messages: Vec::new(),
            upload: UploadPhase::Idle,
            pending_delete: None,
            last_error: None,
            generation: 0,
            history_epoch: 0,
            revision: 0,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn active_chat_id(&self) -> Option<&str> {
        self.active_chat_id.as_deref()
    }

    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    pub fn chat(&self, chat_id: &str) -> Option<&Chat> {
        self.chats.iter().find(|chat| chat.chat_id == chat_id)
    }

    /// Transcript of the active chat, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn upload(&self) -> &UploadPhase {
        &self.upload
    }

    pub fn upload_in_flight(&self) -> bool {
        self.upload.in_flight()
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn history_epoch(&self) -> u64 {
        self.history_epoch
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True when the active chat has not changed since `issued` was read.
    pub fn is_current_chat(&self, issued: u64) -> bool {
        self.generation == issued
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Replace the whole chat list. Duplicate ids keep their first
    /// occurrence.
    pub fn set_chats(&mut self, chats: Vec<Chat>) {
        let mut unique: Vec<Chat> = Vec::with_capacity(chats.len());
        for chat in chats {
            if unique.iter().any(|existing| existing.chat_id == chat.chat_id) {
                warn!(chat_id = %chat.chat_id, "duplicate chat id in list, keeping first");
                continue;
            }
            unique.push(chat);
        }
        self.chats = unique;
        self.touch();
    }

    pub fn push_chat(&mut self, chat: Chat) {
        if self.chats.iter().any(|existing| existing.chat_id == chat.chat_id) {
            warn!(chat_id = %chat.chat_id, "chat already listed, not adding again");
            return;
        }
        self.chats.push(chat);
        self.touch();
    }

    pub fn remove_chat(&mut self, chat_id: &str) -> bool {
        let before = self.chats.len();
        self.chats.retain(|chat| chat.chat_id != chat_id);
        let removed = self.chats.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Retitle exactly the matching chat. Returns false for unknown ids.
    pub fn rename_chat(&mut self, chat_id: &str, title: impl Into<String>) -> bool {
        match self.chats.iter_mut().find(|chat| chat.chat_id == chat_id) {
            Some(chat) => {
                chat.title = title.into();
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Point the message view at another chat. The transcript belongs to
    /// exactly one chat, so switching empties it immediately and advances
    /// both counters: results of requests issued for the previous chat no
    /// longer apply. Re-selecting the already active chat is a no-op.
    pub fn set_active_chat(&mut self, chat_id: Option<String>) {
        if self.active_chat_id == chat_id {
            return;
        }
        self.active_chat_id = chat_id;
        self.messages.clear();
        self.generation += 1;
        self.history_epoch += 1;
        self.touch();
    }

    /// Replace the transcript with a fetched history. One assignment, not
    /// a merge.
    pub fn set_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.touch();
    }

    /// Replace the transcript only if no switch or append happened since
    /// the fetch was issued. Returns false when the result was stale.
    pub fn apply_history_if_current(&mut self, issued_epoch: u64, messages: Vec<Message>) -> bool {
        if self.history_epoch != issued_epoch {
            return false;
        }
        self.set_messages(messages);
        true
    }

    /// Append a user message and its reply as one update; a render sees
    /// both or neither.
    pub fn push_exchange(&mut self, user: Message, assistant: Message) {
        self.messages.push(user);
        self.messages.push(assistant);
        self.history_epoch += 1;
        self.touch();
    }

    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.history_epoch += 1;
        self.touch();
    }

    pub fn set_upload_phase(&mut self, phase: UploadPhase) {
        self.upload = phase;
        self.touch();
    }

    /// Dismiss a failed upload back to idle. Does nothing in other phases.
    pub fn acknowledge_upload_error(&mut self) {
        if matches!(self.upload, UploadPhase::Errored(_)) {
            self.upload = UploadPhase::Idle;
            self.touch();
        }
    }

    pub fn set_pending_delete(&mut self, chat_id: Option<String>) {
        self.pending_delete = chat_id;
        self.touch();
    }

    pub fn take_pending_delete(&mut self) -> Option<String> {
        let taken = self.pending_delete.take();
        if taken.is_some() {
            self.touch();
        }
        taken
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
        self.touch();
    }

    pub fn clear_error(&mut self) {
        if self.last_error.take().is_some() {
            self.touch();
        }
    }
}
