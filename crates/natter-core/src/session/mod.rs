//! The [`ChatSession`]: all operations a chat front-end can trigger.
//!
//! Operations attempt their network round-trip exactly once and absorb
//! failures into the store's error banner; the view degrades, it never
//! crashes. The store lock is only ever held for a single atomic mutation,
//! never across an await.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::backend::ChatBackend;
use crate::models::SessionStore;
use crate::navigator::Navigator;

mod chat_list;
mod delete;
mod messages;
mod upload;


pub use messages::FALLBACK_ASSISTANT_REPLY;
pub use upload::ANALYSIS_FALLBACK_REPLY;

/// One signed-in user's live view of their chats.
pub struct ChatSession {
    backend: Arc<dyn ChatBackend>,
    navigator: Arc<dyn Navigator>,
    store: Mutex<SessionStore>,
}

impl ChatSession {
    pub fn new(
        user_id: impl Into<String>,
        backend: Arc<dyn ChatBackend>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            backend,
            navigator,
            store: Mutex::new(SessionStore::new(user_id)),
        }
    }

    /// Read the current state under the lock.
    pub fn with_store<T>(&self, f: impl FnOnce(&SessionStore) -> T) -> T {
        f(&self.store.lock())
    }

    /// Store revision, for cheap dirty checks in render loops.
    pub fn revision(&self) -> u64 {
        self.store.lock().revision()
    }

    /// Dismiss the error banner.
    pub fn clear_error(&self) {
        self.store.lock().clear_error();
    }

    /// Dismiss a failed upload back to idle.
    pub fn acknowledge_upload_error(&self) {
        self.store.lock().acknowledge_upload_error();
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, SessionStore> {
        self.store.lock()
    }

    pub(crate) fn backend(&self) -> &Arc<dyn ChatBackend> {
        &self.backend
    }

    pub(crate) fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub(crate) fn user_id(&self) -> String {
        self.store.lock().user_id().to_string()
    }
}
