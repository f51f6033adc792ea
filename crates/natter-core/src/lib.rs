//! Session orchestration for the Natter chat client.
//!
//! Keeps an in-memory view of a signed-in user's chats and the active
//! chat's transcript consistent with the remote backend under optimistic,
//! asynchronous, partially-failing operations. Front-ends render straight
//! from the [`SessionStore`] snapshot and redraw when its revision moves;
//! all mutation goes through [`ChatSession`] operations, which absorb
//! failures into a dismissible error banner instead of propagating them.

pub mod backend;
pub mod models;
pub mod navigator;
pub mod session;

pub use backend::{BackendError, BackendResult, BoxFuture, ChatBackend, HttpBackend, InMemoryBackend};
pub use models::{Chat, DEFAULT_CHAT_TITLE, Message, MessageKind, Sender, SessionStore, UploadPhase};
pub use navigator::Navigator;
pub use session::ChatSession;
