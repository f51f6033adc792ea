pub mod chat;
pub mod message;
pub mod store;
pub mod upload;

pub use chat::{Chat, DEFAULT_CHAT_TITLE};
pub use message::{Message, MessageKind, Sender};
pub use store::SessionStore;
pub use upload::UploadPhase;
