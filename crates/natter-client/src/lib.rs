//! Client library for the Natter chat backend.
//!
//! Speaks the backend's REST contract directly: form-encoded sign-in,
//! bearer-token chat operations, message history and base64 image uploads.
//! Every call attempts the request exactly once and reports the outcome;
//! retry and recovery policy belong to the layers above.

pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use auth::AuthToken;
pub use client::{ApiClient, ApiConfig, DEFAULT_REQUEST_TIMEOUT};
pub use error::ApiError;
