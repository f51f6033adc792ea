use std::fmt;

use crate::error::{ApiError, ApiResult};

/// Bearer token handed out by the sign-in endpoint.
///
/// Construction rejects empty input, so any call site holding an
/// `AuthToken` holds actual credentials; an absent or blank token is the
/// caller's signal to return to sign-in instead of issuing doomed requests.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(raw: impl Into<String>) -> ApiResult<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ApiError::EmptyToken);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens show up in logs via request context; never print the secret.
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}
