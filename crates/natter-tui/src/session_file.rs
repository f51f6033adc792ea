//! Persisted sign-in state, so a relaunch goes straight back into the chat.

use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What survives between runs: the credentials and where the user left off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub user_id: String,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_chat_id: Option<String>,
    pub saved_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn new(user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: access_token.into(),
            last_chat_id: None,
            saved_at: Utc::now(),
        }
    }
}

/// JSON file under the user's config directory holding one [`StoredSession`].
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    /// Default location: `<config dir>/natter/session.json`.
    pub fn new() -> anyhow::Result<Self> {
        let config_dir = dirs::config_dir().context("cannot determine config directory")?;
        Ok(Self {
            path: config_dir.join("natter").join("session.json"),
        })
    }

    /// File at a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the stored session. A missing file means signed out; an
    /// unreadable one is treated the same way rather than blocking launch.
    pub async fn load(&self) -> Option<StoredSession> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return None,
            Err(error) => {
                warn!(path = %self.path.display(), error = %error, "could not read session file");
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(session) => Some(session),
            Err(error) => {
                warn!(path = %self.path.display(), error = %error, "session file is corrupt, ignoring it");
                None
            }
        }
    }

    /// Write the session atomically using a temp file and rename.
    pub async fn save(&self, session: &StoredSession) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(session).context("encoding session")?;
        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, json)
            .await
            .with_context(|| format!("writing {}", temp_path.display()))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }

    /// Record the chat the user is looking at. No-op when signed out.
    pub async fn remember_chat(&self, chat_id: &str) -> anyhow::Result<()> {
        let Some(mut session) = self.load().await else {
            return Ok(());
        };
        session.last_chat_id = Some(chat_id.to_string());
        session.saved_at = Utc::now();
        self.save(&session).await
    }

    /// Drop the remembered chat but keep the credentials.
    pub async fn forget_chat(&self) -> anyhow::Result<()> {
        let Some(mut session) = self.load().await else {
            return Ok(());
        };
        session.last_chat_id = None;
        session.saved_at = Utc::now();
        self.save(&session).await
    }

    /// Sign out: remove the file entirely.
    pub async fn clear(&self) -> anyhow::Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error).with_context(|| format!("removing {}", self.path.display())),
        }
    }
}
