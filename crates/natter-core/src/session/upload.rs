use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{debug, warn};

use natter_client::types::{SendMessageRequest, UploadImageRequest};

use crate::models::{Message, Sender, UploadPhase};

use super::ChatSession;

/// Assistant text substituted when the image analysis request fails or
/// returns empty; an uploaded image never sits unanswered.
pub const ANALYSIS_FALLBACK_REPLY: &str = "I couldn't analyze that image.";

impl ChatSession {
    /// Turn a local image file into a chat exchange: read and
    /// base64-encode it, upload it, show the image message as soon as the
    /// server has it, then request the assistant's take on it.
    ///
    /// Phases walk `Idle -> Reading -> Uploading -> AwaitingAiReply ->
    /// Idle`. A failure before the image message exists parks the pipeline
    /// in `Errored` with nothing appended; once the image message is
    /// shown, an analysis failure substitutes [`ANALYSIS_FALLBACK_REPLY`]
    /// instead, because the upload itself did succeed. Only one upload
    /// runs at a time.
    pub async fn upload_image(&self, path: &Path) {
        let (user_id, chat_id, issued_generation) = {
            let mut store = self.lock();
            if store.upload_in_flight() {
                warn!("upload already in flight, ignoring");
                return;
            }
            let Some(chat_id) = store.active_chat_id() else {
                debug!("no active chat, dropping upload");
                return;
            };
            let captured = (
                store.user_id().to_string(),
                chat_id.to_string(),
                store.generation(),
            );
            store.set_upload_phase(UploadPhase::Reading);
            captured
        };

        debug!(path = %path.display(), chat_id = %chat_id, "reading image");
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(error = %err, path = %path.display(), "failed to read image");
                self.fail_upload(format!("could not read {}: {err}", path.display()));
                return;
            }
        };

        self.lock().set_upload_phase(UploadPhase::Uploading);
        let request = UploadImageRequest {
            image_data: BASE64.encode(&bytes),
            chat_id: chat_id.clone(),
            user_id: user_id.clone(),
        };
        debug!(bytes = bytes.len(), chat_id = %chat_id, "uploading image");

        let uploaded = match self.backend().upload_image(request).await {
            Ok(uploaded) => uploaded,
            Err(err) => {
                warn!(error = %err, chat_id = %chat_id, "image upload failed");
                self.fail_upload(err.to_string());
                return;
            }
        };

        // The image is stored server-side now; show it before the slow
        // analysis round-trip instead of after.
        {
            let mut store = self.lock();
            if store.is_current_chat(issued_generation) {
                store.push_message(Message::image(Sender::User, uploaded.filename.clone()));
            } else {
                debug!(chat_id = %chat_id, "chat switched during upload, image not shown locally");
            }
            store.set_upload_phase(UploadPhase::AwaitingAiReply);
        }

        let analysis = SendMessageRequest {
            chat_id: chat_id.clone(),
            user_id,
            content: String::new(),
            role: Sender::User.as_role().to_string(),
            image_filename: Some(uploaded.filename.clone()),
        };
        debug!(filename = %uploaded.filename, "requesting image analysis");

        let reply = match self.backend().send_message(analysis).await {
            Ok(response) => {
                if let Some(title) = response.generated_title {
                    let target = response.chat_id.clone().unwrap_or_else(|| chat_id.clone());
                    self.rename_chat_title(&target, &title);
                }
                response
                    .assistant
                    .map(|a| a.content)
                    .filter(|content| !content.trim().is_empty())
                    .unwrap_or_else(|| {
                        warn!(filename = %uploaded.filename, "analysis reply was empty, using fallback");
                        ANALYSIS_FALLBACK_REPLY.to_string()
                    })
            }
            Err(err) => {
                // Partial success: the image made it, the analysis did
                // not. Keep the exchange two-sided and raise the banner.
                warn!(error = %err, filename = %uploaded.filename, "image analysis failed");
                self.lock().set_error(err.to_string());
                ANALYSIS_FALLBACK_REPLY.to_string()
            }
        };

        let mut store = self.lock();
        if store.is_current_chat(issued_generation) {
            store.push_message(Message::text(Sender::Assistant, reply));
        } else {
            debug!(chat_id = %chat_id, "chat switched during analysis, reply not shown locally");
        }
        store.set_upload_phase(UploadPhase::Idle);
    }

    fn fail_upload(&self, reason: String) {
        let mut store = self.lock();
        store.set_error(reason.clone());
        store.set_upload_phase(UploadPhase::Errored(reason));
    }
}
