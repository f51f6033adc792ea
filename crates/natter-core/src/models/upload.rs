/// Lifecycle of the image upload pipeline.
///
/// The pipeline is the one place the session serializes work: while a
/// phase is in flight, history fetches are suppressed and further uploads
/// are rejected, because the optimistically shown image message does not
/// exist in the server's history yet and a concurrent refresh would drop
/// it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadPhase {
    /// No upload in progress.
    #[default]
    Idle,
    /// Reading and base64-encoding the selected file.
    Reading,
    /// Submitting the encoded image to the backend.
    Uploading,
    /// Image stored server-side; waiting for the assistant's analysis.
    AwaitingAiReply,
    /// A stage failed before the image message existed. Sticky until
    /// acknowledged.
    Errored(String),
}

impl UploadPhase {
    /// True from the start of the read step until the pipeline settles in
    /// `Idle` or `Errored`. This is the window during which history
    /// fetches must not run.
    pub fn in_flight(&self) -> bool {
        matches!(
            self,
            UploadPhase::Reading | UploadPhase::Uploading | UploadPhase::AwaitingAiReply
        )
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            UploadPhase::Errored(reason) => Some(reason),
            _ => None,
        }
    }
}
