use natter_client::types::MessageRecord;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    /// Wire role string for this sender.
    pub fn as_role(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }

    /// Map a wire role onto a sender. Anything the backend labels other
    /// than "user" renders on the assistant side; the chat view has no
    /// third participant.
    pub fn from_role(role: &str) -> Self {
        if role.eq_ignore_ascii_case("user") {
            Sender::User
        } else {
            Sender::Assistant
        }
    }
}

/// What a message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Image,
}

/// One entry of the active chat's transcript.
///
/// Text and image are mutually exclusive: an image message always carries
/// a filename and no text, a text message the reverse. The constructors
/// are the only way to build one, so the pairing cannot drift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    sender: Sender,
    kind: MessageKind,
    body: String,
    image_ref: Option<String>,
}

impl Message {
    pub fn text(sender: Sender, body: impl Into<String>) -> Self {
        Self {
            sender,
            kind: MessageKind::Text,
            body: body.into(),
            image_ref: None,
        }
    }

    pub fn image(sender: Sender, filename: impl Into<String>) -> Self {
        Self {
            sender,
            kind: MessageKind::Image,
            body: String::new(),
            image_ref: Some(filename.into()),
        }
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Message text; empty for image messages.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Server-side filename of the attached image, for image messages.
    pub fn image_ref(&self) -> Option<&str> {
        self.image_ref.as_deref()
    }
}

impl From<MessageRecord> for Message {
    /// Shape a stored history record into the domain form. A record with a
    /// non-empty `imageFilename` becomes an image message; whatever text
    /// rode along is dropped, matching how the transcript renders.
    fn from(record: MessageRecord) -> Self {
        let sender = Sender::from_role(&record.role);
        match record.image_filename.filter(|name| !name.is_empty()) {
            Some(filename) => Message::image(sender, filename),
            None => Message::text(sender, record.content),
        }
    }
}
