/// Where the session can send the user next.
///
/// The core decides *that* navigation happens (a created chat is entered,
/// deleting the last chat lands on home); what a location concretely is
/// belongs to the front-end. Implementations must be cheap and
/// non-blocking, they are called from async session operations.
pub trait Navigator: Send + Sync {
    /// Point the user at a chat they own.
    fn open_chat(&self, user_id: &str, chat_id: &str);

    /// Leave the chat view for the neutral home location.
    fn open_home(&self);
}
