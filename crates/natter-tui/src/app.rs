//! Application state and the event loop.
//!
//! The loop redraws on input, on a store revision change, or when a
//! spawned task reports back. Session operations run on the runtime via
//! `tokio::spawn` and publish their effects through the store, so the
//! loop never awaits a network call.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tui_textarea::TextArea;

use natter_client::{ApiClient, AuthToken};
use natter_core::{ChatSession, HttpBackend, Navigator};

use crate::session_file::{SessionFile, StoredSession};
use crate::ui;

/// How often the loop checks the store for changes made by spawned tasks.
const REDRAW_INTERVAL: Duration = Duration::from_millis(100);

const TRANSCRIPT_SCROLL_STEP: u16 = 10;

/// Results of work running off the event loop.
enum AppEvent {
    SignedIn {
        user_id: String,
        token: AuthToken,
        preferred_chat: Option<String>,
    },
    SignInFailed(String),
}

/// What a key handler asks the application to do beyond its own screen.
enum AppAction {
    None,
    SubmitSignIn { username: String, password: String },
    LogOut,
}

#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub enum SignInField {
    #[default]
    Username,
    Password,
}

#[derive(Default)]
pub struct SignInForm {
    pub username: String,
    pub password: String,
    pub focus: SignInField,
    pub busy: bool,
    pub notice: Option<String>,
}

impl SignInForm {
    fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        if self.busy {
            return AppAction::None;
        }
        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.focus = match self.focus {
                    SignInField::Username => SignInField::Password,
                    SignInField::Password => SignInField::Username,
                };
            }
            KeyCode::Enter => {
                if self.focus == SignInField::Username {
                    self.focus = SignInField::Password;
                } else if self.username.trim().is_empty() || self.password.is_empty() {
                    self.notice = Some("Enter a username and a password.".to_string());
                } else {
                    self.busy = true;
                    self.notice = Some("Signing in...".to_string());
                    return AppAction::SubmitSignIn {
                        username: self.username.trim().to_string(),
                        password: self.password.clone(),
                    };
                }
            }
            KeyCode::Backspace => {
                self.focused_field_mut().pop();
            }
            KeyCode::Esc => self.notice = None,
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.focused_field_mut().push(c);
            }
            _ => {}
        }
        AppAction::None
    }

    fn focused_field_mut(&mut self) -> &mut String {
        match self.focus {
            SignInField::Username => &mut self.username,
            SignInField::Password => &mut self.password,
        }
    }
}

/// Overlay that captures all keys while it is open.
pub enum Modal {
    None,
    ConfirmDelete,
    UploadPath(String),
}

pub struct ChatScreen {
    pub session: Arc<ChatSession>,
    pub input: TextArea<'static>,
    pub modal: Modal,
    /// Lines scrolled up from the transcript's tail. Zero follows new
    /// messages.
    pub scroll_back: u16,
    last_seen_revision: u64,
    last_generation: u64,
    last_transcript_len: usize,
}

impl ChatScreen {
    fn new(session: Arc<ChatSession>) -> Self {
        Self {
            session,
            input: fresh_input(),
            modal: Modal::None,
            scroll_back: 0,
            last_seen_revision: 0,
            last_generation: 0,
            last_transcript_len: 0,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        if self.handle_modal_key(key) {
            return AppAction::None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('l') => return AppAction::LogOut,
                KeyCode::Char('n') => {
                    let session = self.session.clone();
                    tokio::spawn(async move {
                        let _ = session.create_chat().await;
                    });
                }
                KeyCode::Char('j') => self.open_neighbor(1),
                KeyCode::Char('k') => self.open_neighbor(-1),
                KeyCode::Char('r') => {
                    let session = self.session.clone();
                    tokio::spawn(async move {
                        session.load_chats().await;
                        session.load_messages().await;
                    });
                }
                KeyCode::Char('x') => {
                    let active = self
                        .session
                        .with_store(|store| store.active_chat_id().map(String::from));
                    if let Some(chat_id) = active {
                        self.session.request_delete(&chat_id);
                        self.modal = Modal::ConfirmDelete;
                    }
                }
                KeyCode::Char('u') => {
                    let errored = self
                        .session
                        .with_store(|store| store.upload().error().is_some());
                    if errored {
                        // A failed upload has to be dismissed before the
                        // next attempt.
                        self.session.acknowledge_upload_error();
                    } else {
                        self.modal = Modal::UploadPath(String::new());
                    }
                }
                _ => {}
            }
            return AppAction::None;
        }

        match key.code {
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
                self.input.insert_newline();
            }
            KeyCode::Enter => self.submit_input(),
            KeyCode::Esc => self.session.clear_error(),
            KeyCode::PageUp => {
                self.scroll_back = self.scroll_back.saturating_add(TRANSCRIPT_SCROLL_STEP);
            }
            KeyCode::PageDown => {
                self.scroll_back = self.scroll_back.saturating_sub(TRANSCRIPT_SCROLL_STEP);
            }
            _ => {
                self.input.input(key);
            }
        }
        AppAction::None
    }

    /// Returns true when an open modal consumed the key.
    fn handle_modal_key(&mut self, key: KeyEvent) -> bool {
        match self.modal {
            Modal::None => false,
            Modal::ConfirmDelete => {
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => {
                        let session = self.session.clone();
                        tokio::spawn(async move { session.confirm_delete().await });
                        self.modal = Modal::None;
                    }
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                        self.session.cancel_delete();
                        self.modal = Modal::None;
                    }
                    _ => {}
                }
                true
            }
            Modal::UploadPath(_) => {
                match key.code {
                    KeyCode::Enter => {
                        if let Modal::UploadPath(path) =
                            std::mem::replace(&mut self.modal, Modal::None)
                        {
                            let typed = path.trim().to_string();
                            if !typed.is_empty() {
                                let session = self.session.clone();
                                tokio::spawn(async move {
                                    session.upload_image(Path::new(&typed)).await;
                                });
                            }
                        }
                    }
                    KeyCode::Esc => self.modal = Modal::None,
                    KeyCode::Backspace => {
                        if let Modal::UploadPath(path) = &mut self.modal {
                            path.pop();
                        }
                    }
                    KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                        if let Modal::UploadPath(path) = &mut self.modal {
                            path.push(c);
                        }
                    }
                    _ => {}
                }
                true
            }
        }
    }

    /// Clear the input immediately and send its contents; the transcript
    /// is only touched once the reply arrives.
    fn submit_input(&mut self) {
        let text = self.input.lines().join("\n");
        if text.trim().is_empty() {
            return;
        }
        self.input = fresh_input();
        let session = self.session.clone();
        tokio::spawn(async move { session.send_message(&text).await });
    }

    /// Open the chat before or after the active one in sidebar order,
    /// wrapping at the ends.
    fn open_neighbor(&mut self, step: isize) {
        let target = self.session.with_store(|store| {
            let chats = store.chats();
            if chats.is_empty() {
                return None;
            }
            let next = match store
                .active_chat_id()
                .and_then(|active| chats.iter().position(|chat| chat.chat_id == active))
            {
                Some(index) => (index as isize + step).rem_euclid(chats.len() as isize) as usize,
                None => 0,
            };
            Some(chats[next].chat_id.clone())
        });
        if let Some(chat_id) = target {
            let session = self.session.clone();
            tokio::spawn(async move { session.open_chat(&chat_id).await });
        }
    }
}

pub enum Screen {
    SignIn(SignInForm),
    Chat(ChatScreen),
}

/// Writes the active chat back to the session file whenever the session
/// navigates, so the next launch reopens where the user left off.
struct FileNavigator {
    session_file: SessionFile,
}

impl Navigator for FileNavigator {
    fn open_chat(&self, _user_id: &str, chat_id: &str) {
        let file = self.session_file.clone();
        let chat_id = chat_id.to_string();
        tokio::spawn(async move {
            if let Err(error) = file.remember_chat(&chat_id).await {
                warn!(error = %error, "could not remember the open chat");
            }
        });
    }

    fn open_home(&self) {
        let file = self.session_file.clone();
        tokio::spawn(async move {
            if let Err(error) = file.forget_chat().await {
                warn!(error = %error, "could not clear the remembered chat");
            }
        });
    }
}

pub struct App {
    client: ApiClient,
    session_file: SessionFile,
    screen: Screen,
    should_quit: bool,
}

impl App {
    pub fn new(client: ApiClient, session_file: SessionFile) -> Self {
        Self {
            client,
            session_file,
            screen: Screen::SignIn(SignInForm::default()),
            should_quit: false,
        }
    }

    pub async fn run(mut self, mut terminal: DefaultTerminal) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel();

        // A session saved by a previous run skips the sign-in form.
        if let Some(stored) = self.session_file.load().await {
            match AuthToken::new(stored.access_token) {
                Ok(token) => self.enter_chat(stored.user_id, token, stored.last_chat_id),
                Err(error) => {
                    warn!(error = %error, "stored session is unusable, signing in again");
                }
            }
        }

        let mut events = EventStream::new();
        let mut tick = tokio::time::interval(REDRAW_INTERVAL);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut needs_redraw = true;

        while !self.should_quit {
            if needs_redraw || self.store_changed() {
                terminal.draw(|frame| ui::draw(frame, &self.screen))?;
                needs_redraw = false;
            }

            tokio::select! {
                maybe_event = events.next() => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key, &tx);
                        needs_redraw = true;
                    }
                    Some(Ok(Event::Resize(_, _))) => needs_redraw = true,
                    Some(Ok(_)) => {}
                    Some(Err(error)) => {
                        warn!(error = %error, "terminal input failed, exiting");
                        self.should_quit = true;
                    }
                    None => self.should_quit = true,
                },
                Some(event) = rx.recv() => {
                    self.handle_app_event(event);
                    needs_redraw = true;
                }
                _ = tick.tick() => {}
            }
        }
        Ok(())
    }

    /// True when a spawned task changed the store since the last draw.
    fn store_changed(&mut self) -> bool {
        let Screen::Chat(chat) = &mut self.screen else {
            return false;
        };
        let (revision, generation, transcript_len) = chat
            .session
            .with_store(|store| (store.revision(), store.generation(), store.messages().len()));
        if generation != chat.last_generation || transcript_len != chat.last_transcript_len {
            // Fresh content snaps the view back to the latest message.
            chat.scroll_back = 0;
            chat.last_generation = generation;
            chat.last_transcript_len = transcript_len;
        }
        if revision != chat.last_seen_revision {
            chat.last_seen_revision = revision;
            return true;
        }
        false
    }

    fn handle_key(&mut self, key: KeyEvent, tx: &mpsc::UnboundedSender<AppEvent>) {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
        {
            self.should_quit = true;
            return;
        }
        let action = match &mut self.screen {
            Screen::SignIn(form) => form.handle_key(key),
            Screen::Chat(chat) => chat.handle_key(key),
        };
        match action {
            AppAction::None => {}
            AppAction::SubmitSignIn { username, password } => {
                self.spawn_sign_in(username, password, tx);
            }
            AppAction::LogOut => self.log_out(),
        }
    }

    fn spawn_sign_in(
        &self,
        username: String,
        password: String,
        tx: &mpsc::UnboundedSender<AppEvent>,
    ) {
        let client = self.client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let event = match client.sign_in(&username, &password).await {
                Ok(response) => match AuthToken::new(response.access_token) {
                    Ok(token) => AppEvent::SignedIn {
                        user_id: response.user_id,
                        token,
                        preferred_chat: response.chat_id,
                    },
                    Err(error) => AppEvent::SignInFailed(error.to_string()),
                },
                Err(error) => AppEvent::SignInFailed(error.to_string()),
            };
            let _ = tx.send(event);
        });
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SignedIn {
                user_id,
                token,
                preferred_chat,
            } => {
                let mut stored = StoredSession::new(&user_id, token.as_str());
                stored.last_chat_id = preferred_chat.clone();
                let file = self.session_file.clone();
                tokio::spawn(async move {
                    if let Err(error) = file.save(&stored).await {
                        warn!(error = %error, "could not save session file");
                    }
                });
                self.enter_chat(user_id, token, preferred_chat);
            }
            AppEvent::SignInFailed(message) => {
                if let Screen::SignIn(form) = &mut self.screen {
                    form.busy = false;
                    form.password.clear();
                    form.notice = Some(message);
                }
            }
        }
    }

    /// Build the session and bootstrap it: fetch the chat list, then open
    /// the preferred chat if it still exists, otherwise the first listed
    /// one, otherwise a fresh chat.
    fn enter_chat(&mut self, user_id: String, token: AuthToken, preferred_chat: Option<String>) {
        info!(user_id = %user_id, "entering chat session");
        let backend = Arc::new(HttpBackend::new(self.client.clone(), token));
        let navigator = Arc::new(FileNavigator {
            session_file: self.session_file.clone(),
        });
        let session = Arc::new(ChatSession::new(user_id, backend, navigator));

        let boot = session.clone();
        tokio::spawn(async move {
            boot.load_chats().await;
            let target = boot.with_store(|store| {
                preferred_chat
                    .filter(|id| store.chat(id).is_some())
                    .or_else(|| store.chats().first().map(|chat| chat.chat_id.clone()))
            });
            match target {
                Some(chat_id) => boot.open_chat(&chat_id).await,
                None => {
                    let _ = boot.create_chat().await;
                }
            }
        });

        self.screen = Screen::Chat(ChatScreen::new(session));
    }

    fn log_out(&mut self) {
        info!("signing out");
        let file = self.session_file.clone();
        tokio::spawn(async move {
            if let Err(error) = file.clear().await {
                warn!(error = %error, "could not clear session file");
            }
        });
        self.screen = Screen::SignIn(SignInForm::default());
    }
}

fn fresh_input() -> TextArea<'static> {
    let mut input = TextArea::default();
    input.set_placeholder_text("Type a message");
    input.set_cursor_line_style(Style::default());
    input.set_block(Block::default().borders(Borders::ALL).title(" Message "));
    input
}
