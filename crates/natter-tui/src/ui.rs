//! Rendering: state in, frames out. Nothing in here mutates.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph};

use natter_core::{MessageKind, Sender, SessionStore, UploadPhase};

use crate::app::{ChatScreen, Modal, Screen, SignInField, SignInForm};

const KEY_HINTS: &str = "Enter send | Ctrl+N new | Ctrl+J/K switch | Ctrl+U upload | \
                         Ctrl+X delete | Ctrl+R refresh | Ctrl+L log out | Ctrl+Q quit";

pub fn draw(frame: &mut Frame, screen: &Screen) {
    match screen {
        Screen::SignIn(form) => draw_sign_in(frame, form),
        Screen::Chat(chat) => draw_chat(frame, chat),
    }
}

fn draw_sign_in(frame: &mut Frame, form: &SignInForm) {
    let area = centered_rect(frame.area(), 46, 11);
    let block = Block::default().borders(Borders::ALL).title(" natter ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    draw_field(
        frame,
        rows[0],
        " Username ",
        &form.username,
        form.focus == SignInField::Username,
        false,
    );
    draw_field(
        frame,
        rows[1],
        " Password ",
        &form.password,
        form.focus == SignInField::Password,
        true,
    );

    if let Some(notice) = &form.notice {
        let style = if form.busy {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Red)
        };
        frame.render_widget(Paragraph::new(notice.as_str()).style(style), rows[2]);
    }
    frame.render_widget(
        Paragraph::new("Enter signs in. Tab switches fields. Ctrl+Q quits.")
            .style(Style::default().fg(Color::DarkGray)),
        rows[3],
    );
}

fn draw_field(frame: &mut Frame, area: Rect, title: &str, value: &str, focused: bool, mask: bool) {
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let shown = if mask {
        "*".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let text = if focused { format!("{shown}_") } else { shown };
    frame.render_widget(
        Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .border_style(border_style),
        ),
        area,
    );
}

fn draw_chat(frame: &mut Frame, chat: &ChatScreen) {
    chat.session.with_store(|store| {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(28), Constraint::Min(30)])
            .split(frame.area());
        draw_sidebar(frame, columns[0], store);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(4),
                Constraint::Length(1),
            ])
            .split(columns[1]);
        draw_transcript(frame, rows[0], store, chat.scroll_back);
        frame.render_widget(&chat.input, rows[1]);
        draw_status(frame, rows[2], store);

        match &chat.modal {
            Modal::None => {}
            Modal::ConfirmDelete => draw_confirm_delete(frame, store),
            Modal::UploadPath(path) => draw_upload_prompt(frame, path),
        }
    });
}

fn draw_sidebar(frame: &mut Frame, area: Rect, store: &SessionStore) {
    let items: Vec<ListItem> = store
        .chats()
        .iter()
        .map(|chat| {
            let active = store.active_chat_id() == Some(chat.chat_id.as_str());
            let marker = if active { "> " } else { "  " };
            let style = if active {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!("{marker}{}", chat.title)).style(style)
        })
        .collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Chats ({}) ", store.chats().len())),
    );
    frame.render_widget(list, area);
}

fn draw_transcript(frame: &mut Frame, area: Rect, store: &SessionStore, scroll_back: u16) {
    let title = store
        .active_chat_id()
        .and_then(|id| store.chat(id))
        .map(|chat| format!(" {} ", truncate(&chat.title, 40)))
        .unwrap_or_else(|| " Messages ".to_string());
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width.max(1) as usize;
    let mut lines: Vec<Line> = Vec::new();
    for message in store.messages() {
        let (label, color) = match message.sender() {
            Sender::User => ("You", Color::Cyan),
            Sender::Assistant => ("Assistant", Color::Green),
        };
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        match message.kind() {
            MessageKind::Image => {
                let name = message.image_ref().unwrap_or("image");
                lines.push(
                    Line::from(format!("[image] {name}")).style(Style::default().fg(Color::Magenta)),
                );
            }
            MessageKind::Text => {
                for row in wrap_text(message.body(), width) {
                    lines.push(Line::from(row));
                }
            }
        }
        lines.push(Line::default());
    }

    if lines.is_empty() {
        let hint = if store.active_chat_id().is_some() {
            "No messages yet. Say something."
        } else {
            "No chat open. Ctrl+N starts one."
        };
        lines.push(Line::from(hint).style(Style::default().fg(Color::DarkGray)));
    }

    // Show the transcript's tail, backed off by the scroll offset and
    // clamped so scrolling past the top still shows the first lines.
    let visible = inner.height as usize;
    let total = lines.len();
    let bottom = total
        .saturating_sub(scroll_back as usize)
        .max(visible.min(total));
    let start = bottom.saturating_sub(visible);
    frame.render_widget(Paragraph::new(lines[start..bottom].to_vec()), inner);
}

fn draw_status(frame: &mut Frame, area: Rect, store: &SessionStore) {
    let (text, style) = if let Some(message) = store.last_error() {
        (
            format!("Error: {message}  (Esc dismisses)"),
            Style::default().fg(Color::Red),
        )
    } else {
        match store.upload() {
            UploadPhase::Idle => (KEY_HINTS.to_string(), Style::default().fg(Color::DarkGray)),
            UploadPhase::Reading => (
                "Reading image...".to_string(),
                Style::default().fg(Color::Yellow),
            ),
            UploadPhase::Uploading => (
                "Uploading image...".to_string(),
                Style::default().fg(Color::Yellow),
            ),
            UploadPhase::AwaitingAiReply => (
                "Waiting for the image analysis...".to_string(),
                Style::default().fg(Color::Yellow),
            ),
            UploadPhase::Errored(reason) => (
                format!("Upload failed: {reason}  (Ctrl+U dismisses)"),
                Style::default().fg(Color::Red),
            ),
        }
    };
    frame.render_widget(Paragraph::new(text).style(style), area);
}

fn draw_confirm_delete(frame: &mut Frame, store: &SessionStore) {
    let Some(chat_id) = store.pending_delete() else {
        return;
    };
    let title = store
        .chat(chat_id)
        .map(|chat| chat.title.as_str())
        .unwrap_or(chat_id);

    let area = centered_rect(frame.area(), 48, 4);
    frame.render_widget(Clear, area);
    let block = Block::default().borders(Borders::ALL).title(" Delete chat ");
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(format!("Delete \"{}\"?", truncate(title, 38))),
            Line::from("y deletes, n keeps it.").style(Style::default().fg(Color::DarkGray)),
        ]),
        inner,
    );
}

fn draw_upload_prompt(frame: &mut Frame, path: &str) {
    let area = centered_rect(frame.area(), 58, 4);
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Upload image ");
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(format!("{path}_")),
            Line::from("Path to an image file. Enter uploads, Esc cancels.")
                .style(Style::default().fg(Color::DarkGray)),
        ]),
        inner,
    );
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Greedy word wrap on character count. Words longer than the width are
/// split mid-word.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    for raw_line in text.split('\n') {
        let mut row = String::new();
        let mut row_len = 0usize;
        for word in raw_line.split(' ') {
            let word_len = word.chars().count();
            if row_len > 0 && row_len + 1 + word_len <= width {
                row.push(' ');
                row.push_str(word);
                row_len += 1 + word_len;
            } else if word_len <= width && (row_len == 0 || word_len == 0) {
                row.push_str(word);
                row_len += word_len;
            } else {
                if row_len > 0 {
                    rows.push(std::mem::take(&mut row));
                    row_len = 0;
                }
                let mut chars = word.chars().peekable();
                while chars.peek().is_some() {
                    let chunk: String = chars.by_ref().take(width).collect();
                    if chars.peek().is_some() {
                        rows.push(chunk);
                    } else {
                        row_len = chunk.chars().count();
                        row = chunk;
                    }
                }
            }
        }
        rows.push(row);
    }
    rows
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}...")
    }
}
