use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;
use tracing::{debug, info};

use super::{push_input_char, Screen, Services};
use crate::api::{Payload, Reply, Request, Ticket};
use crate::route::Route;
use crate::session::Identity;
use crate::ui::{self, BAD, INFO, MUTED, TEXT};

const MAX_NAME_LEN: usize = 32;
const DEFAULT_REJECTION: &str = "Failed to create user";

/// Name prompt at `/`: creates the remote user and caches who we are.
pub struct IdentityEntry {
    name: String,
    pending: Option<Ticket>,
    error: Option<String>,
}

impl IdentityEntry {
    pub fn new() -> Self {
        Self { name: String::new(), pending: None, error: None }
    }

    /// Reset the form, prefilled with the cached name if there is one.
    pub fn enter(&mut self, services: &Services) {
        self.pending = None;
        self.error = None;
        if let Some(identity) = services.session.current() {
            self.name = identity.user_name.clone();
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    fn submit(&mut self, services: &mut Services) {
        let name = self.name.trim();
        if name.is_empty() {
            self.error = Some("Please enter your name to continue".to_string());
            return;
        }
        self.error = None;
        self.pending = Some(services.dispatch(Request::CreateUser { user_name: name.to_string() }));
    }
}

impl Screen for IdentityEntry {
    fn handle_input(&mut self, key: KeyEvent, services: &mut Services) -> Option<Route> {
        if self.is_loading() {
            return None;
        }
        match key.code {
            KeyCode::Enter => self.submit(services),
            KeyCode::Backspace => {
                self.name.pop();
            }
            KeyCode::Char(c) => push_input_char(&mut self.name, c, MAX_NAME_LEN),
            _ => {}
        }
        None
    }

    fn on_reply(&mut self, reply: Reply, services: &mut Services) -> Option<Route> {
        if self.pending != Some(reply.ticket) {
            debug!(ticket = reply.ticket.0, "ignoring stale reply");
            return None;
        }
        self.pending = None;

        match reply.result {
            Ok(Payload::User(user)) => {
                info!(user_id = %user.id, "player created");
                services.session.establish(Identity::new(user.id, user.display_name));
                Some(Route::Intro { user_id: None })
            }
            Ok(_) => {
                self.error = Some(format!("Error: {}", DEFAULT_REJECTION));
                None
            }
            Err(err) if err.is_rejection() => {
                self.error = Some(format!("Error: {}", err.server_message().unwrap_or(DEFAULT_REJECTION)));
                None
            }
            Err(_) => {
                self.error = Some("Server connection failed. Please try again later.".to_string());
                None
            }
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let card_area = ui::centered(area, 56, 16);
        let inner = ui::card(frame, card_area, " ✈ Travel Quiz ", INFO);

        let display_name = if self.name.is_empty() {
            Span::styled("Enter your name", Style::default().fg(MUTED))
        } else {
            Span::styled(self.name.clone(), Style::default().fg(TEXT).add_modifier(Modifier::BOLD))
        };

        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Test your knowledge of world destinations!",
                Style::default().fg(MUTED),
            )),
            Line::from(""),
            Line::from(Span::styled("Your Name", Style::default().fg(TEXT))),
            Line::from(vec![
                Span::styled("[ ", Style::default().fg(MUTED)),
                display_name,
                Span::styled("_", Style::default().fg(INFO).add_modifier(Modifier::SLOW_BLINK)),
                Span::styled(" ]", Style::default().fg(MUTED)),
            ]),
            Line::from(""),
        ];

        if let Some(error) = &self.error {
            lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(BAD))));
        } else {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(""));

        if self.is_loading() {
            lines.push(Line::from(Span::styled(
                "⏳ Setting up your game...",
                Style::default().fg(INFO).add_modifier(Modifier::BOLD),
            )));
        } else {
            lines.push(ui::hints(&[("Enter", "start adventure"), ("Esc", "quit")]).centered());
        }

        let p = Paragraph::new(lines).alignment(Alignment::Center);
        frame.render_widget(p, inner);
    }
}
