use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;
use tracing::{debug, info, warn};

use super::{Screen, Services};
use crate::api::{Payload, Reply, Request, Ticket};
use crate::error::ApiError;
use crate::event::ticks_for;
use crate::route::{Invite, Route};
use crate::session::Identity;
use crate::ui::{self, ACCENT, BAD, GOOD, INFO, MUTED, TEXT};

/// Delay before an invalid invite sends the visitor home.
pub const REDIRECT_TICKS: u32 = ticks_for(2000);

enum Phase {
    Idle,
    Invalid { message: &'static str, ticks_left: u32 },
    Loading { ticket: Ticket, inviter: String, from_score: Option<String> },
    Ready { friend_name: String, best_score: Option<u32>, inviter: String, from_score: Option<String> },
}

/// Landing page for a challenge link at `/friend`.
pub struct FriendLanding {
    phase: Phase,
}

impl FriendLanding {
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    /// Start resolving `invite`. Whatever identity was cached before is dropped
    /// either way: the link speaks for someone else.
    pub fn enter(&mut self, invite: Invite, services: &mut Services) -> Option<Route> {
        services.session.clear();
        self.phase = match (invite.to_id, invite.inviter) {
            (Some(to_id), Some(inviter)) => {
                info!(to_id = %to_id, inviter = %inviter, "opening challenge link");
                let ticket = services.dispatch(Request::FetchUser { user_id: to_id });
                Phase::Loading { ticket, inviter, from_score: invite.from_score }
            }
            _ => {
                warn!("challenge link is missing toId or userName");
                Self::invalid("Invalid invite link!")
            }
        };
        None
    }

    fn invalid(message: &'static str) -> Phase {
        Phase::Invalid { message, ticks_left: REDIRECT_TICKS }
    }
}

impl Screen for FriendLanding {
    fn handle_input(&mut self, key: KeyEvent, _services: &mut Services) -> Option<Route> {
        match (&self.phase, key.code) {
            (Phase::Ready { .. }, KeyCode::Enter) => Some(Route::Play),
            (Phase::Ready { .. }, KeyCode::Esc | KeyCode::Char('n')) => Some(Route::Home),
            (Phase::Invalid { .. }, KeyCode::Enter) => Some(Route::Home),
            _ => None,
        }
    }

    fn on_reply(&mut self, reply: Reply, services: &mut Services) -> Option<Route> {
        let Phase::Loading { ticket, .. } = &self.phase else {
            debug!(ticket = reply.ticket.0, "ignoring reply outside of loading");
            return None;
        };
        if *ticket != reply.ticket {
            debug!(ticket = reply.ticket.0, "ignoring stale reply");
            return None;
        }
        let Phase::Loading { inviter, from_score, .. } = std::mem::replace(&mut self.phase, Phase::Idle) else {
            return None;
        };

        match reply.result {
            Ok(Payload::User(user)) => {
                services.session.establish(Identity::new(user.id, user.display_name.clone()));
                self.phase = Phase::Ready { friend_name: user.display_name, best_score: user.score, inviter, from_score };
                None
            }
            Err(ApiError::NotFound) => {
                services.alert("No user found! Redirecting to home page.");
                Some(Route::Home)
            }
            Ok(_) | Err(_) => {
                self.phase = Self::invalid("Something went wrong!");
                None
            }
        }
    }

    fn update(&mut self, _services: &mut Services) -> Option<Route> {
        if let Phase::Invalid { ticks_left, .. } = &mut self.phase {
            *ticks_left = ticks_left.saturating_sub(1);
            if *ticks_left == 0 {
                self.phase = Phase::Idle;
                return Some(Route::Home);
            }
        }
        None
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        match &self.phase {
            Phase::Idle | Phase::Loading { .. } => {
                let p = Paragraph::new(Line::from(Span::styled(
                    "Loading your challenge...",
                    Style::default().fg(INFO).add_modifier(Modifier::BOLD),
                )))
                .alignment(Alignment::Center);
                frame.render_widget(p, ui::centered(area, 40, 1));
            }
            Phase::Invalid { message, ticks_left } => {
                let inner = ui::card(frame, ui::centered(area, 48, 9), " Oops ", BAD);
                let progress = (REDIRECT_TICKS - ticks_left) as f64 / REDIRECT_TICKS.max(1) as f64;
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(1)])
                    .split(inner);
                let p = Paragraph::new(vec![
                    Line::from(""),
                    Line::from(Span::styled(*message, Style::default().fg(BAD).add_modifier(Modifier::BOLD))),
                    Line::from(""),
                    Line::from(Span::styled("Redirecting to home page...", Style::default().fg(MUTED))),
                ])
                .alignment(Alignment::Center);
                frame.render_widget(p, chunks[0]);
                let gauge = Gauge::default()
                    .gauge_style(Style::default().fg(BAD))
                    .ratio(progress.clamp(0.0, 1.0))
                    .label("");
                frame.render_widget(gauge, chunks[1]);
            }
            Phase::Ready { friend_name, best_score, inviter, from_score } => {
                let inner = ui::card(frame, ui::centered(area, 58, 15), " 🏆 Challenge ", ACCENT);
                let lines = vec![
                    Line::from(""),
                    Line::from(vec![
                        Span::styled("Hi ", Style::default().fg(TEXT)),
                        Span::styled(friend_name.clone(), Style::default().fg(INFO).add_modifier(Modifier::BOLD)),
                        Span::styled("!", Style::default().fg(TEXT)),
                    ]),
                    Line::from(vec![
                        Span::styled(inviter.clone(), Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
                        Span::styled(" challenged you to beat their score.", Style::default().fg(TEXT)),
                    ]),
                    Line::from(""),
                    Line::from(Span::styled("Friend's Score", Style::default().fg(MUTED))),
                    Line::from(Span::styled(
                        from_score.clone().unwrap_or_else(|| "?".to_string()),
                        Style::default().fg(GOOD).add_modifier(Modifier::BOLD),
                    )),
                    match best_score {
                        Some(best) => Line::from(Span::styled(format!("Your best so far: {}", best), Style::default().fg(MUTED))),
                        None => Line::from(""),
                    },
                    ui::hints(&[("Enter", "accept challenge"), ("Esc", "no thanks")]).centered(),
                ];
                frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
            }
        }
    }
}
