use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;
use tracing::{debug, info, warn};

use super::{Screen, Services};
use crate::api::{Payload, Reply, Request, Ticket};
use crate::event::ticks_for;
use crate::route::Route;
use crate::session::Identity;
use crate::ui::{self, ACCENT, GOOD, INFO, MUTED, TEXT};

const SPLASH_TICKS: u32 = ticks_for(800);

/// Welcome screen at `/game`.
pub struct GameIntro {
    user_name: String,
    splash_ticks: u32,
    resolving: Option<Ticket>,
}

impl GameIntro {
    pub fn new() -> Self {
        Self { user_name: String::new(), splash_ticks: 0, resolving: None }
    }

    /// Settle who is playing. A cached identity wins over `user_id`; with
    /// neither, the player is sent back to name entry.
    pub fn enter(&mut self, user_id: Option<String>, services: &mut Services) -> Option<Route> {
        self.resolving = None;
        if let Some(identity) = services.session.current() {
            self.user_name = identity.user_name.clone();
        } else if let Some(user_id) = user_id {
            info!(user_id = %user_id, "adopting identity from link");
            services.session.establish(Identity::new(user_id.clone(), user_id.clone()));
            self.user_name = user_id.clone();
            self.resolving = Some(services.dispatch(Request::FetchUser { user_id }));
        } else {
            return Some(Route::Home);
        }
        self.splash_ticks = SPLASH_TICKS;
        None
    }

    pub fn is_ready(&self) -> bool {
        self.splash_ticks == 0
    }
}

impl Screen for GameIntro {
    fn handle_input(&mut self, key: KeyEvent, services: &mut Services) -> Option<Route> {
        if services.session.current().is_none() {
            return Some(Route::Home);
        }
        match key.code {
            KeyCode::Enter if self.is_ready() => Some(Route::Play),
            _ => None,
        }
    }

    fn on_reply(&mut self, reply: Reply, services: &mut Services) -> Option<Route> {
        if self.resolving != Some(reply.ticket) {
            debug!(ticket = reply.ticket.0, "ignoring stale reply");
            return None;
        }
        self.resolving = None;

        match reply.result {
            Ok(Payload::User(user)) => {
                let still_current = services.session.current().is_some_and(|identity| identity.user_id == user.id);
                if still_current {
                    self.user_name = user.display_name.clone();
                    services.session.establish(Identity::new(user.id, user.display_name));
                }
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "could not resolve adopted user; keeping the id as the name"),
        }
        None
    }

    fn update(&mut self, _services: &mut Services) -> Option<Route> {
        self.splash_ticks = self.splash_ticks.saturating_sub(1);
        None
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.is_ready() {
            let p = Paragraph::new(vec![
                Line::from(Span::styled("🌐", Style::default())),
                Line::from(""),
                Line::from(Span::styled(
                    "Preparing your adventure...",
                    Style::default().fg(INFO).add_modifier(Modifier::BOLD),
                )),
            ])
            .alignment(Alignment::Center);
            frame.render_widget(p, ui::centered(area, 40, 3));
            return;
        }

        let card_area = ui::centered(area, 60, 16);
        let inner = ui::card(frame, card_area, " Travel Quiz Adventure ", INFO);

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled("EXPLORER", Style::default().fg(MUTED))),
            Line::from(Span::styled(
                self.user_name.clone(),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Your global adventure awaits! Test your knowledge of world",
                Style::default().fg(TEXT),
            )),
            Line::from(Span::styled(
                "destinations, cultures, and landmarks.",
                Style::default().fg(TEXT),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "▶ Begin Your Journey",
                Style::default().fg(GOOD).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            ui::hints(&[("Enter", "begin")]).centered(),
        ];

        let p = Paragraph::new(lines).alignment(Alignment::Center);
        frame.render_widget(p, inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::test_support::*;

    fn finish_splash(screen: &mut GameIntro, harness: &mut Harness) {
        for _ in 0..SPLASH_TICKS {
            screen.update(&mut harness.services);
        }
    }

    #[test]
    fn no_identity_redirects_home() {
        let mut harness = Harness::new();
        let mut screen = GameIntro::new();
        assert_eq!(screen.enter(None, &mut harness.services), Some(Route::Home));
        assert!(harness.recorder.requests().is_empty());
    }

    #[test]
    fn cached_identity_wins_over_link() {
        let mut harness = Harness::signed_in("u1", "Alice");
        let mut screen = GameIntro::new();
        assert_eq!(screen.enter(Some("u9".into()), &mut harness.services), None);
        assert_eq!(screen.user_name, "Alice");
        assert_eq!(harness.services.session.current().map(|i| i.user_id.as_str()), Some("u1"));
        assert!(harness.recorder.requests().is_empty());
    }

    #[test]
    fn adopts_link_identity_and_resolves_its_name() {
        let mut harness = Harness::new();
        let mut screen = GameIntro::new();
        assert_eq!(screen.enter(Some("u9".into()), &mut harness.services), None);
        assert_eq!(harness.services.session.current(), Some(&Identity::new("u9", "u9")));

        let (ticket, request) = harness.recorder.last();
        assert_eq!(request, Request::FetchUser { user_id: "u9".into() });
        screen.on_reply(ok(ticket, user("u9", "Zoe")), &mut harness.services);
        assert_eq!(harness.services.session.current(), Some(&Identity::new("u9", "Zoe")));
        assert_eq!(screen.user_name, "Zoe");
    }

    #[test]
    fn failed_resolution_keeps_the_id() {
        let mut harness = Harness::new();
        let mut screen = GameIntro::new();
        screen.enter(Some("u9".into()), &mut harness.services);
        let (ticket, _) = harness.recorder.last();
        screen.on_reply(failed(ticket, ApiError::NotFound), &mut harness.services);
        assert_eq!(harness.services.session.current(), Some(&Identity::new("u9", "u9")));
    }

    #[test]
    fn begins_only_after_the_splash() {
        let mut harness = Harness::signed_in("u1", "Alice");
        let mut screen = GameIntro::new();
        screen.enter(None, &mut harness.services);

        assert_eq!(screen.handle_input(key(KeyCode::Enter), &mut harness.services), None);
        finish_splash(&mut screen, &mut harness);
        assert_eq!(screen.handle_input(key(KeyCode::Enter), &mut harness.services), Some(Route::Play));
    }

    #[test]
    fn renders_player_name() {
        let mut harness = Harness::signed_in("u1", "Alice");
        let mut screen = GameIntro::new();
        screen.enter(None, &mut harness.services);
        finish_splash(&mut screen, &mut harness);
        let text = render_to_string(|frame| screen.render(frame, frame.area()));
        assert!(text.contains("EXPLORER"));
        assert!(text.contains("Alice"));
    }
}
