//! The quiz loop at `/play`.
//!
//! ```text
//! LoadingQuestion -> AwaitingSelection -> Checking -> Answered -> LoadingQuestion
//!                          |   (skip) ^                  |
//!                          +----------+-> GameOver <-----+
//! ```
//!
//! Every transition that needs the server dispatches exactly one request and
//! parks the phase on its ticket; replies carrying any other ticket are
//! dropped. A missing identity sends the player back to name entry.

use std::mem;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;
use tracing::{debug, info, warn};
use url::Url;

use super::{push_input_char, Screen, Services};
use crate::api::{AnswerResult, Destination, Payload, Reply, Request, Ticket};
use crate::route::{Invite, Route};
use crate::ui::{self, ACCENT, BAD, GOOD, INFO, MUTED, TEXT};

const MAX_FRIEND_NAME_LEN: usize = 32;
const LOAD_FAILED: &str = "Could not load a destination. Press r to try again.";
const CHECK_FAILED: &str = "Could not check your answer. Press Enter to try again.";

/// Correct and incorrect answers in the current session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionScore {
    pub correct: u32,
    pub incorrect: u32,
}

impl SessionScore {
    pub fn record(&mut self, correct: bool) {
        if correct {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportStatus {
    Pending(Ticket),
    Saved,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareStatus {
    Idle,
    Pending(Ticket),
    Ready(Url),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOver {
    pub final_score: SessionScore,
    pub report: ReportStatus,
    pub friend_name: String,
    pub editing: bool,
    pub share: ShareStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    LoadingQuestion { ticket: Option<Ticket>, error: Option<&'static str> },
    AwaitingSelection { question: Destination, cursor: usize, selected: Option<usize>, error: Option<&'static str> },
    Checking { question: Destination, selected: usize, ticket: Ticket },
    Answered { question: Destination, selected: usize, result: AnswerResult },
    GameOver(GameOver),
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::LoadingQuestion { .. } => "loading_question",
            Phase::AwaitingSelection { .. } => "awaiting_selection",
            Phase::Checking { .. } => "checking",
            Phase::Answered { .. } => "answered",
            Phase::GameOver(_) => "game_over",
        }
    }
}

pub struct Play {
    phase: Phase,
    score: SessionScore,
    player: String,
}

impl Play {
    pub fn new() -> Self {
        Self {
            phase: Phase::LoadingQuestion { ticket: None, error: None },
            score: SessionScore::default(),
            player: String::new(),
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[cfg(test)]
    pub fn score(&self) -> SessionScore {
        self.score
    }

    /// Start a fresh session for the cached player.
    pub fn enter(&mut self, services: &mut Services) -> Option<Route> {
        let Some(identity) = services.session.current() else {
            return Some(Route::Home);
        };
        self.player = identity.user_name.clone();
        self.score = SessionScore::default();
        info!(user_id = %identity.user_id, "session started");
        self.load_question(services)
    }

    fn set_phase(&mut self, phase: Phase) {
        debug!(from = self.phase.name(), to = phase.name(), "phase change");
        self.phase = phase;
    }

    fn load_question(&mut self, services: &mut Services) -> Option<Route> {
        if services.session.current().is_none() {
            return Some(Route::Home);
        }
        let ticket = services.dispatch(Request::FetchDestination);
        self.set_phase(Phase::LoadingQuestion { ticket: Some(ticket), error: None });
        None
    }

    fn submit(&mut self, services: &mut Services) {
        let Phase::AwaitingSelection { question, selected: Some(selected), .. } = &self.phase else {
            return;
        };
        let Some(answer) = question.options.get(*selected) else { return };
        let request = Request::CheckAnswer { destination_id: question.id.clone(), selected_answer: answer.clone() };
        let selected = *selected;
        let ticket = services.dispatch(request);

        if let Phase::AwaitingSelection { question, .. } = self.take_phase() {
            self.set_phase(Phase::Checking { question, selected, ticket });
        }
    }

    fn end_game(&mut self, services: &mut Services) -> Option<Route> {
        let Some(user_id) = services.session.current().map(|identity| identity.user_id.clone()) else {
            return Some(Route::Home);
        };
        let ticket = services.dispatch(Request::UpdateScore { user_id, score: self.score.correct });
        info!(correct = self.score.correct, incorrect = self.score.incorrect, "game over");
        self.set_phase(Phase::GameOver(GameOver {
            final_score: self.score,
            report: ReportStatus::Pending(ticket),
            friend_name: String::new(),
            editing: false,
            share: ShareStatus::Idle,
        }));
        None
    }

    fn play_again(&mut self, services: &mut Services) -> Option<Route> {
        self.score = SessionScore::default();
        self.load_question(services)
    }

    fn share(&mut self, services: &mut Services) {
        let Phase::GameOver(over) = &mut self.phase else { return };
        if matches!(over.share, ShareStatus::Pending(_)) {
            return;
        }
        let friend_name = over.friend_name.trim();
        if friend_name.is_empty() {
            services.alert("Please enter a friend's user name!");
            return;
        }
        let ticket = services.dispatch(Request::CreateUser { user_name: friend_name.to_string() });
        over.share = ShareStatus::Pending(ticket);
    }

    fn take_phase(&mut self) -> Phase {
        mem::replace(&mut self.phase, Phase::LoadingQuestion { ticket: None, error: None })
    }

    fn handle_game_over_input(&mut self, key: KeyEvent, services: &mut Services) -> Option<Route> {
        let Phase::GameOver(over) = &mut self.phase else { return None };
        if over.editing {
            match key.code {
                KeyCode::Enter => self.share(services),
                KeyCode::Esc | KeyCode::Tab => over.editing = false,
                KeyCode::Backspace => {
                    over.friend_name.pop();
                }
                KeyCode::Char(c) => push_input_char(&mut over.friend_name, c, MAX_FRIEND_NAME_LEN),
                _ => {}
            }
            return None;
        }
        match key.code {
            KeyCode::Char('p') | KeyCode::Char('P') => self.play_again(services),
            KeyCode::Char('x') | KeyCode::Char('X') => {
                services.session.clear();
                Some(Route::Home)
            }
            KeyCode::Tab | KeyCode::Char('f') | KeyCode::Char('F') => {
                over.editing = true;
                None
            }
            _ => None,
        }
    }

    fn on_share_reply(&mut self, reply: Reply, services: &mut Services) -> Option<Route> {
        let Phase::GameOver(over) = &mut self.phase else { return None };
        over.share = ShareStatus::Idle;
        match reply.result {
            Ok(Payload::User(friend)) => {
                let Some(inviter) = services.session.current() else {
                    return Some(Route::Home);
                };
                let link = Invite::share_link(&services.share_origin, &friend.id, over.final_score.correct, &inviter.user_name);
                info!(friend_id = %friend.id, "challenge link created");
                match services.clipboard.copy(link.as_str()) {
                    Ok(()) => services.alert("Link copied! Share it with your friend 🎉"),
                    Err(err) => {
                        warn!(error = %err, "clipboard unavailable");
                        services.alert("Copy the link below and share it with your friend.");
                    }
                }
                over.share = ShareStatus::Ready(link);
            }
            Ok(_) | Err(_) => services.alert("Error creating user."),
        }
        None
    }
}

impl Screen for Play {
    fn handle_input(&mut self, key: KeyEvent, services: &mut Services) -> Option<Route> {
        if services.session.current().is_none() {
            return Some(Route::Home);
        }

        match &mut self.phase {
            Phase::LoadingQuestion { ticket: None, .. } => match key.code {
                KeyCode::Char('r') | KeyCode::Char('R') => self.load_question(services),
                _ => None,
            },
            Phase::LoadingQuestion { .. } | Phase::Checking { .. } => None,
            Phase::AwaitingSelection { question, cursor, selected, .. } => {
                let count = question.options.len();
                match key.code {
                    KeyCode::Up if count > 0 => *cursor = (*cursor + count - 1) % count,
                    KeyCode::Down if count > 0 => *cursor = (*cursor + 1) % count,
                    KeyCode::Char(' ') if count > 0 => *selected = Some(*cursor),
                    KeyCode::Char(c @ '1'..='9') => {
                        let idx = c as usize - '1' as usize;
                        if idx < count {
                            *cursor = idx;
                            *selected = Some(idx);
                        }
                    }
                    KeyCode::Enter => self.submit(services),
                    KeyCode::Char('s') | KeyCode::Char('S') => return self.load_question(services),
                    KeyCode::Char('e') | KeyCode::Char('E') => return self.end_game(services),
                    _ => {}
                }
                None
            }
            Phase::Answered { .. } => match key.code {
                KeyCode::Char('n') | KeyCode::Char('N') => self.load_question(services),
                KeyCode::Char('e') | KeyCode::Char('E') => self.end_game(services),
                _ => None,
            },
            Phase::GameOver(_) => self.handle_game_over_input(key, services),
        }
    }

    fn on_reply(&mut self, reply: Reply, services: &mut Services) -> Option<Route> {
        let expected = match &self.phase {
            Phase::LoadingQuestion { ticket, .. } => *ticket,
            Phase::Checking { ticket, .. } => Some(*ticket),
            Phase::GameOver(GameOver { report: ReportStatus::Pending(ticket), .. })
                if *ticket == reply.ticket =>
            {
                Some(*ticket)
            }
            Phase::GameOver(GameOver { share: ShareStatus::Pending(ticket), .. }) => Some(*ticket),
            _ => None,
        };
        if expected != Some(reply.ticket) {
            debug!(ticket = reply.ticket.0, phase = self.phase.name(), "ignoring stale reply");
            return None;
        }

        match self.take_phase() {
            Phase::LoadingQuestion { .. } => match reply.result {
                Ok(Payload::Destination(question)) => {
                    self.set_phase(Phase::AwaitingSelection { question, cursor: 0, selected: None, error: None });
                }
                _ => self.set_phase(Phase::LoadingQuestion { ticket: None, error: Some(LOAD_FAILED) }),
            },
            Phase::Checking { question, selected, .. } => match reply.result {
                Ok(Payload::Answer(result)) => {
                    self.score.record(result.correct);
                    info!(correct = result.correct, "answer checked");
                    self.set_phase(Phase::Answered { question, selected, result });
                }
                _ => self.set_phase(Phase::AwaitingSelection {
                    question,
                    cursor: selected,
                    selected: Some(selected),
                    error: Some(CHECK_FAILED),
                }),
            },
            Phase::GameOver(mut over) => {
                if over.report == ReportStatus::Pending(reply.ticket) {
                    over.report = if reply.result.is_ok() { ReportStatus::Saved } else { ReportStatus::Failed };
                    self.phase = Phase::GameOver(over);
                } else {
                    self.phase = Phase::GameOver(over);
                    return self.on_share_reply(reply, services);
                }
            }
            other => self.phase = other,
        }
        None
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        if let Phase::GameOver(over) = &self.phase {
            render_game_over(frame, area, over);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Score bar
                Constraint::Min(0),    // Question card
                Constraint::Length(1), // Key hints
            ])
            .split(area);

        let score_line = Line::from(vec![
            Span::styled(format!(" 🧭 {}", self.player), Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
            Span::styled("   ✅ Correct: ", Style::default().fg(MUTED)),
            Span::styled(self.score.correct.to_string(), Style::default().fg(GOOD).add_modifier(Modifier::BOLD)),
            Span::styled("   ❌ Wrong: ", Style::default().fg(MUTED)),
            Span::styled(self.score.incorrect.to_string(), Style::default().fg(BAD).add_modifier(Modifier::BOLD)),
        ]);
        let bar = Paragraph::new(score_line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Rgb(60, 60, 80))),
        );
        frame.render_widget(bar, chunks[0]);

        let inner = ui::card(frame, chunks[1], " Where am I? ", INFO);
        let (lines, hints) = match &self.phase {
            Phase::LoadingQuestion { error: Some(error), .. } => (
                vec![Line::from(""), Line::from(Span::styled(*error, Style::default().fg(BAD)))],
                ui::hints(&[("r", "retry")]),
            ),
            Phase::LoadingQuestion { .. } => (
                vec![
                    Line::from(""),
                    Line::from(Span::styled("Loading destination...", Style::default().fg(INFO))),
                ],
                Line::from(""),
            ),
            Phase::AwaitingSelection { question, cursor, selected, error } => {
                let mut lines = question_lines(question, Some(*cursor), *selected, None);
                if let Some(error) = error {
                    lines.push(Line::from(""));
                    lines.push(Line::from(Span::styled(*error, Style::default().fg(BAD))));
                }
                let hints = if selected.is_some() {
                    ui::hints(&[("↑↓/1-9", "move"), ("Space", "select"), ("Enter", "submit"), ("s", "skip"), ("e", "end game")])
                } else {
                    ui::hints(&[("↑↓/1-9", "move"), ("Space", "select"), ("s", "skip"), ("e", "end game")])
                };
                (lines, hints)
            }
            Phase::Checking { question, selected, .. } => {
                let mut lines = question_lines(question, None, Some(*selected), None);
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled("⏳ Checking...", Style::default().fg(INFO))));
                (lines, Line::from(""))
            }
            Phase::Answered { question, selected, result } => {
                let mut lines = question_lines(question, None, Some(*selected), Some(result.correct));
                lines.push(Line::from(""));
                lines.extend(feedback_lines(result));
                (lines, ui::hints(&[("n", "next question"), ("e", "end game")]))
            }
            Phase::GameOver(_) => (Vec::new(), Line::from("")),
        };

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
        frame.render_widget(Paragraph::new(hints), chunks[2]);
    }
}

fn question_lines(
    question: &Destination,
    cursor: Option<usize>,
    selected: Option<usize>,
    verdict: Option<bool>,
) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        "Clues",
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    ))];
    for clue in &question.clues {
        lines.push(Line::from(Span::styled(format!("  • {}", clue), Style::default().fg(TEXT))));
    }
    lines.push(Line::from(""));

    for (i, option) in question.options.iter().enumerate() {
        let pointer = if cursor == Some(i) { "▶" } else { " " };
        let mark = if selected == Some(i) { "(●)" } else { "( )" };
        let style = match (selected == Some(i), verdict) {
            (true, Some(true)) => Style::default().fg(GOOD).add_modifier(Modifier::BOLD),
            (true, Some(false)) => Style::default().fg(BAD).add_modifier(Modifier::BOLD),
            (true, None) => Style::default().fg(INFO).add_modifier(Modifier::BOLD),
            (false, Some(_)) => Style::default().fg(Color::Rgb(80, 80, 95)),
            (false, None) => Style::default().fg(TEXT),
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", pointer), Style::default().fg(ACCENT)),
            Span::styled(format!("{} {}. {}", mark, i + 1, option), style),
        ]));
    }
    lines
}

fn feedback_lines(result: &AnswerResult) -> Vec<Line<'static>> {
    let mut lines = vec![if result.correct {
        Line::from(Span::styled("✅ Correct!", Style::default().fg(GOOD).add_modifier(Modifier::BOLD)))
    } else {
        Line::from(Span::styled("❌ Wrong!", Style::default().fg(BAD).add_modifier(Modifier::BOLD)))
    }];
    if !result.fun_facts.is_empty() {
        lines.push(Line::from(Span::styled("Destination Fun Facts:", Style::default().fg(ACCENT))));
        for fact in &result.fun_facts {
            lines.push(Line::from(Span::styled(format!("  ★ {}", fact), Style::default().fg(TEXT))));
        }
    }
    lines
}

fn render_game_over(frame: &mut Frame, area: Rect, over: &GameOver) {
    let inner = ui::card(frame, ui::centered(area, 72, 22), " Game Over ", ACCENT);
    let score = over.final_score;
    let verdict = if score.correct > score.incorrect { "Great job! 🎉" } else { "Keep practicing! 💪" };
    let report = match over.report {
        ReportStatus::Pending(_) => Span::styled("saving score...", Style::default().fg(MUTED)),
        ReportStatus::Saved => Span::styled("score saved", Style::default().fg(GOOD)),
        ReportStatus::Failed => Span::styled("score could not be saved", Style::default().fg(BAD)),
    };

    let input_style = if over.editing {
        Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(MUTED)
    };
    let friend = if over.friend_name.is_empty() && !over.editing {
        "Friend's Name".to_string()
    } else {
        format!("{}{}", over.friend_name, if over.editing { "_" } else { "" })
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("✅ Correct: ", Style::default().fg(MUTED)),
            Span::styled(score.correct.to_string(), Style::default().fg(GOOD).add_modifier(Modifier::BOLD)),
            Span::styled("    ❌ Wrong: ", Style::default().fg(MUTED)),
            Span::styled(score.incorrect.to_string(), Style::default().fg(BAD).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(Span::styled(verdict, Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))),
        Line::from(report),
        Line::from(""),
        Line::from(Span::styled("Challenge a friend", Style::default().fg(INFO).add_modifier(Modifier::BOLD))),
        Line::from(vec![
            Span::styled("[ ", Style::default().fg(MUTED)),
            Span::styled(friend, input_style),
            Span::styled(" ]", Style::default().fg(MUTED)),
        ]),
    ];

    match &over.share {
        ShareStatus::Idle => lines.push(Line::from("")),
        ShareStatus::Pending(_) => {
            lines.push(Line::from(Span::styled("Creating challenge...", Style::default().fg(MUTED))))
        }
        ShareStatus::Ready(link) => {
            lines.push(Line::from(Span::styled(link.to_string(), Style::default().fg(INFO))))
        }
    }
    lines.push(Line::from(""));
    if over.editing {
        lines.push(ui::hints(&[("Enter", "share challenge"), ("Esc", "done")]).centered());
    } else {
        lines.push(ui::hints(&[("p", "play again"), ("x", "exit game"), ("Tab", "friend's name")]).centered());
    }

    let p = Paragraph::new(lines).alignment(Alignment::Center).wrap(Wrap { trim: false });
    frame.render_widget(p, inner);
}
