//! Doubles and helpers shared by the screen and app tests.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use url::Url;

use crate::api::{AnswerResult, Destination, Dispatch, Payload, Reply, Request, Ticket, User};
use crate::clipboard::Clipboard;
use crate::error::ApiError;
use crate::screens::Services;
use crate::session::{Identity, SessionStore};

/// Records dispatched requests instead of performing them.
#[derive(Clone, Default)]
pub struct Recorder {
    sent: Rc<RefCell<Vec<(Ticket, Request)>>>,
}

impl Recorder {
    pub fn requests(&self) -> Vec<Request> {
        self.sent.borrow().iter().map(|(_, request)| request.clone()).collect()
    }

    pub fn last(&self) -> (Ticket, Request) {
        self.sent.borrow().last().cloned().expect("a request was dispatched")
    }

    pub fn count(&self, matches: impl Fn(&Request) -> bool) -> usize {
        self.sent.borrow().iter().filter(|(_, request)| matches(request)).count()
    }
}

impl Dispatch for Recorder {
    fn dispatch(&mut self, request: Request) -> Ticket {
        let mut sent = self.sent.borrow_mut();
        let ticket = Ticket(sent.len() as u64 + 1);
        sent.push((ticket, request));
        ticket
    }
}

#[derive(Clone, Default)]
pub struct MemoryClipboard {
    pub contents: Rc<RefCell<Option<String>>>,
}

impl Clipboard for MemoryClipboard {
    fn copy(&mut self, text: &str) -> io::Result<()> {
        *self.contents.borrow_mut() = Some(text.to_string());
        Ok(())
    }
}

pub struct Harness {
    pub services: Services,
    pub recorder: Recorder,
    pub clipboard: MemoryClipboard,
}

impl Harness {
    pub fn new() -> Self {
        let recorder = Recorder::default();
        let clipboard = MemoryClipboard::default();
        let services = Services::new(
            SessionStore::in_memory(),
            Box::new(recorder.clone()),
            Box::new(clipboard.clone()),
            Url::parse("https://quiz.example").expect("origin"),
        );
        Self { services, recorder, clipboard }
    }

    pub fn signed_in(user_id: &str, user_name: &str) -> Self {
        let mut harness = Self::new();
        harness.services.session.establish(Identity::new(user_id, user_name));
        harness
    }
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

pub fn ch(c: char) -> KeyEvent {
    key(KeyCode::Char(c))
}

pub fn ok(ticket: Ticket, payload: Payload) -> Reply {
    Reply { ticket, result: Ok(payload) }
}

pub fn failed(ticket: Ticket, error: ApiError) -> Reply {
    Reply { ticket, result: Err(error) }
}

pub fn user(id: &str, name: &str) -> Payload {
    Payload::User(User { id: id.into(), display_name: name.into(), score: None })
}

pub fn destination(id: &str, options: &[&str]) -> Payload {
    Payload::Destination(Destination {
        id: id.into(),
        clues: vec!["Home to a famous tower".into()],
        options: options.iter().map(|o| o.to_string()).collect(),
    })
}

pub fn verdict(correct: bool, facts: &[&str]) -> Payload {
    Payload::Answer(AnswerResult { correct, fun_facts: facts.iter().map(|f| f.to_string()).collect() })
}

/// Renders with `draw` into an off-screen buffer and returns its text.
pub fn render_to_string(draw: impl FnOnce(&mut ratatui::Frame)) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 36)).expect("test terminal");
    terminal.draw(draw).expect("draws");
    let buffer = terminal.backend().buffer();
    let mut out = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}
