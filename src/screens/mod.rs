pub mod friend;
pub mod identity;
pub mod intro;
pub mod play;

use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use url::Url;

use crate::api::{Dispatch, Reply, Request, Ticket};
use crate::clipboard::Clipboard;
use crate::route::Route;
use crate::session::SessionStore;

/// Everything a screen may touch besides its own state.
pub struct Services {
    pub session: SessionStore,
    pub dispatcher: Box<dyn Dispatch>,
    pub clipboard: Box<dyn Clipboard>,
    pub share_origin: Url,
    /// Modal message shown over the current screen until a key is pressed.
    pub alert: Option<String>,
}

impl Services {
    pub fn new(
        session: SessionStore,
        dispatcher: Box<dyn Dispatch>,
        clipboard: Box<dyn Clipboard>,
        share_origin: Url,
    ) -> Self {
        Self { session, dispatcher, clipboard, share_origin, alert: None }
    }

    pub fn dispatch(&mut self, request: Request) -> Ticket {
        self.dispatcher.dispatch(request)
    }

    pub fn alert(&mut self, message: impl Into<String>) {
        self.alert = Some(message.into());
    }
}

/// A screen reacts to input, replies and ticks, and may ask to move to another route.
pub trait Screen {
    fn handle_input(&mut self, key: KeyEvent, services: &mut Services) -> Option<Route>;
    fn on_reply(&mut self, reply: Reply, services: &mut Services) -> Option<Route>;
    fn update(&mut self, _services: &mut Services) -> Option<Route> {
        None
    }
    fn render(&self, frame: &mut Frame, area: Rect);
}

/// Accepts `c` into a text field capped at `max_len` characters.
pub(crate) fn push_input_char(buffer: &mut String, c: char, max_len: usize) {
    if buffer.chars().count() < max_len && !c.is_control() {
        buffer.push(c);
    }
}
