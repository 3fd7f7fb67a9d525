use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info};

use crate::api::Reply;
use crate::route::Route;
use crate::screens::friend::FriendLanding;
use crate::screens::identity::IdentityEntry;
use crate::screens::intro::GameIntro;
use crate::screens::play::Play;
use crate::screens::{Screen, Services};

pub struct App {
    pub should_quit: bool,
    pub route: Route,
    pub services: Services,
    pub identity_entry: IdentityEntry,
    pub intro: GameIntro,
    pub play: Play,
    pub friend: FriendLanding,
}

impl App {
    pub fn new(services: Services) -> Self {
        Self {
            should_quit: false,
            route: Route::Home,
            services,
            identity_entry: IdentityEntry::new(),
            intro: GameIntro::new(),
            play: Play::new(),
            friend: FriendLanding::new(),
        }
    }

    /// Move to `route`, following any redirect the target screen asks for.
    pub fn open(&mut self, route: Route) {
        let mut next = Some(route);
        while let Some(route) = next.take() {
            info!(path = route.path(), "navigating");
            self.route = route.clone();
            next = match route {
                Route::Home => {
                    self.identity_entry.enter(&self.services);
                    None
                }
                Route::Intro { user_id } => self.intro.enter(user_id, &mut self.services),
                Route::Play => self.play.enter(&mut self.services),
                Route::Friend(invite) => self.friend.enter(invite, &mut self.services),
            };
        }
    }

    pub fn current_screen(&self) -> &dyn Screen {
        match self.route {
            Route::Home => &self.identity_entry,
            Route::Intro { .. } => &self.intro,
            Route::Play => &self.play,
            Route::Friend(_) => &self.friend,
        }
    }

    fn with_screen(&mut self, f: impl FnOnce(&mut dyn Screen, &mut Services) -> Option<Route>) {
        let screen: &mut dyn Screen = match self.route {
            Route::Home => &mut self.identity_entry,
            Route::Intro { .. } => &mut self.intro,
            Route::Play => &mut self.play,
            Route::Friend(_) => &mut self.friend,
        };
        if let Some(route) = f(screen, &mut self.services) {
            self.open(route);
        }
    }

    pub fn on_tick(&mut self) {
        self.with_screen(|screen, services| screen.update(services));
    }

    /// Replies only reach the screen that is showing; anything else was
    /// abandoned when the player navigated away.
    pub fn on_reply(&mut self, reply: Reply) {
        debug!(ticket = reply.ticket.0, path = self.route.path(), "reply received");
        self.with_screen(|screen, services| screen.on_reply(reply, services));
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        // Ctrl+C always quits
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        // An open alert swallows the key that dismisses it
        if self.services.alert.take().is_some() {
            return;
        }

        if key.code == KeyCode::Esc && self.route == Route::Home {
            self.should_quit = true;
            return;
        }

        self.with_screen(|screen, services| screen.handle_input(key, services));
    }
}
