use std::sync::mpsc;
use std::thread;

use tracing::{debug, error, warn};

use super::{Dispatch, QuizApi, Reply, Request, Ticket};
use crate::event::Event;

/// Runs API calls one at a time on a background thread and posts each
/// [`Reply`] back into the UI event channel.
pub struct Worker {
    tx: mpsc::Sender<(Ticket, Request)>,
    next_ticket: u64,
}

impl Worker {
    pub fn spawn(api: Box<dyn QuizApi>, events: mpsc::Sender<Event>) -> Self {
        let (tx, rx) = mpsc::channel::<(Ticket, Request)>();

        thread::spawn(move || {
            for (ticket, request) in rx {
                debug!(ticket = ticket.0, request = request.label(), "executing request");
                let result = request.execute(api.as_ref());
                if let Err(err) = &result {
                    warn!(ticket = ticket.0, request = request.label(), error = %err, "request failed");
                }
                if events.send(Event::Reply(Reply { ticket, result })).is_err() {
                    return;
                }
            }
        });

        Self { tx, next_ticket: 0 }
    }
}

impl Dispatch for Worker {
    fn dispatch(&mut self, request: Request) -> Ticket {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        if self.tx.send((ticket, request)).is_err() {
            error!(ticket = ticket.0, "API worker has stopped; request dropped");
        }
        ticket
    }
}
