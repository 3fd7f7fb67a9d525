use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, KeyEvent, KeyEventKind};

use crate::api::Reply;

/// Milliseconds between ticks; screen timers count in ticks.
pub const TICK_RATE_MS: u64 = 100;

pub enum Event {
    Key(KeyEvent),
    Tick,
    Reply(Reply),
}

pub struct EventHandler {
    tx: mpsc::Sender<Event>,
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::channel();
        let tick_rate = Duration::from_millis(tick_rate_ms);

        let input_tx = tx.clone();
        thread::spawn(move || {
            let mut clock = TickClock::new(tick_rate, Instant::now());
            loop {
                if event::poll(clock.timeout(Instant::now())).unwrap_or(false) {
                    if let Ok(crossterm::event::Event::Key(key)) = event::read() {
                        if key.kind == KeyEventKind::Press && input_tx.send(Event::Key(key)).is_err() {
                            return;
                        }
                    }
                }
                if clock.fire(Instant::now()) && input_tx.send(Event::Tick).is_err() {
                    return;
                }
            }
        });

        Self { tx, rx }
    }

    /// Sender for other producers, such as the API worker.
    pub fn sender(&self) -> mpsc::Sender<Event> {
        self.tx.clone()
    }

    pub fn next(&self) -> io::Result<Event> {
        self.rx.recv().map_err(io::Error::other)
    }
}

/// Keeps ticks on schedule no matter how many keys arrive in between.
struct TickClock {
    rate: Duration,
    last: Instant,
}

impl TickClock {
    fn new(rate: Duration, now: Instant) -> Self {
        Self { rate, last: now }
    }

    /// How long to wait for input before the next tick is due.
    fn timeout(&self, now: Instant) -> Duration {
        self.rate.saturating_sub(now.saturating_duration_since(self.last))
    }

    /// True when a tick is due. Periods stay aligned to the start unless the
    /// clock fell more than a whole period behind.
    fn fire(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last);
        if elapsed < self.rate {
            return false;
        }
        self.last = if elapsed >= self.rate * 2 { now } else { self.last + self.rate };
        true
    }
}

/// Number of ticks covering `millis`, rounded up.
pub const fn ticks_for(millis: u64) -> u32 {
    millis.div_ceil(TICK_RATE_MS) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_round_up() {
        assert_eq!(ticks_for(2000), 20);
        assert_eq!(ticks_for(850), 9);
        assert_eq!(ticks_for(0), 0);
    }

    #[test]
    fn waits_only_for_the_rest_of_the_period() {
        let start = Instant::now();
        let clock = TickClock::new(Duration::from_millis(100), start);
        assert_eq!(clock.timeout(start), Duration::from_millis(100));
        assert_eq!(clock.timeout(start + Duration::from_millis(40)), Duration::from_millis(60));
        assert_eq!(clock.timeout(start + Duration::from_millis(150)), Duration::ZERO);
    }

    #[test]
    fn steady_key_repeat_does_not_starve_ticks() {
        let start = Instant::now();
        let mut clock = TickClock::new(Duration::from_millis(TICK_RATE_MS), start);
        // A held key delivers an event every 30ms for two seconds.
        let ticks = (1..=67)
            .map(|n| start + Duration::from_millis(30 * n))
            .filter(|&now| clock.fire(now))
            .count();
        assert!(ticks >= 19, "only {ticks} ticks in two seconds");
    }
}
