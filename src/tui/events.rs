use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CEvent, KeyEvent, KeyEventKind};

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Polls the terminal on a background thread. The thread ends once the
/// receiving side is dropped.
pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::channel();
        let tick_rate = Duration::from_millis(tick_rate_ms.max(50));

        thread::spawn(move || {
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::ZERO);

                if event::poll(timeout).unwrap_or(false) {
                    let forwarded = match event::read() {
                        // key repeat and release events would double every keystroke on Windows
                        Ok(CEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                            Some(Event::Key(key))
                        }
                        Ok(CEvent::Resize(..)) => Some(Event::Resize),
                        Ok(_) => None,
                        Err(err) => {
                            log::error!("terminal read failed: {}", err);
                            break;
                        }
                    };
                    if let Some(ev) = forwarded {
                        if tx.send(ev).is_err() {
                            break;
                        }
                    }
                }

                if last_tick.elapsed() >= tick_rate {
                    if tx.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        Self { rx }
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}

/// Counts ticks and fires once every `every` of wall time.
#[derive(Debug)]
pub struct Poller {
    every: Duration,
    last: Instant,
}

impl Poller {
    pub fn new(every_secs: u64) -> Self {
        Self {
            every: Duration::from_secs(every_secs.max(1)),
            last: Instant::now(),
        }
    }

    /// True when a poll is due at `now`; resets the clock when it is.
    pub fn due(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last) >= self.every {
            self.last = now;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self, now: Instant) {
        self.last = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poller_fires_once_per_interval() {
        let start = Instant::now();
        let mut poller = Poller::new(10);
        poller.reset(start);
        assert!(!poller.due(start + Duration::from_secs(3)));
        assert!(poller.due(start + Duration::from_secs(10)));
        assert!(!poller.due(start + Duration::from_secs(15)));
        assert!(poller.due(start + Duration::from_secs(21)));
    }
}
