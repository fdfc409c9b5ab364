use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

/// Terminal events the app reacts to
#[derive(Debug)]
pub enum AppEvent {
    /// Key press (releases and repeats are filtered out)
    Key(KeyEvent),
    /// Terminal resize
    Resize,
    /// Nothing happened within the tick
    Tick,
}

/// Polls the terminal with a fixed tick so worker messages keep flowing
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Wait up to one tick for the next event
    pub fn next(&self) -> color_eyre::Result<AppEvent> {
        if !event::poll(self.tick_rate)? {
            return Ok(AppEvent::Tick);
        }

        Ok(match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
            Event::Resize(_, _) => AppEvent::Resize,
            _ => AppEvent::Tick,
        })
    }
}
