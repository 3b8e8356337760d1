use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent};

use crate::session::practice::{EventSink, SessionEvent};

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Paste(String),
    Resize(#[allow(dead_code)] u16, #[allow(dead_code)] u16),
    Session(SessionEvent),
}

/// Single queue the interface loop drains: terminal input from the polling
/// thread and progress from practice workers.
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let input_tx = tx.clone();

        thread::spawn(move || {
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key)) => {
                            if input_tx.send(AppEvent::Key(key)).is_err() {
                                return;
                            }
                        }
                        Ok(Event::Paste(text)) => {
                            if input_tx.send(AppEvent::Paste(text)).is_err() {
                                return;
                            }
                        }
                        Ok(Event::Resize(w, h)) => {
                            if input_tx.send(AppEvent::Resize(w, h)).is_err() {
                                return;
                            }
                        }
                        _ => {}
                    }
                } else if input_tx.send(AppEvent::Tick).is_err() {
                    return;
                }
            }
        });

        Self { rx, tx }
    }

    /// Handle for background work to post session events onto this loop.
    pub fn session_sink(&self) -> SessionSender {
        SessionSender(self.tx.clone())
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}

#[derive(Clone)]
pub struct SessionSender(mpsc::Sender<AppEvent>);

impl SessionSender {
    pub fn new(tx: mpsc::Sender<AppEvent>) -> Self {
        Self(tx)
    }
}

impl EventSink for SessionSender {
    fn send_event(&self, event: SessionEvent) -> bool {
        self.0.send(AppEvent::Session(event)).is_ok()
    }
}
