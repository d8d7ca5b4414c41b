use std::time::Duration;
use tracing::trace;

use crate::domain::{CEConfig, CEError, Message};
use crate::model::Model;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyModifiers};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &CEConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, CEError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            match event::read()? {
                // crossterm also emits key release and repeat events on Windows.
                Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                    return Ok(self.handle_key(key, model.raw_keyevents()));
                }
                Event::Resize(width, height) => {
                    return Ok(Some(Message::Resize(width as usize, height as usize)));
                }
                _ => {}
            }
        }
        Ok(None)
    }

    /// While an input line is active every key goes to it untranslated.
    pub fn handle_key(&self, key: event::KeyEvent, raw: bool) -> Option<Message> {
        if raw {
            return Some(Message::RawKey(key));
        }
        let message = match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Message::Quit),
            (KeyCode::Char('q'), _) => Some(Message::Quit),
            (KeyCode::Up | KeyCode::Char('k'), _) => Some(Message::MoveUp),
            (KeyCode::Down | KeyCode::Char('j'), _) => Some(Message::MoveDown),
            (KeyCode::Left | KeyCode::Char('h'), _) => Some(Message::MoveLeft),
            (KeyCode::Right | KeyCode::Char('l'), _) => Some(Message::MoveRight),
            (KeyCode::PageUp, _) => Some(Message::MovePageUp),
            (KeyCode::PageDown, _) => Some(Message::MovePageDown),
            (KeyCode::Char('g') | KeyCode::Home, _) => Some(Message::MoveBeginning),
            (KeyCode::Char('G') | KeyCode::End, _) => Some(Message::MoveEnd),
            (KeyCode::Char('0'), _) => Some(Message::MoveToFirstColumn),
            (KeyCode::Char('$'), _) => Some(Message::MoveToLastColumn),
            (KeyCode::Enter | KeyCode::Char('e'), _) => Some(Message::Enter),
            (KeyCode::Esc, _) => Some(Message::Exit),
            (KeyCode::Char('a'), _) => Some(Message::AddRow),
            (KeyCode::Char('d') | KeyCode::Delete, _) => Some(Message::DeleteRow),
            (KeyCode::Char('s'), _) => Some(Message::Export),
            (KeyCode::Char('o'), _) => Some(Message::Open),
            (KeyCode::Char('y'), _) => Some(Message::CopyCell),
            (KeyCode::Char('Y'), _) => Some(Message::CopyRow),
            (KeyCode::Char('?'), _) => Some(Message::Help),
            (KeyCode::Char(':'), _) => Some(Message::EnterCommand),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
