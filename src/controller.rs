use std::time::Duration;
use tracing::trace;

use crate::domain::{CtConfig, CtError, Message};
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent};

pub struct Controller {
    poll_time: Duration,
}

impl Controller {
    pub fn new(cfg: &CtConfig) -> Self {
        Self {
            poll_time: cfg.poll_duration(),
        }
    }

    pub fn handle_event(&self) -> Result<Option<Message>, CtError> {
        if event::poll(self.poll_time)? {
            match event::read()? {
                Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                    return Ok(self.handle_key(key));
                }
                Event::Resize(width, height) => {
                    return Ok(Some(Message::Resize(width as usize, height as usize)));
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn handle_key(&self, key: KeyEvent) -> Option<Message> {
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Esc => Some(Message::Exit),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
            KeyCode::Left | KeyCode::Char('h') => Some(Message::MoveLeft),
            KeyCode::Right | KeyCode::Char('l') => Some(Message::MoveRight),
            KeyCode::Enter | KeyCode::Char('s') => Some(Message::ToggleSort),
            KeyCode::Char(' ') => Some(Message::ToggleRow),
            KeyCode::Char('a') => Some(Message::ToggleAll),
            KeyCode::PageDown | KeyCode::Char('n') => Some(Message::NextPage),
            KeyCode::PageUp | KeyCode::Char('p') => Some(Message::PreviousPage),
            KeyCode::Home | KeyCode::Char('g') => Some(Message::FirstPage),
            KeyCode::End | KeyCode::Char('G') => Some(Message::LastPage),
            KeyCode::Char('+') => Some(Message::IncreasePageSize),
            KeyCode::Char('-') => Some(Message::DecreasePageSize),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
