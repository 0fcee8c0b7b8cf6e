//! # Login Overlay
//!
//! Asks for an API key. Shown when an action needs an account and nobody is
//! signed in, or on Ctrl+L. The key is masked while typing.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Clear, Padding, Paragraph};

use super::centered_rect;
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum LoginEvent {
    Submit(String),
    Dismiss,
}

#[derive(Default)]
pub struct LoginState {
    pub api_key: String,
}

impl LoginState {
    pub fn handle_event(&mut self, event: &TuiEvent) -> Option<LoginEvent> {
        match event {
            TuiEvent::InputChar(c) => {
                self.api_key.push(*c);
                None
            }
            TuiEvent::Paste(text) => {
                self.api_key.push_str(text.trim());
                None
            }
            TuiEvent::Backspace => {
                self.api_key.pop();
                None
            }
            TuiEvent::Submit => Some(LoginEvent::Submit(self.api_key.clone())),
            TuiEvent::Escape => Some(LoginEvent::Dismiss),
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(60, 30, area);
        frame.render_widget(Clear, overlay);

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Sign in ")
            .title_bottom(Line::from(" Enter Sign in  Esc Cancel ").centered())
            .padding(Padding::uniform(1));

        let masked = "•".repeat(self.api_key.chars().count());
        let body = Paragraph::new(vec![
            Line::from("You need an account to create apps."),
            Line::from(""),
            Line::from(format!("API key: {masked}")),
        ])
        .alignment(Alignment::Left)
        .block(block);
        frame.render_widget(body, overlay);
    }
}
