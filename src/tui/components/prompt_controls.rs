//! # PromptControls Component
//!
//! The row under the prompt: session type, model, "+ Docs" and the send
//! button. While a submission is in flight the send button is dimmed and
//! shows a spinner. Keys still work; the core ignores a second submit.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use super::SPINNER_FRAMES;
use crate::api::SessionType;
use crate::tui::component::Component;

pub struct PromptControls<'a> {
    pub session_type: SessionType,
    pub model_name: &'a str,
    pub loading: bool,
    /// False while the prompt is blank.
    pub can_send: bool,
    pub spinner_frame: usize,
}

impl PromptControls<'_> {
    fn pickers(&self) -> Line<'static> {
        let key = Style::default().fg(Color::DarkGray);
        let value = Style::default().fg(Color::Cyan);
        let model = if self.model_name.is_empty() {
            "default".to_string()
        } else {
            self.model_name.to_string()
        };
        Line::from(vec![
            Span::styled("^T ", key),
            Span::raw("Type: "),
            Span::styled(self.session_type.label(), value),
            Span::raw("   "),
            Span::styled("^P ", key),
            Span::raw("Model: "),
            Span::styled(model, value),
            Span::raw("   "),
            Span::styled("^D ", key),
            Span::styled("+ Docs", value),
        ])
    }

    fn send_button(&self) -> Line<'static> {
        if self.loading {
            let frame = SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()];
            return Line::from(Span::styled(
                format!("{frame} Send "),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::DIM),
            ))
            .right_aligned();
        }
        let style = if self.can_send {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Line::from(Span::styled(" ⏎ Send ", style)).right_aligned()
    }
}

impl Component for PromptControls<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [left, right] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(10)]).areas(area);
        frame.render_widget(self.pickers(), left);
        frame.render_widget(self.send_button(), right);
    }
}
