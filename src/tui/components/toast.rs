//! # Toast
//!
//! One-line notification shown above the footer until it expires.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::state::{Notification, NotificationLevel};
use crate::tui::component::Component;

pub struct Toast<'a> {
    pub notification: &'a Notification,
}

impl Component for Toast<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let (icon, style) = match self.notification.level {
            NotificationLevel::Error => (
                "✗",
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            ),
            NotificationLevel::Info => ("✓", Style::default().fg(Color::Black).bg(Color::Green)),
        };
        let line = Line::from(Span::styled(
            format!(" {icon} {} ", self.notification.message),
            style,
        ))
        .centered();
        frame.render_widget(line, area);
    }
}
