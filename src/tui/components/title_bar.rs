//! # TitleBar Component
//!
//! Top status bar: product name, server, signed-in user and status message.
//!
//! ## Stateless Component
//!
//! TitleBar is purely presentational. It receives all data as props and has
//! no internal state:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar::new(
//!     console.server_label.clone(),
//!     console.account.as_ref().map(|u| u.id.clone()),
//!     console.status_message.clone(),
//! );
//! title_bar.render(frame, area);
//! ```
//!
//! ## Conditional Formatting
//!
//! 1. **Status message**: `"Lantern | http://localhost:8080 | alice | Creating app..."`
//! 2. **Default**: `"Lantern | http://localhost:8080 | alice"`
//!
//! Without an account the user segment reads `not signed in`.

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

pub struct TitleBar {
    /// Server URL or backend name
    pub server_label: String,
    /// Signed-in user id, if any
    pub user: Option<String>,
    /// Status message (e.g. "Starting session...")
    pub status_message: String,
}

impl TitleBar {
    pub fn new(server_label: String, user: Option<String>, status_message: String) -> Self {
        Self {
            server_label,
            user,
            status_message,
        }
    }

    fn title_text(&self) -> String {
        let user = self.user.as_deref().unwrap_or("not signed in");
        if self.status_message.is_empty() {
            format!("Lantern | {} | {}", self.server_label, user)
        } else {
            format!(
                "Lantern | {} | {} | {}",
                self.server_label, user, self.status_message
            )
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![Span::styled(
            self.title_text(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )]);
        frame.render_widget(line, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rendered(title_bar: &mut TitleBar) -> String {
        let backend = TestBackend::new(80, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| title_bar.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_title_bar_with_user_and_status() {
        let mut title_bar = TitleBar::new(
            "http://helix:8080".to_string(),
            Some("alice".to_string()),
            "Creating app...".to_string(),
        );
        let text = rendered(&mut title_bar);
        assert!(text.contains("Lantern"));
        assert!(text.contains("http://helix:8080"));
        assert!(text.contains("alice"));
        assert!(text.contains("Creating app..."));
    }

    #[test]
    fn test_title_bar_signed_out_no_status() {
        let mut title_bar = TitleBar::new("demo".to_string(), None, String::new());
        assert_eq!(title_bar.title_text(), "Lantern | demo | not signed in");
        let text = rendered(&mut title_bar);
        assert!(text.contains("not signed in"));
    }
}
