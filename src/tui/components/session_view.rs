//! # Session View
//!
//! Destination of a successful submission: the prompt that started the
//! session and the response as it streams in. Scrolls with the arrow keys
//! and follows the bottom while the response grows unless the user has
//! scrolled away.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Wrap};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use super::SPINNER_FRAMES;
use crate::core::state::SessionTranscript;
use crate::tui::component::EventHandler;
use crate::tui::event::TuiEvent;

pub struct SessionViewState {
    pub scroll_state: ScrollViewState,
    pub stick_to_bottom: bool,
    content_height: u16,
    viewport_height: u16,
}

impl Default for SessionViewState {
    fn default() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            stick_to_bottom: true,
            content_height: 0,
            viewport_height: 0,
        }
    }
}

impl SessionViewState {
    fn max_offset(&self) -> u16 {
        self.content_height.saturating_sub(self.viewport_height)
    }

    /// Re-engage following once the user scrolls back to the end.
    fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        if self.scroll_state.offset().y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position { x: 0, y: max_y });
        }
    }
}

impl EventHandler for SessionViewState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp | TuiEvent::CursorUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown | TuiEvent::CursorDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

pub struct SessionView<'a> {
    state: &'a mut SessionViewState,
    session_id: &'a str,
    transcript: Option<&'a SessionTranscript>,
    spinner_frame: usize,
}

impl<'a> SessionView<'a> {
    pub fn new(
        state: &'a mut SessionViewState,
        session_id: &'a str,
        transcript: Option<&'a SessionTranscript>,
        spinner_frame: usize,
    ) -> Self {
        Self {
            state,
            session_id,
            transcript,
            spinner_frame,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1);
        let header = self.header();

        // The transcript only covers the session started from this console
        let transcript = self
            .transcript
            .filter(|t| t.session.id == self.session_id);
        let (prompt, response) = match transcript {
            Some(t) => {
                let mut response = t.response.clone();
                if !t.done {
                    response.push(' ');
                    response.push_str(SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]);
                }
                (t.prompt.clone(), response)
            }
            None => (String::new(), "Open this session in the web UI for its history.".to_string()),
        };

        let prompt_block = bubble(prompt, " You ", Color::Cyan);
        let response_block = bubble(response, " Helix ", Color::Green);
        let header_height = header.line_count(content_width) as u16;
        let prompt_height = prompt_block.line_count(content_width) as u16;
        let response_height = response_block.line_count(content_width) as u16;
        let total = header_height + prompt_height + response_height;

        self.state.content_height = total;
        self.state.viewport_height = area.height;

        let mut scroll_view = ScrollView::new(Size::new(content_width, total))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);
        let mut y = 0;
        for (widget, height) in [
            (header, header_height),
            (prompt_block, prompt_height),
            (response_block, response_height),
        ] {
            scroll_view.render_widget(widget, Rect::new(0, y, content_width, height));
            y += height;
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        } else if self.state.scroll_state.offset().y > self.state.max_offset() {
            let max_y = self.state.max_offset();
            self.state.scroll_state.set_offset(Position { x: 0, y: max_y });
        }
        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }

    fn header(&self) -> Paragraph<'static> {
        let label = Style::default().fg(Color::DarkGray);
        let mut spans = vec![
            Span::styled("Session ", label),
            Span::styled(
                self.session_id.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ];
        if let Some(t) = self.transcript.filter(|t| t.session.id == self.session_id) {
            spans.push(Span::styled("  type ", label));
            spans.push(Span::raw(t.session.session_type.label()));
            if !t.session.model_name.is_empty() {
                spans.push(Span::styled("  model ", label));
                spans.push(Span::raw(t.session.model_name.clone()));
            }
        }
        Paragraph::new(vec![
            Line::from(spans),
            Line::from(Span::styled("Esc back to home", label)),
        ])
    }
}

fn bubble(text: String, title: &'static str, color: Color) -> Paragraph<'static> {
    Paragraph::new(text)
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color).add_modifier(Modifier::DIM))
                .title(Span::styled(title, Style::default().fg(color))),
        )
        .wrap(Wrap { trim: false })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Session, SessionType};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn transcript(done: bool) -> SessionTranscript {
        SessionTranscript {
            session: Session {
                id: "ses_1".to_string(),
                session_type: SessionType::Text,
                model_name: "llama3".to_string(),
            },
            prompt: "Tell me a joke".to_string(),
            response: "Why did the crab cross the road?".to_string(),
            done,
        }
    }

    fn rendered(state: &mut SessionViewState, transcript: Option<&SessionTranscript>) -> String {
        let backend = TestBackend::new(60, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| SessionView::new(state, "ses_1", transcript, 0).render(f, f.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_renders_prompt_and_response() {
        let mut state = SessionViewState::default();
        let t = transcript(true);
        let text = rendered(&mut state, Some(&t));
        assert!(text.contains("ses_1"));
        assert!(text.contains("llama3"));
        assert!(text.contains("Tell me a joke"));
        assert!(text.contains("crab cross the road"));
    }

    #[test]
    fn test_streaming_shows_spinner() {
        let mut state = SessionViewState::default();
        let t = transcript(false);
        let text = rendered(&mut state, Some(&t));
        assert!(text.contains(SPINNER_FRAMES[0]));
    }

    #[test]
    fn test_unknown_session_has_placeholder() {
        let mut state = SessionViewState::default();
        let text = rendered(&mut state, None);
        assert!(text.contains("web UI"));
    }

    #[test]
    fn test_scroll_up_unpins() {
        let mut state = SessionViewState::default();
        state.handle_event(&TuiEvent::ScrollUp);
        assert!(!state.stick_to_bottom);
        // Content fits, so any downward scroll is already at the bottom
        state.handle_event(&TuiEvent::ScrollDown);
        assert!(state.stick_to_bottom);
    }
}
