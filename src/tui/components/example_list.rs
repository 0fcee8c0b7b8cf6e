//! # Example Prompts
//!
//! A short list of canned prompts for the current session type. Enter copies
//! the highlighted prompt into the prompt field.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `ExampleListState` lives in `TuiState`
//! - `ExampleList` is created each frame with borrowed state

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use crate::tui::event::TuiEvent;

#[derive(Default)]
pub struct ExampleListState {
    pub selected: usize,
    pub list_state: ListState,
}

impl ExampleListState {
    /// Moves the highlight or picks an example from `examples`.
    pub fn handle_event(&mut self, event: &TuiEvent, examples: &[String]) -> Option<String> {
        if examples.is_empty() {
            return None;
        }
        self.selected = self.selected.min(examples.len() - 1);
        match event {
            TuiEvent::CursorUp => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            TuiEvent::CursorDown => {
                self.selected = (self.selected + 1).min(examples.len() - 1);
                None
            }
            TuiEvent::Submit => examples.get(self.selected).cloned(),
            _ => None,
        }
    }
}

pub struct ExampleList<'a> {
    state: &'a mut ExampleListState,
    examples: &'a [String],
    focused: bool,
}

impl<'a> ExampleList<'a> {
    pub fn new(state: &'a mut ExampleListState, examples: &'a [String], focused: bool) -> Self {
        Self {
            state,
            examples,
            focused,
        }
    }

    /// Title row plus one row per example.
    pub fn height(examples: &[String]) -> u16 {
        examples.len() as u16 + 1
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title_style = if self.focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(" Try an example ", title_style));

        let items: Vec<ListItem> = self
            .examples
            .iter()
            .map(|example| ListItem::new(Line::from(format!("  {example}"))))
            .collect();

        let highlight = if self.focused {
            Style::default().fg(Color::White).add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };

        if self.examples.is_empty() {
            self.state.list_state.select(None);
        } else {
            self.state.selected = self.state.selected.min(self.examples.len() - 1);
            self.state
                .list_state
                .select(self.focused.then_some(self.state.selected));
        }

        let list = List::new(items)
            .block(block)
            .style(Style::default().fg(Color::Gray))
            .highlight_style(highlight);
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}
