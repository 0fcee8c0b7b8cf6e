//! # App Grid Component
//!
//! Recently used apps, three cards per row, newest first. The grid always
//! ends with a "Create new app" card.
//!
//! Each card shows an avatar glyph (the name's first letter, framed when
//! the app has an avatar image), the name truncated to the card width and
//! how long ago the app was updated.

use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use super::truncate_to;
use crate::api::App;
use crate::core::time_ago::time_ago;
use crate::tui::event::TuiEvent;

pub const CARDS_PER_ROW: usize = 3;
const CARD_HEIGHT: u16 = 4;

/// What the highlighted card asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum AppGridEvent {
    Open(String),
    Create,
}

#[derive(Default)]
pub struct AppGridState {
    /// Index into apps, where `apps.len()` is the create card.
    pub selected: usize,
}

impl AppGridState {
    pub fn handle_event(&mut self, event: &TuiEvent, apps: &[&App]) -> Option<AppGridEvent> {
        let cards = apps.len() + 1;
        self.selected = self.selected.min(cards - 1);
        match event {
            TuiEvent::CursorLeft => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            TuiEvent::CursorRight => {
                self.selected = (self.selected + 1).min(cards - 1);
                None
            }
            TuiEvent::CursorUp => {
                self.selected = self.selected.saturating_sub(CARDS_PER_ROW);
                None
            }
            TuiEvent::CursorDown => {
                if self.selected + CARDS_PER_ROW < cards {
                    self.selected += CARDS_PER_ROW;
                }
                None
            }
            TuiEvent::Submit => Some(match apps.get(self.selected) {
                Some(app) => AppGridEvent::Open(app.id.clone()),
                None => AppGridEvent::Create,
            }),
            _ => None,
        }
    }
}

pub struct AppGrid<'a> {
    state: &'a mut AppGridState,
    apps: &'a [&'a App],
    now: DateTime<Utc>,
    focused: bool,
}

impl<'a> AppGrid<'a> {
    pub fn new(
        state: &'a mut AppGridState,
        apps: &'a [&'a App],
        now: DateTime<Utc>,
        focused: bool,
    ) -> Self {
        Self {
            state,
            apps,
            now,
            focused,
        }
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
            .title(Span::styled(" Recent apps ", title_style));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let cards = self.apps.len() + 1;
        self.state.selected = self.state.selected.min(cards - 1);
        let rows = cards.div_ceil(CARDS_PER_ROW);
        let visible_rows = (inner.height / CARD_HEIGHT).max(1) as usize;
        // Keep the selected card's row on screen
        let selected_row = self.state.selected / CARDS_PER_ROW;
        let first_row = selected_row.saturating_sub(visible_rows - 1);

        for (slot, row) in (first_row..rows).take(visible_rows).enumerate() {
            let row_area = Rect {
                x: inner.x,
                y: inner.y + slot as u16 * CARD_HEIGHT,
                width: inner.width,
                height: CARD_HEIGHT.min(inner.height.saturating_sub(slot as u16 * CARD_HEIGHT)),
            };
            let columns = Layout::horizontal([Constraint::Ratio(1, CARDS_PER_ROW as u32); CARDS_PER_ROW])
                .split(row_area);
            for (col, cell) in columns.iter().enumerate() {
                let index = row * CARDS_PER_ROW + col;
                if index >= cards {
                    break;
                }
                let selected = self.focused && index == self.state.selected;
                match self.apps.get(index) {
                    Some(app) => self.render_card(frame, *cell, app, selected),
                    None => render_create_card(frame, *cell, selected),
                }
            }
        }
    }

    fn render_card(&self, frame: &mut Frame, area: Rect, app: &App, selected: bool) {
        let block = card_block(selected);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let avatar = if app.avatar().is_some() {
            format!("[{}]", app.initial())
        } else {
            format!(" {} ", app.initial())
        };
        let name_width = (inner.width as usize).saturating_sub(avatar.chars().count() + 1);
        let name = if app.name().is_empty() {
            "Untitled".to_string()
        } else {
            truncate_to(app.name(), name_width)
        };
        let lines = vec![
            Line::from(vec![
                Span::styled(
                    avatar,
                    Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
                Span::styled(name, Style::default().fg(Color::White)),
            ]),
            Line::from(Span::styled(
                time_ago(app.updated, self.now),
                Style::default().fg(Color::DarkGray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

fn render_create_card(frame: &mut Frame, area: Rect, selected: bool) {
    let block = card_block(selected);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let text = Paragraph::new(vec![
        Line::from(Span::styled("+", Style::default().fg(Color::Cyan))),
        Line::from("Create new app"),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(text, inner);
}

fn card_block(selected: bool) -> Block<'static> {
    let border_style = if selected {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(border_style)
}
