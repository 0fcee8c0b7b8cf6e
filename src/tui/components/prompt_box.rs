//! # PromptBox Component
//!
//! Multi-line prompt field of the home screen.
//!
//! - Enter emits `Submit` with the current text. The buffer is left alone:
//!   the core decides whether the text is worth submitting and the draft is
//!   replaced when the router leaves home.
//! - Shift+Enter (or Ctrl+J) inserts a newline and never submits.
//! - Rows are laid out by display width, so wide glyphs and combining marks
//!   keep the cursor where the terminal draws it.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Borders (2) + horizontal padding (2)
const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders
const VERTICAL_OVERHEAD: u16 = 2;
const MAX_VISIBLE_ROWS: u16 = 6;
const MIN_VISIBLE_ROWS: u16 = 2;

const PLACEHOLDER: &str = "What do you want to do?";

#[derive(Debug, Clone, PartialEq)]
pub enum PromptEvent {
    /// Enter pressed; carries the text as typed.
    Submit(String),
    /// The text changed through editing.
    Changed(String),
}

pub struct PromptBox {
    buffer: String,
    /// Byte offset into `buffer`, always on a char boundary.
    cursor: usize,
    /// First visible row.
    scroll: u16,
    /// Inner width from the last render, used for vertical movement.
    last_width: u16,
    /// Prop: whether the prompt has keyboard focus.
    pub focused: bool,
}

impl Default for PromptBox {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            scroll: 0,
            last_width: 76,
            focused: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Replaces the text and parks the cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.buffer = text.to_string();
        self.cursor = self.buffer.len();
        self.scroll = 0;
    }

    /// Height needed for the current text at the given outer width.
    pub fn calculate_height(&self, area_width: u16) -> u16 {
        let width = area_width.saturating_sub(HORIZONTAL_OVERHEAD) as usize;
        let rows = layout_rows(&self.buffer, width).len() as u16;
        rows.clamp(MIN_VISIBLE_ROWS, MAX_VISIBLE_ROWS) + VERTICAL_OVERHEAD
    }

    fn insert(&mut self, text: &str) -> Option<PromptEvent> {
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
        self.changed()
    }

    fn changed(&self) -> Option<PromptEvent> {
        Some(PromptEvent::Changed(self.buffer.clone()))
    }

    fn move_vertically(&mut self, down: bool) -> bool {
        let rows = layout_rows(&self.buffer, self.last_width as usize);
        let (row, col) = cursor_cell(&self.buffer, &rows, self.cursor);
        let target = if down {
            row + 1
        } else {
            match row.checked_sub(1) {
                Some(r) => r,
                None => return false,
            }
        };
        let Some(&(start, end)) = rows.get(target) else {
            return false;
        };
        self.cursor = offset_at_column(&self.buffer[start..end], col) + start;
        true
    }

    fn keep_cursor_visible(&mut self, rows: &[(usize, usize)], visible: u16) {
        let (row, _) = cursor_cell(&self.buffer, rows, self.cursor);
        let row = row as u16;
        if row < self.scroll {
            self.scroll = row;
        } else if row >= self.scroll + visible {
            self.scroll = row + 1 - visible;
        }
    }
}

impl Component for PromptBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = area.width.saturating_sub(HORIZONTAL_OVERHEAD);
        self.last_width = width;
        let visible = area.height.saturating_sub(VERTICAL_OVERHEAD).max(1);
        let rows = layout_rows(&self.buffer, width as usize);
        self.keep_cursor_visible(&rows, visible);

        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .padding(Padding::horizontal(1));

        let paragraph = if self.buffer.is_empty() {
            Paragraph::new(PLACEHOLDER).style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            let lines: Vec<Line> = rows
                .iter()
                .skip(self.scroll as usize)
                .take(visible as usize)
                .map(|&(start, end)| Line::raw(&self.buffer[start..end]))
                .collect();
            Paragraph::new(lines)
        };
        frame.render_widget(paragraph.block(block), area);

        if self.focused {
            let (row, col) = cursor_cell(&self.buffer, &rows, self.cursor);
            let x = area.x + 2 + (col as u16).min(width);
            let y = area.y + 1 + (row as u16).saturating_sub(self.scroll);
            frame.set_cursor_position((x, y));
        }
    }
}

impl EventHandler for PromptBox {
    type Event = PromptEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::Submit => Some(PromptEvent::Submit(self.buffer.clone())),
            TuiEvent::Newline => self.insert("\n"),
            TuiEvent::InputChar(c) => self.insert(c.encode_utf8(&mut [0; 4])),
            TuiEvent::Paste(text) => self.insert(text),
            TuiEvent::Backspace => {
                let prev = self.buffer[..self.cursor].char_indices().next_back()?.0;
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                self.changed()
            }
            TuiEvent::Delete => {
                let len = self.buffer[self.cursor..].chars().next()?.len_utf8();
                self.buffer.drain(self.cursor..self.cursor + len);
                self.changed()
            }
            TuiEvent::CursorLeft => {
                if let Some((prev, _)) = self.buffer[..self.cursor].char_indices().next_back() {
                    self.cursor = prev;
                }
                None
            }
            TuiEvent::CursorRight => {
                if let Some(c) = self.buffer[self.cursor..].chars().next() {
                    self.cursor += c.len_utf8();
                }
                None
            }
            TuiEvent::CursorHome => {
                self.cursor = self.buffer[..self.cursor]
                    .rfind('\n')
                    .map_or(0, |i| i + 1);
                None
            }
            TuiEvent::CursorEnd => {
                self.cursor = self.buffer[self.cursor..]
                    .find('\n')
                    .map_or(self.buffer.len(), |i| self.cursor + i);
                None
            }
            TuiEvent::CursorUp => {
                self.move_vertically(false);
                None
            }
            TuiEvent::CursorDown => {
                self.move_vertically(true);
                None
            }
            _ => None,
        }
    }
}

/// Splits `text` into display rows no wider than `width` columns, returned as
/// byte ranges. Newlines end a row and are not part of it. There is always at
/// least one row.
fn layout_rows(text: &str, width: usize) -> Vec<(usize, usize)> {
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut start = 0;
    let mut col = 0;
    for (i, c) in text.char_indices() {
        if c == '\n' {
            rows.push((start, i));
            start = i + 1;
            col = 0;
            continue;
        }
        let w = c.width().unwrap_or(0);
        if col + w > width && i > start {
            rows.push((start, i));
            start = i;
            col = 0;
        }
        col += w;
    }
    rows.push((start, text.len()));
    rows
}

/// Row and display column of byte offset `pos`.
fn cursor_cell(text: &str, rows: &[(usize, usize)], pos: usize) -> (usize, usize) {
    let row = rows
        .iter()
        .rposition(|&(start, _)| start <= pos)
        .unwrap_or(0);
    let (start, end) = rows[row];
    let col = display_width(&text[start..pos.min(end).max(start)]);
    (row, col)
}

/// Byte offset within `line` of the last char boundary at or before `col`.
fn offset_at_column(line: &str, col: usize) -> usize {
    let mut width = 0;
    for (i, c) in line.char_indices() {
        width += c.width().unwrap_or(0);
        if width > col {
            return i;
        }
    }
    line.len()
}

fn display_width(s: &str) -> usize {
    s.chars().map(|c| c.width().unwrap_or(0)).sum()
}
