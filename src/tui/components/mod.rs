//! # TUI Components
//!
//! All UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as props:
//! - `TitleBar`: server, user and status line
//! - `PromptControls`: type / model / docs / send row
//! - `Toast`: transient notification
//! - `destination`: app and new-session pages
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that keep presentation state and emit events. Overlays and
//! lists follow the persistent state + transient wrapper pattern: the
//! `...State` lives in `TuiState`, the wrapper is built each frame.
//! - `PromptBox`: multi-line prompt field
//! - `ExampleList`, `AppGrid`: home-screen lists
//! - `ModelPicker`, `LoginState`: overlays
//! - `SessionView`: scrollable streamed response
//!
//! ## Props-Based Data Flow
//!
//! Components receive external data as props, never by reaching into the
//! `Console`. That keeps dependencies explicit and components testable with
//! a `TestBackend`.

pub mod app_grid;
pub mod destination;
pub mod example_list;
pub mod login;
pub mod model_picker;
pub mod prompt_box;
pub mod prompt_controls;
pub mod session_view;
pub mod title_bar;
pub mod toast;

pub use app_grid::{AppGrid, AppGridEvent, AppGridState};
pub use example_list::{ExampleList, ExampleListState};
pub use login::{LoginEvent, LoginState};
pub use model_picker::{ModelPicker, ModelPickerEvent, ModelPickerState};
pub use prompt_box::{PromptBox, PromptEvent};
pub use prompt_controls::PromptControls;
pub use session_view::{SessionView, SessionViewState};
pub use title_bar::TitleBar;
pub use toast::Toast;

use ratatui::layout::{Constraint, Layout, Rect};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Truncate a string to fit within `max_width` display columns, appending `…`
/// if truncated.
pub fn truncate_to(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let budget = max_width - 1;
    let mut width = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        out.push(c);
    }
    out.push('…');
    out
}

/// Compute a centered rect using percentage of the outer rect.
pub fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_to() {
        assert_eq!(truncate_to("short", 10), "short");
        assert_eq!(truncate_to("exactly", 7), "exactly");
        assert_eq!(truncate_to("truncated", 6), "trunc…");
        assert_eq!(truncate_to("日本語テキスト", 5), "日本…");
        assert_eq!(truncate_to("anything", 0), "");
    }

    #[test]
    fn test_centered_rect_inside_outer() {
        let outer = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(60, 40, outer);
        assert_eq!(inner.width, 60);
        assert_eq!(inner.height, 20);
        assert_eq!(inner.x, 20);
    }
}
