//! # Destination Views
//!
//! Landing pages for the `app` and `new` routes. Both are read-only summaries
//! of what the route was opened with; editing happens on the server's web UI.

use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Wrap};

use crate::api::App;
use crate::core::router::Route;
use crate::core::time_ago::time_ago;

fn field(label: &str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<12}"), Style::default().fg(Color::DarkGray)),
        Span::raw(value.into()),
    ])
}

fn frame_block(title: String) -> Block<'static> {
    Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(" Esc Back ").centered())
        .padding(Padding::uniform(1))
}

/// The `app` route. `app` is `None` when the id is not in the loaded list
/// yet (a freshly created app before the refresh lands).
pub fn render_app_view(
    frame: &mut Frame,
    area: Rect,
    app_id: &str,
    app: Option<&App>,
    now: DateTime<Utc>,
) {
    let mut lines = vec![field("App", app_id.to_string())];
    match app {
        Some(app) => {
            let name = if app.name().is_empty() {
                "Untitled"
            } else {
                app.name()
            };
            lines.push(field("Name", name));
            lines.push(field("Avatar", app.avatar().unwrap_or("none")));
            if !app.config.helix.description.is_empty() {
                lines.push(field("Description", app.config.helix.description.clone()));
            }
            lines.push(field("Updated", time_ago(app.updated, now)));
        }
        None => lines.push(field("Status", "loading...")),
    }
    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(frame_block(" App ".to_string()));
    frame.render_widget(body, area);
}

/// The `new` route: shows the params it was navigated with.
pub fn render_new_session_view(frame: &mut Frame, area: Rect, route: &Route) {
    let params = route.params();
    let lines: Vec<Line> = if params.is_empty() {
        vec![Line::from("Start a new session with default settings.")]
    } else {
        params
            .iter()
            .map(|(key, value)| field(key, value.clone()))
            .collect()
    };
    let body = Paragraph::new(lines).block(frame_block(" New session ".to_string()));
    frame.render_widget(body, area);
}
