use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::router::Route;
use crate::core::state::{Console, Focus};
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::destination::{render_app_view, render_new_session_view};
use crate::tui::components::{
    AppGrid, ExampleList, ModelPicker, PromptControls, SessionView, TitleBar, Toast,
};

pub const FOOTER_TEXT: &str =
    "Open source models can make mistakes. Check facts, dates and events.";

/// Widest the home column gets on large terminals.
const HOME_MAX_WIDTH: u16 = 100;

pub fn draw_ui(
    frame: &mut Frame,
    console: &Console,
    tui: &mut TuiState,
    spinner_frame: usize,
    now: DateTime<Utc>,
) {
    use Constraint::{Length, Min};
    let [title_area, main_area, toast_area, footer_area] =
        Layout::vertical([Length(1), Min(0), Length(1), Length(1)]).areas(frame.area());

    TitleBar::new(
        console.server_label.clone(),
        console.account.as_ref().map(|u| u.id.clone()),
        console.status_message.clone(),
    )
    .render(frame, title_area);

    match console.router.current() {
        Route::Home => draw_home(frame, main_area, console, tui, spinner_frame, now),
        Route::Session { session_id } => {
            SessionView::new(
                &mut tui.session_view,
                session_id,
                console.active_session.as_ref(),
                spinner_frame,
            )
            .render(frame, main_area);
        }
        Route::App { app_id } => {
            let app = console.apps.iter().find(|a| &a.id == app_id);
            render_app_view(frame, main_area, app_id, app, now);
        }
        Route::New(_) => render_new_session_view(frame, main_area, console.router.current()),
    }

    if let Some(notification) = &console.notification {
        Toast { notification }.render(frame, toast_area);
    }

    frame.render_widget(
        Line::from(Span::styled(
            FOOTER_TEXT,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))
        .centered(),
        footer_area,
    );

    let full = frame.area();
    if let Some(picker) = tui.model_picker.as_mut() {
        ModelPicker::new(picker, &console.draft.model_name).render(frame, full);
    }
    if let Some(login) = &tui.login {
        login.render(frame, full);
    }
}

fn draw_home(
    frame: &mut Frame,
    area: Rect,
    console: &Console,
    tui: &mut TuiState,
    spinner_frame: usize,
    now: DateTime<Utc>,
) {
    use Constraint::{Length, Min};
    let [column] = Layout::horizontal([Length(HOME_MAX_WIDTH.min(area.width))])
        .flex(Flex::Center)
        .areas(area);

    let examples = console.current_examples();
    let prompt_height = tui.prompt.calculate_height(column.width);
    let [heading_area, prompt_area, controls_area, _, examples_area, apps_area] =
        Layout::vertical([
            Length(2),
            Length(prompt_height),
            Length(1),
            Length(1),
            Length(ExampleList::height(examples)),
            Min(0),
        ])
        .areas(column);

    frame.render_widget(
        Line::from(Span::styled(
            "What do you want to do?",
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .centered(),
        heading_area,
    );

    tui.prompt.focused = console.focus == Focus::Prompt
        && tui.model_picker.is_none()
        && tui.login.is_none();
    tui.prompt.render(frame, prompt_area);

    PromptControls {
        session_type: console.draft.session_type,
        model_name: &console.draft.model_name,
        loading: console.is_loading(),
        can_send: !console.draft.prompt.trim().is_empty(),
        spinner_frame,
    }
    .render(frame, controls_area);

    ExampleList::new(
        &mut tui.examples,
        examples,
        console.focus == Focus::Examples,
    )
    .render(frame, examples_area);

    let apps = console.recent_apps();
    AppGrid::new(&mut tui.apps, &apps, now, console.focus == Focus::Apps)
        .render(frame, apps_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::{Action, update};
    use crate::test_support::{sample_app, test_console, test_user};
    use chrono::TimeZone;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn screen(console: &Console, tui: &mut TuiState) -> String {
        let backend = TestBackend::new(100, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 6, 0, 0, 0).unwrap();
        terminal
            .draw(|f| draw_ui(f, console, tui, 0, now))
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
    fn test_home_screen_renders_sections() {
        let mut console = test_console();
        console.account = Some(test_user("alice"));
        console.apps = vec![sample_app("Writer", 3), sample_app("Painter", 5)];
        let mut tui = TuiState::new();
        let text = screen(&console, &mut tui);

        assert!(text.contains("What do you want to do?"));
        assert!(text.contains("Type: Text"));
        assert!(text.contains("Try an example"));
        assert!(text.contains("Recent apps"));
        assert!(text.contains("Painter"));
        assert!(text.contains("Create new app"));
        assert!(text.contains("alice"));
        assert!(text.contains(FOOTER_TEXT));
    }

    #[test]
    fn test_session_route_renders_transcript() {
        let mut console = test_console();
        console.draft.prompt = "Hello".to_string();
        update(&mut console, Action::SubmitPrompt);
        update(
            &mut console,
            Action::InferenceStarted {
                ticket: 1,
                session: crate::api::Session {
                    id: "ses_42".to_string(),
                    session_type: crate::api::SessionType::Text,
                    model_name: String::new(),
                },
                prompt: "Hello".to_string(),
            },
        );
        update(
            &mut console,
            Action::SessionsReloaded {
                ticket: 1,
                result: Ok(vec![]),
                then: Route::Session {
                    session_id: "ses_42".to_string(),
                },
            },
        );
        let mut tui = TuiState::new();
        let text = screen(&console, &mut tui);
        assert!(text.contains("ses_42"));
        assert!(text.contains("Hello"));
        assert!(!text.contains("Recent apps"));
    }

    #[test]
    fn test_notification_and_login_overlay() {
        let mut console = test_console();
        console.notify_error("Failed to start inference", std::time::Instant::now());
        let mut tui = TuiState::new();
        tui.login = Some(Default::default());
        let text = screen(&console, &mut tui);
        assert!(text.contains("Failed to start inference"));
        assert!(text.contains("Sign in"));
    }
}
