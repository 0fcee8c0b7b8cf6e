//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI, and
//! translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Effects
//!
//! Every `Effect` returned by `update()` is flattened and spawned as its own
//! tokio task running `effect::perform`. Finished tasks send their `Action`
//! back over a std channel that the loop drains between frames. Streamed
//! session text arrives on a long-lived tokio channel and is forwarded as
//! `Action::SessionChunk`.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (submission in flight, response streaming, toast shown):
//!   draws every ~80ms so the spinner turns and the toast expires on time.
//! - **Idle**: sleeps up to 500ms and only redraws on events, resize or
//!   background results.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use tokio::task::AbortHandle;

use crate::Backend;
use crate::api::{DemoBackend, HelixBackend, HelixService, SessionChunk};
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::effect::{flatten, perform};
use crate::core::router::Route;
use crate::core::state::{Console, Focus};
use crate::tui::component::EventHandler;
use crate::tui::components::{
    AppGridEvent, AppGridState, ExampleListState, LoginEvent, LoginState, ModelPickerEvent,
    ModelPickerState, PromptBox, PromptEvent, SessionViewState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const CHUNK_CHANNEL_CAPACITY: usize = 100;

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub prompt: PromptBox,
    pub examples: ExampleListState,
    pub apps: AppGridState,
    pub session_view: SessionViewState,
    // Overlays (None = hidden)
    pub model_picker: Option<ModelPickerState>,
    pub login: Option<LoginState>,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            prompt: PromptBox::new(),
            examples: ExampleListState::default(),
            apps: AppGridState::default(),
            session_view: SessionViewState::default(),
            model_picker: None,
            login: None,
        }
    }

    /// Pulls core state the components mirror: the prompt text (replaced on
    /// navigation or by an example) and the login overlay flag.
    fn sync(&mut self, console: &Console) {
        if self.prompt.text() != console.draft.prompt {
            self.prompt.set_text(&console.draft.prompt);
        }
        match (console.show_login, self.login.is_some()) {
            (true, false) => self.login = Some(LoginState::default()),
            (false, true) => self.login = None,
            _ => {}
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol lets Shift+Enter arrive as its own key.
        // Terminals without support ignore the request.
        execute!(
            stdout(),
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Build the server backend named by a resolved config.
pub fn build_service(config: &ResolvedConfig) -> Arc<dyn HelixService> {
    match config.backend {
        Backend::Demo => Arc::new(DemoBackend::new()),
        Backend::Helix => Arc::new(HelixBackend::new(
            config.server_url.clone(),
            config.api_key.clone(),
        )),
    }
}

/// Spawns effects and owns the channels their results travel on.
struct EffectRunner {
    service: Arc<dyn HelixService>,
    tx: mpsc::Sender<Action>,
    chunks: tokio::sync::mpsc::Sender<SessionChunk>,
    /// Tasks of the submission in flight, aborted by Esc.
    submission: Vec<AbortHandle>,
}

impl EffectRunner {
    fn new(service: Arc<dyn HelixService>, tx: mpsc::Sender<Action>) -> Self {
        let (chunk_tx, mut chunk_rx) =
            tokio::sync::mpsc::channel::<SessionChunk>(CHUNK_CHANNEL_CAPACITY);
        let forward_tx = tx.clone();
        tokio::spawn(async move {
            while let Some(chunk) = chunk_rx.recv().await {
                if forward_tx.send(Action::SessionChunk(chunk)).is_err() {
                    warn!("Failed to forward session chunk: receiver dropped");
                    return;
                }
            }
        });
        Self {
            service,
            tx,
            chunks: chunk_tx,
            submission: Vec::new(),
        }
    }

    /// Applies an action and spawns whatever it asks for. Returns true on quit.
    fn dispatch(&mut self, console: &mut Console, action: Action) -> bool {
        let mut quit = false;
        for effect in flatten(update(console, action)) {
            match effect {
                Effect::Quit => quit = true,
                Effect::StartInference { .. } => {
                    let handle = self.spawn(effect);
                    self.submission = vec![handle];
                }
                Effect::ReloadSessions { .. } => {
                    let handle = self.spawn(effect);
                    self.submission.push(handle);
                }
                other => {
                    self.spawn(other);
                }
            }
        }
        quit
    }

    fn spawn(&self, effect: Effect) -> AbortHandle {
        let service = self.service.clone();
        let tx = self.tx.clone();
        let chunks = self.chunks.clone();
        tokio::spawn(async move {
            if let Some(action) = perform(effect, service.as_ref(), chunks).await
                && tx.send(action).is_err()
            {
                warn!("Failed to send effect result: receiver dropped");
            }
        })
        .abort_handle()
    }

    fn cancel_submission(&mut self, console: &mut Console) {
        for handle in self.submission.drain(..) {
            handle.abort();
        }
        self.dispatch(console, Action::CancelSubmit);
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let service = build_service(&config);
    info!("Using backend '{}' at {}", service.name(), config.server_url);
    let mut console = Console::from_config(&config);
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    let (tx, rx) = mpsc::channel();
    let mut runner = EffectRunner::new(service, tx);
    runner.dispatch(&mut console, Action::Mount);

    let start_time = Instant::now();
    let mut needs_redraw = true;

    loop {
        tui.sync(&console);

        let streaming = console
            .active_session
            .as_ref()
            .is_some_and(|t| !t.done);
        let animating = console.is_loading() || streaming || console.notification.is_some();
        if animating {
            needs_redraw = true;
        }
        if console.notification.is_some() {
            runner.dispatch(&mut console, Action::Tick(Instant::now()));
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            let now = chrono::Utc::now();
            terminal.draw(|f| ui::draw_ui(f, &console, &mut tui, spinner_frame, now))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        let mut should_quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if handle_event(event, &mut console, &mut tui, &mut runner) {
                should_quit = true;
                break;
            }
            // Keep the overlays in step with actions dispatched this batch
            tui.sync(&console);
        }
        if should_quit {
            break;
        }

        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if runner.dispatch(&mut console, action) {
                should_quit = true;
            }
        }
        if should_quit {
            break;
        }
    }

    ratatui::restore();
    Ok(())
}

/// Routes one terminal event. Returns true when the app should quit.
fn handle_event(
    event: TuiEvent,
    console: &mut Console,
    tui: &mut TuiState,
    runner: &mut EffectRunner,
) -> bool {
    match event {
        TuiEvent::Resize => return false,
        TuiEvent::ForceQuit => return runner.dispatch(console, Action::Quit),
        _ => {}
    }

    // Overlays take every key while open
    if let Some(login) = tui.login.as_mut() {
        match login.handle_event(&event) {
            Some(LoginEvent::Submit(api_key)) => {
                return runner.dispatch(console, Action::SubmitLogin(api_key));
            }
            Some(LoginEvent::Dismiss) => {
                tui.login = None;
                return runner.dispatch(console, Action::DismissLogin);
            }
            None => return false,
        }
    }
    if let Some(picker) = tui.model_picker.as_mut() {
        match picker.handle_event(&event) {
            Some(ModelPickerEvent::Select(name)) => {
                tui.model_picker = None;
                return runner.dispatch(console, Action::SelectModel(name));
            }
            Some(ModelPickerEvent::Dismiss) => tui.model_picker = None,
            None => {}
        }
        return false;
    }

    if !console.router.is_home() {
        if matches!(event, TuiEvent::Escape) {
            tui.session_view = SessionViewState::default();
            return runner.dispatch(console, Action::Back);
        }
        if matches!(console.router.current(), Route::Session { .. }) {
            tui.session_view.handle_event(&event);
        }
        return false;
    }

    match event {
        TuiEvent::Escape if console.is_loading() => {
            runner.cancel_submission(console);
            false
        }
        TuiEvent::FocusNext => runner.dispatch(console, Action::FocusNext),
        TuiEvent::FocusPrev => runner.dispatch(console, Action::FocusPrev),
        TuiEvent::CycleSessionType => runner.dispatch(console, Action::CycleSessionType),
        TuiEvent::OpenModelPicker => {
            let models = console.models_for_type().into_iter().cloned().collect();
            tui.model_picker = Some(ModelPickerState::new(
                models,
                console.draft.session_type,
                &console.draft.model_name,
            ));
            false
        }
        TuiEvent::AddDocuments => runner.dispatch(console, Action::AddDocuments),
        TuiEvent::NewApp => runner.dispatch(console, Action::CreateApp),
        TuiEvent::Login => runner.dispatch(console, Action::RequestLogin),
        _ => match console.focus {
            Focus::Prompt => match tui.prompt.handle_event(&event) {
                Some(PromptEvent::Submit(text)) => {
                    runner.dispatch(console, Action::PromptEdited(text));
                    runner.dispatch(console, Action::SubmitPrompt)
                }
                Some(PromptEvent::Changed(text)) => {
                    runner.dispatch(console, Action::PromptEdited(text))
                }
                None => false,
            },
            Focus::Examples => {
                let picked = tui
                    .examples
                    .handle_event(&event, console.current_examples());
                match picked {
                    Some(example) => runner.dispatch(console, Action::UseExample(example)),
                    None => false,
                }
            }
            Focus::Apps => {
                let picked = tui.apps.handle_event(&event, &console.recent_apps());
                match picked {
                    Some(AppGridEvent::Open(app_id)) => {
                        runner.dispatch(console, Action::OpenApp(app_id))
                    }
                    Some(AppGridEvent::Create) => runner.dispatch(console, Action::CreateApp),
                    None => false,
                }
            }
        },
    }
}
