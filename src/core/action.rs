//! # Actions
//!
//! Everything that can happen in Lantern becomes an `Action`.
//! User presses Enter? That's `Action::SubmitPrompt`.
//! The server assigns a session id? That's `Action::InferenceStarted`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state and returns an `Effect` describing the I/O to run next. No side
//! effects here. I/O happens in `effect::perform`.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! Mount and dependency-change hooks live here too: entering the home route
//! and a change of account identity both return the effects a reactive page
//! would run from its lifecycle hooks.

use std::time::Instant;

use log::{debug, error, info, warn};

use crate::api::{
    ApiError, App, ModelEntry, NewInference, Session, SessionChunk, SessionMode, SessionSummary,
    User,
};
use crate::core::router::{NewSessionParams, Route};
use crate::core::state::{Console, Focus, SessionTranscript};

pub const INFERENCE_FAILED_MESSAGE: &str = "Failed to start inference";
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed";
pub const SERVER_UNREACHABLE_MESSAGE: &str = "Could not reach server";

#[derive(Debug)]
pub enum Action {
    /// First display of the home screen.
    Mount,

    // Prompt form
    PromptEdited(String),
    UseExample(String),
    CycleSessionType,
    SelectModel(String),
    SubmitPrompt,
    CancelSubmit,

    // Submission results, tagged with the ticket they belong to
    InferenceStarted {
        ticket: u64,
        session: Session,
        /// The prompt as submitted, not as it reads now.
        prompt: String,
    },
    InferenceEmpty { ticket: u64 },
    InferenceFailed { ticket: u64, message: String },
    SessionsReloaded {
        ticket: u64,
        result: Result<Vec<SessionSummary>, ApiError>,
        then: Route,
    },
    SessionChunk(SessionChunk),

    // Apps
    CreateApp,
    AppCreated(Result<Option<App>, ApiError>),
    AppsLoaded(Result<Vec<App>, ApiError>),
    OpenApp(String),
    AddDocuments,

    ModelsLoaded(Result<Vec<ModelEntry>, ApiError>),

    // Account
    AccountLoaded(Result<Option<User>, ApiError>),
    RequestLogin,
    SubmitLogin(String),
    LoginCompleted(Result<Option<User>, ApiError>),
    DismissLogin,

    // Navigation and chrome
    FocusNext,
    FocusPrev,
    Back,
    Tick(Instant),
    Quit,
}

/// I/O requested by `update`. Executed by `effect::perform`.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Quit,
    StartInference { ticket: u64, request: NewInference },
    ReloadSessions { ticket: u64, then: Route },
    LoadApps,
    CreateEmptyApp,
    FetchAccount,
    Login { api_key: String },
    LoadModels,
    Batch(Vec<Effect>),
}

pub fn update(console: &mut Console, action: Action) -> Effect {
    match action {
        Action::Mount => {
            console.focus = Focus::Prompt;
            Effect::Batch(vec![Effect::FetchAccount, Effect::LoadModels])
        }

        Action::PromptEdited(text) => {
            console.draft.prompt = text;
            Effect::None
        }

        Action::UseExample(text) => {
            console.draft.prompt = text;
            console.focus = Focus::Prompt;
            Effect::None
        }

        Action::CycleSessionType => {
            let next = console.draft.session_type.next();
            console.draft.session_type = next;
            let current = console
                .models
                .iter()
                .find(|m| m.name == console.draft.model_name);
            if let Some(model) = current
                && !model.supports(next)
            {
                console.draft.model_name = console
                    .models
                    .iter()
                    .find(|m| m.supports(next))
                    .map(|m| m.name.clone())
                    .unwrap_or_default();
            }
            console.status_message = format!("Type: {}", next.label());
            Effect::None
        }

        Action::SelectModel(name) => {
            console.status_message = format!("Model: {}", name);
            console.draft.model_name = name;
            Effect::None
        }

        Action::SubmitPrompt => {
            if console.draft.prompt.trim().is_empty() {
                return Effect::None;
            }
            if console.draft.loading {
                debug!("Submission ignored: ticket {} still in flight", console.ticket);
                return Effect::None;
            }
            console.draft.loading = true;
            console.ticket += 1;
            console.pending_chunks.clear();
            console.status_message = String::from("Starting session...");
            info!(
                "Submitting prompt (ticket={}, type={}, model={:?})",
                console.ticket, console.draft.session_type, console.draft.model_name
            );
            Effect::StartInference {
                ticket: console.ticket,
                request: NewInference {
                    session_type: console.draft.session_type,
                    message: console.draft.prompt.clone(),
                    model_name: console.draft.model_name.clone(),
                },
            }
        }

        Action::CancelSubmit => {
            if console.draft.loading {
                info!("Submission cancelled (ticket={})", console.ticket);
                console.draft.loading = false;
                console.ticket += 1;
                console.pending_chunks.clear();
                console.status_message = String::from("Cancelled");
            }
            Effect::None
        }

        Action::InferenceStarted {
            ticket,
            session,
            prompt,
        } => {
            if ticket != console.ticket {
                debug!("Dropping stale session {} (ticket={})", session.id, ticket);
                return Effect::None;
            }
            let route = Route::Session {
                session_id: session.id.clone(),
            };
            let mut transcript = SessionTranscript::new(session, prompt);
            for chunk in console.pending_chunks.drain(..) {
                if chunk.session_id == transcript.session.id {
                    transcript.append(&chunk);
                }
            }
            console.active_session = Some(transcript);
            Effect::ReloadSessions {
                ticket,
                then: route,
            }
        }

        Action::InferenceEmpty { ticket } => {
            if ticket != console.ticket {
                return Effect::None;
            }
            warn!("Inference start returned no session (ticket={})", ticket);
            console.draft.loading = false;
            console.pending_chunks.clear();
            console.status_message.clear();
            Effect::None
        }

        Action::InferenceFailed { ticket, message } => {
            if ticket != console.ticket {
                return Effect::None;
            }
            error!("Inference start failed: {}", message);
            console.pending_chunks.clear();
            fail_submission(console);
            Effect::None
        }

        Action::SessionsReloaded {
            ticket,
            result,
            then,
        } => {
            let reloaded = match result {
                Ok(sessions) => {
                    console.sessions = sessions;
                    true
                }
                Err(e) => {
                    warn!("Session list reload failed: {}", e);
                    false
                }
            };
            if ticket != console.ticket {
                return Effect::None;
            }
            if !reloaded {
                console.active_session = None;
                fail_submission(console);
                return Effect::None;
            }
            console.draft.loading = false;
            console.status_message.clear();
            navigate(console, then)
        }

        Action::SessionChunk(chunk) => {
            match console.active_session.as_mut() {
                Some(transcript) if transcript.session.id == chunk.session_id => {
                    transcript.append(&chunk);
                }
                _ if console.draft.loading => {
                    debug!("Holding chunk for {} until its session starts", chunk.session_id);
                    console.pending_chunks.push(chunk);
                }
                _ => debug!("Chunk for inactive session {}", chunk.session_id),
            }
            Effect::None
        }

        Action::CreateApp => {
            if console.account.is_none() {
                console.show_login = true;
                return Effect::None;
            }
            console.status_message = String::from("Creating app...");
            Effect::CreateEmptyApp
        }

        Action::AppCreated(result) => {
            console.status_message.clear();
            match result {
                Ok(Some(app)) => {
                    info!("Created app {}", app.id);
                    let route = Route::App { app_id: app.id };
                    match navigate(console, route) {
                        Effect::None => Effect::LoadApps,
                        other => Effect::Batch(vec![Effect::LoadApps, other]),
                    }
                }
                Ok(None) => {
                    debug!("App creation returned nothing");
                    Effect::None
                }
                Err(e) => {
                    warn!("App creation failed: {}", e);
                    Effect::None
                }
            }
        }

        Action::AppsLoaded(result) => {
            match result {
                Ok(apps) => {
                    debug!("Loaded {} apps", apps.len());
                    console.apps = apps;
                }
                Err(e) => warn!("Failed to load apps: {}", e),
            }
            Effect::None
        }

        Action::OpenApp(app_id) => navigate(
            console,
            Route::New(NewSessionParams {
                app_id: Some(app_id),
                ..Default::default()
            }),
        ),

        Action::AddDocuments => {
            let model = Some(console.draft.model_name.clone()).filter(|m| !m.is_empty());
            let params = NewSessionParams {
                app_id: None,
                model,
                session_type: Some(console.draft.session_type),
                mode: Some(SessionMode::Finetune),
                rag: true,
            };
            navigate(console, Route::New(params))
        }

        Action::ModelsLoaded(result) => {
            match result {
                Ok(server_models) => {
                    for model in server_models {
                        if !console.models.iter().any(|m| m.name == model.name) {
                            console.models.push(model);
                        }
                    }
                    debug!("{} models available", console.models.len());
                }
                Err(e) => warn!("Failed to load models: {}", e),
            }
            Effect::None
        }

        Action::AccountLoaded(result) => match result {
            Ok(user) => set_account(console, user),
            Err(e) => {
                warn!("Failed to fetch account: {}", e);
                console.notify_error(SERVER_UNREACHABLE_MESSAGE, Instant::now());
                set_account(console, None)
            }
        },

        Action::RequestLogin => {
            console.show_login = true;
            Effect::None
        }

        Action::SubmitLogin(api_key) => {
            let api_key = api_key.trim().to_string();
            if api_key.is_empty() {
                return Effect::None;
            }
            console.status_message = String::from("Signing in...");
            Effect::Login { api_key }
        }

        Action::LoginCompleted(result) => {
            console.status_message.clear();
            match result {
                Ok(Some(user)) => {
                    console.show_login = false;
                    console.notify_info(format!("Signed in as {}", user.id), Instant::now());
                    set_account(console, Some(user))
                }
                Ok(None) => {
                    warn!("Login rejected");
                    console.notify_error(LOGIN_FAILED_MESSAGE, Instant::now());
                    Effect::None
                }
                Err(e) => {
                    warn!("Login failed: {}", e);
                    console.notify_error(LOGIN_FAILED_MESSAGE, Instant::now());
                    Effect::None
                }
            }
        }

        Action::DismissLogin => {
            console.show_login = false;
            Effect::None
        }

        Action::FocusNext => {
            console.focus = console.focus.next();
            Effect::None
        }

        Action::FocusPrev => {
            console.focus = console.focus.prev();
            Effect::None
        }

        Action::Back => {
            if console.router.back() && console.router.is_home() {
                enter_home(console)
            } else {
                Effect::None
            }
        }

        Action::Tick(now) => {
            console.expire_notification(now);
            Effect::None
        }

        Action::Quit => Effect::Quit,
    }
}

/// Clears the busy flag and raises the failure toast. The prompt is kept.
fn fail_submission(console: &mut Console) {
    console.draft.loading = false;
    console.status_message.clear();
    console.notify_error(INFERENCE_FAILED_MESSAGE, Instant::now());
}

/// Routes through the router and runs the matching leave/enter hooks.
fn navigate(console: &mut Console, route: Route) -> Effect {
    let to_home = route == Route::Home;
    console.router.navigate(route);
    if to_home {
        enter_home(console)
    } else {
        console.draft = console.fresh_draft();
        Effect::None
    }
}

/// Mount hooks of the home route.
fn enter_home(console: &mut Console) -> Effect {
    console.draft = console.fresh_draft();
    console.focus = Focus::Prompt;
    if console.account.is_some() {
        Effect::LoadApps
    } else {
        Effect::None
    }
}

/// Replaces the account. A new identity shown on the home route refreshes
/// the apps collection.
fn set_account(console: &mut Console, user: Option<User>) -> Effect {
    let changed = console.account.as_ref().map(|u| &u.id) != user.as_ref().map(|u| &u.id);
    console.account = user;
    match &console.account {
        Some(user) if changed => {
            info!("Signed in as {}", user.id);
            if console.router.is_home() {
                Effect::LoadApps
            } else {
                Effect::None
            }
        }
        None if changed => {
            info!("Signed out");
            console.apps.clear();
            Effect::None
        }
        _ => Effect::None,
    }
}
