//! # Application State
//!
//! Core business state for Lantern. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! Console
//! ├── router: Router                    // route stack
//! ├── draft: PromptDraft                // home-screen form (reset on navigation)
//! ├── focus: Focus                      // prompt / examples / apps
//! ├── account: Option<User>             // signed-in user
//! ├── show_login: bool                  // login overlay visible
//! ├── apps: Vec<App>                    // as returned by the server
//! ├── sessions: Vec<SessionSummary>     // last session-list reload
//! ├── models: Vec<ModelEntry>           // configured + server models
//! ├── examples: ExamplePrompts          // per-type example prompts
//! ├── notification: Option<Notification>
//! ├── active_session: Option<SessionTranscript>
//! ├── status_message: String            // title bar text
//! └── ticket: u64                       // current submission ticket
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::time::{Duration, Instant};

use crate::Backend;
use crate::api::{App, ModelEntry, Session, SessionChunk, SessionSummary, SessionType, User};
use crate::core::config::{ExamplePrompts, ResolvedConfig};
use crate::core::router::Router;

/// Ephemeral form state of the home screen.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptDraft {
    pub prompt: String,
    pub session_type: SessionType,
    /// Empty = let the server pick.
    pub model_name: String,
    pub loading: bool,
}

impl PromptDraft {
    pub fn new(session_type: SessionType, model_name: String) -> Self {
        Self {
            prompt: String::new(),
            session_type,
            model_name,
            loading: false,
        }
    }
}

/// Which home-screen region receives keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Prompt,
    Examples,
    Apps,
}

impl Focus {
    pub fn next(self) -> Focus {
        match self {
            Focus::Prompt => Focus::Examples,
            Focus::Examples => Focus::Apps,
            Focus::Apps => Focus::Prompt,
        }
    }

    pub fn prev(self) -> Focus {
        match self {
            Focus::Prompt => Focus::Apps,
            Focus::Examples => Focus::Prompt,
            Focus::Apps => Focus::Examples,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// A transient toast.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub raised_at: Instant,
}

/// The session started from the home screen and its streamed response.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionTranscript {
    pub session: Session,
    pub prompt: String,
    pub response: String,
    pub done: bool,
}

impl SessionTranscript {
    pub fn new(session: Session, prompt: String) -> Self {
        Self {
            session,
            prompt,
            response: String::new(),
            done: false,
        }
    }

    pub fn append(&mut self, chunk: &SessionChunk) {
        self.response.push_str(&chunk.text);
        self.done |= chunk.done;
    }
}

pub struct Console {
    pub router: Router,
    pub draft: PromptDraft,
    pub focus: Focus,
    pub account: Option<User>,
    pub show_login: bool,
    pub apps: Vec<App>,
    pub sessions: Vec<SessionSummary>,
    pub models: Vec<ModelEntry>,
    pub examples: ExamplePrompts,
    pub notification: Option<Notification>,
    pub notification_ttl: Duration,
    pub active_session: Option<SessionTranscript>,
    /// Chunks that reached the loop before the start result naming their
    /// session. Only kept while a submission is in flight.
    pub pending_chunks: Vec<SessionChunk>,
    pub status_message: String,
    /// Identifies the current submission; results tagged with an older
    /// ticket are stale.
    pub ticket: u64,
    /// Shown in the title bar (server URL or backend name).
    pub server_label: String,
    default_session_type: SessionType,
    default_model: String,
}

impl Console {
    pub fn new(server_label: String) -> Self {
        Self {
            router: Router::new(),
            draft: PromptDraft::new(SessionType::default(), String::new()),
            focus: Focus::Prompt,
            account: None,
            show_login: false,
            apps: Vec::new(),
            sessions: Vec::new(),
            models: Vec::new(),
            examples: ExamplePrompts::default(),
            notification: None,
            notification_ttl: Duration::from_secs(
                crate::core::config::DEFAULT_NOTIFICATION_TTL_SECS,
            ),
            active_session: None,
            pending_chunks: Vec::new(),
            status_message: String::from("Welcome to Lantern"),
            ticket: 0,
            server_label,
            default_session_type: SessionType::default(),
            default_model: String::new(),
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        let server_label = if config.backend == Backend::Demo {
            "demo".to_string()
        } else {
            config.server_url.clone()
        };
        let mut console = Self::new(server_label);
        console.default_session_type = config.session_type;
        console.default_model = config.model_name.clone();
        console.draft = console.fresh_draft();
        console.examples = config.examples.clone();
        console.models = config.models.clone();
        console.notification_ttl = config.notification_ttl;
        console
    }

    pub fn fresh_draft(&self) -> PromptDraft {
        PromptDraft::new(self.default_session_type, self.default_model.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.draft.loading
    }

    /// Apps ordered by last update, newest first. Ties keep server order.
    pub fn recent_apps(&self) -> Vec<&App> {
        let mut apps: Vec<&App> = self.apps.iter().collect();
        apps.sort_by(|a, b| b.updated.cmp(&a.updated));
        apps
    }

    /// Models usable for the draft's current session type.
    pub fn models_for_type(&self) -> Vec<&ModelEntry> {
        self.models
            .iter()
            .filter(|m| m.supports(self.draft.session_type))
            .collect()
    }

    pub fn current_examples(&self) -> &[String] {
        self.examples.for_type(self.draft.session_type)
    }

    pub fn notify_error(&mut self, message: impl Into<String>, now: Instant) {
        self.notification = Some(Notification {
            level: NotificationLevel::Error,
            message: message.into(),
            raised_at: now,
        });
    }

    pub fn notify_info(&mut self, message: impl Into<String>, now: Instant) {
        self.notification = Some(Notification {
            level: NotificationLevel::Info,
            message: message.into(),
            raised_at: now,
        });
    }

    /// Drops the notification once its TTL has elapsed. Returns true if one
    /// was dropped.
    pub fn expire_notification(&mut self, now: Instant) -> bool {
        let expired = self
            .notification
            .as_ref()
            .is_some_and(|n| now.saturating_duration_since(n.raised_at) >= self.notification_ttl);
        if expired {
            self.notification = None;
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AppConfig, AppDisplayConfig};
    use chrono::{TimeZone, Utc};

    fn app(id: &str, day: u32) -> App {
        App {
            id: id.to_string(),
            updated: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            config: AppConfig {
                helix: AppDisplayConfig {
                    name: id.to_string(),
                    ..Default::default()
                },
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_console_new_defaults() {
        let console = Console::new("http://localhost:8080".to_string());
        assert_eq!(console.status_message, "Welcome to Lantern");
        assert!(!console.is_loading());
        assert!(console.router.is_home());
        assert_eq!(console.focus, Focus::Prompt);
        assert!(console.account.is_none());
    }

    #[test]
    fn test_recent_apps_sorted_newest_first() {
        let mut console = Console::new(String::new());
        console.apps = vec![app("t1", 3), app("t2", 1), app("t3", 5)];
        let ids: Vec<&str> = console.recent_apps().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["t3", "t1", "t2"]);
    }

    #[test]
    fn test_recent_apps_ties_keep_input_order() {
        let mut console = Console::new(String::new());
        console.apps = vec![app("a", 2), app("b", 2), app("c", 4), app("d", 2)];
        let ids: Vec<&str> = console.recent_apps().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn test_models_for_type_filters() {
        let mut console = Console::new(String::new());
        console.models = vec![
            ModelEntry {
                name: "chat".to_string(),
                session_type: Some(SessionType::Text),
                description: None,
            },
            ModelEntry {
                name: "draw".to_string(),
                session_type: Some(SessionType::Image),
                description: None,
            },
            ModelEntry {
                name: "any".to_string(),
                session_type: None,
                description: None,
            },
        ];
        let names: Vec<&str> = console
            .models_for_type()
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["chat", "any"]);

        console.draft.session_type = SessionType::Image;
        let names: Vec<&str> = console
            .models_for_type()
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["draw", "any"]);
    }

    #[test]
    fn test_notification_expires_after_ttl() {
        let mut console = Console::new(String::new());
        console.notification_ttl = Duration::from_secs(4);
        let start = Instant::now();
        console.notify_error("boom", start);

        assert!(!console.expire_notification(start + Duration::from_secs(3)));
        assert!(console.notification.is_some());
        assert!(console.expire_notification(start + Duration::from_secs(4)));
        assert!(console.notification.is_none());
    }

    #[test]
    fn test_focus_cycles() {
        assert_eq!(Focus::Prompt.next(), Focus::Examples);
        assert_eq!(Focus::Apps.next(), Focus::Prompt);
        assert_eq!(Focus::Prompt.prev(), Focus::Apps);
        assert_eq!(Focus::Examples.prev(), Focus::Prompt);
    }
}
