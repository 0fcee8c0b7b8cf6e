//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::mpsc::Sender;

use crate::api::{
    ApiError, App, AppConfig, AppDisplayConfig, HelixService, ModelEntry, NewInference, Session,
    SessionChunk, SessionSummary, User,
};
use crate::core::action::{Action, update};
use crate::core::effect::{flatten, perform};
use crate::core::state::Console;

/// How many times each collaborator call was made.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Calls {
    pub current_user: usize,
    pub start_inference: usize,
    pub list_sessions: usize,
    pub list_apps: usize,
    pub create_empty_app: usize,
    pub list_models: usize,
}

impl Calls {
    pub fn total(&self) -> usize {
        self.current_user
            + self.start_inference
            + self.list_sessions
            + self.list_apps
            + self.create_empty_app
            + self.list_models
    }
}

enum StartOutcome {
    Session(String),
    Empty,
    Fail,
}

/// A service that records every call and answers from canned data.
pub struct RecordingService {
    calls: Mutex<Calls>,
    requests: Mutex<Vec<NewInference>>,
    api_key: Mutex<Option<String>>,
    user: Mutex<Option<User>>,
    start: Mutex<StartOutcome>,
    created_app: Mutex<Option<App>>,
    apps: Mutex<Vec<App>>,
}

impl RecordingService {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Calls::default()),
            requests: Mutex::new(Vec::new()),
            api_key: Mutex::new(None),
            user: Mutex::new(Some(test_user("tester"))),
            start: Mutex::new(StartOutcome::Session("ses_test".to_string())),
            created_app: Mutex::new(Some(sample_app("app_new", 9))),
            apps: Mutex::new(vec![sample_app("app_1", 1)]),
        }
    }

    pub fn signed_out(self) -> Self {
        *self.user.lock().unwrap() = None;
        self
    }

    pub fn fail_start_inference(&self) {
        *self.start.lock().unwrap() = StartOutcome::Fail;
    }

    pub fn empty_start_inference(&self) {
        *self.start.lock().unwrap() = StartOutcome::Empty;
    }

    pub fn create_nothing(&self) {
        *self.created_app.lock().unwrap() = None;
    }

    pub fn calls(&self) -> Calls {
        *self.calls.lock().unwrap()
    }

    pub fn requests(&self) -> Vec<NewInference> {
        self.requests.lock().unwrap().clone()
    }

    pub fn api_key(&self) -> Option<String> {
        self.api_key.lock().unwrap().clone()
    }

    fn record(&self, f: impl FnOnce(&mut Calls)) {
        f(&mut self.calls.lock().unwrap());
    }
}

#[async_trait]
impl HelixService for RecordingService {
    fn name(&self) -> &str {
        "recording"
    }

    fn set_api_key(&self, api_key: String) {
        *self.api_key.lock().unwrap() = Some(api_key);
    }

    async fn current_user(&self) -> Result<Option<User>, ApiError> {
        self.record(|c| c.current_user += 1);
        Ok(self.user.lock().unwrap().clone())
    }

    async fn start_inference(
        &self,
        request: NewInference,
        _sender: Sender<SessionChunk>,
    ) -> Result<Option<Session>, ApiError> {
        self.record(|c| c.start_inference += 1);
        let session_type = request.session_type;
        let model_name = request.model_name.clone();
        self.requests.lock().unwrap().push(request);
        match &*self.start.lock().unwrap() {
            StartOutcome::Session(id) => Ok(Some(Session {
                id: id.clone(),
                session_type,
                model_name,
            })),
            StartOutcome::Empty => Ok(None),
            StartOutcome::Fail => Err(ApiError::Api {
                status: 500,
                message: "inference unavailable".to_string(),
            }),
        }
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError> {
        self.record(|c| c.list_sessions += 1);
        Ok(Vec::new())
    }

    async fn list_apps(&self) -> Result<Vec<App>, ApiError> {
        self.record(|c| c.list_apps += 1);
        Ok(self.apps.lock().unwrap().clone())
    }

    async fn create_empty_app(&self) -> Result<Option<App>, ApiError> {
        self.record(|c| c.create_empty_app += 1);
        Ok(self.created_app.lock().unwrap().clone())
    }

    async fn list_models(&self) -> Result<Vec<ModelEntry>, ApiError> {
        self.record(|c| c.list_models += 1);
        Ok(Vec::new())
    }
}

/// Applies `action` and every follow-up action its effects produce, until
/// nothing is left to do. Returns the number of effects performed.
pub async fn drive(console: &mut Console, service: &RecordingService, action: Action) -> usize {
    let (chunk_tx, mut chunk_rx) = tokio::sync::mpsc::channel(64);
    let mut queue = VecDeque::from([action]);
    let mut performed = 0;

    while let Some(action) = queue.pop_front() {
        for effect in flatten(update(console, action)) {
            performed += 1;
            if let Some(next) = perform(effect, service, chunk_tx.clone()).await {
                queue.push_back(next);
            }
        }
        while let Ok(chunk) = chunk_rx.try_recv() {
            queue.push_back(Action::SessionChunk(chunk));
        }
    }
    performed
}

pub fn test_console() -> Console {
    Console::new("http://test".to_string())
}

pub fn test_user(id: &str) -> User {
    User {
        id: id.to_string(),
        admin: false,
    }
}

/// An app named after its id, updated on 2024-01-`day`.
pub fn sample_app(id: &str, day: u32) -> App {
    App {
        id: id.to_string(),
        created: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        updated: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
        config: AppConfig {
            helix: AppDisplayConfig {
                name: id.to_string(),
                description: String::new(),
                avatar: None,
            },
        },
    }
}
