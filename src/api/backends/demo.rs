//! In-memory backend for running the client without a server.
//!
//! Starts signed in as `demo`, keeps apps in memory and answers every prompt
//! with a short canned reply streamed word by word.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use log::{info, warn};
use tokio::sync::mpsc::Sender;

use crate::api::{
    ApiError, App, AppConfig, AppDisplayConfig, HelixService, ModelEntry, NewInference, Session,
    SessionChunk, SessionSummary, SessionType, User,
};

const WORD_DELAY: Duration = Duration::from_millis(60);

pub struct DemoBackend {
    apps: Mutex<Vec<App>>,
    sessions: Mutex<Vec<SessionSummary>>,
    signed_in: Mutex<bool>,
}

impl Default for DemoBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoBackend {
    pub fn new() -> Self {
        let now = Utc::now();
        let seed = |id: &str, name: &str, age: ChronoDuration| App {
            id: id.to_string(),
            created: now - age,
            updated: now - age,
            config: AppConfig {
                helix: AppDisplayConfig {
                    name: name.to_string(),
                    description: format!("Demo app: {name}"),
                    avatar: None,
                },
            },
        };

        Self {
            apps: Mutex::new(vec![
                seed("app_demo_docs", "Docs helper", ChronoDuration::days(3)),
                seed("app_demo_weather", "Weather bot", ChronoDuration::minutes(42)),
                seed("app_demo_sql", "SQL explainer", ChronoDuration::hours(5)),
            ]),
            sessions: Mutex::new(Vec::new()),
            signed_in: Mutex::new(true),
        }
    }

    fn lock_err<T>(_: T) -> ApiError {
        ApiError::Config("demo backend state poisoned".to_string())
    }
}

fn demo_reply(request: &NewInference) -> String {
    match request.session_type {
        SessionType::Text => format!(
            "This is the demo backend. You asked: \"{}\". Point Lantern at a real server with --url to get actual answers.",
            request.message.trim()
        ),
        SessionType::Image => "The demo backend cannot draw, but your image prompt was received.".to_string(),
    }
}

#[async_trait]
impl HelixService for DemoBackend {
    fn name(&self) -> &str {
        "demo"
    }

    fn set_api_key(&self, _api_key: String) {
        if let Ok(mut signed_in) = self.signed_in.lock() {
            *signed_in = true;
        }
    }

    async fn current_user(&self) -> Result<Option<User>, ApiError> {
        let signed_in = *self.signed_in.lock().map_err(Self::lock_err)?;
        Ok(signed_in.then(|| User {
            id: "demo".to_string(),
            admin: false,
        }))
    }

    async fn start_inference(
        &self,
        request: NewInference,
        sender: Sender<SessionChunk>,
    ) -> Result<Option<Session>, ApiError> {
        let session = Session {
            id: format!("ses_{}", uuid::Uuid::new_v4().simple()),
            session_type: request.session_type,
            model_name: request.model_name.clone(),
        };
        let now = Utc::now();
        self.sessions
            .lock()
            .map_err(Self::lock_err)?
            .push(SessionSummary {
                session_id: session.id.clone(),
                name: request.message.lines().next().unwrap_or("").to_string(),
                session_type: request.session_type,
                model_name: request.model_name.clone(),
                created: now,
                updated: now,
            });
        info!("Demo session started: {}", session.id);

        let reply = demo_reply(&request);
        let session_id = session.id.clone();
        tokio::spawn(async move {
            for word in reply.split_inclusive(' ') {
                tokio::time::sleep(WORD_DELAY).await;
                let chunk = SessionChunk {
                    session_id: session_id.clone(),
                    text: word.to_string(),
                    done: false,
                };
                if sender.send(chunk).await.is_err() {
                    warn!("Demo chunk send failed: receiver dropped");
                    return;
                }
            }
            let _ = sender
                .send(SessionChunk {
                    session_id,
                    text: String::new(),
                    done: true,
                })
                .await;
        });

        Ok(Some(session))
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError> {
        Ok(self.sessions.lock().map_err(Self::lock_err)?.clone())
    }

    async fn list_apps(&self) -> Result<Vec<App>, ApiError> {
        Ok(self.apps.lock().map_err(Self::lock_err)?.clone())
    }

    async fn create_empty_app(&self) -> Result<Option<App>, ApiError> {
        let now = Utc::now();
        let app = App {
            id: format!("app_{}", uuid::Uuid::new_v4().simple()),
            created: now,
            updated: now,
            config: AppConfig::default(),
        };
        self.apps.lock().map_err(Self::lock_err)?.push(app.clone());
        info!("Demo app created: {}", app.id);
        Ok(Some(app))
    }

    async fn list_models(&self) -> Result<Vec<ModelEntry>, ApiError> {
        Ok(vec![
            ModelEntry {
                name: "demo-chat".to_string(),
                session_type: Some(SessionType::Text),
                description: Some("Canned replies".to_string()),
            },
            ModelEntry {
                name: "demo-draw".to_string(),
                session_type: Some(SessionType::Image),
                description: None,
            },
        ])
    }
}
