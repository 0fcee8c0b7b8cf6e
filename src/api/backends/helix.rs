//! HTTP backend talking to a Helix-compatible API server.
//!
//! Sessions are started through the streaming chat endpoint. The server
//! answers with an event stream of OpenAI-style completion chunks whose `id`
//! is the new session's id:
//!
//! ```text
//! data: {"id":"ses_01","object":"chat.completion.chunk","choices":[{"delta":{"role":"assistant","content":""}}]}
//! data: {"id":"ses_01","choices":[{"delta":{"content":"Hello"}}]}
//! data: {"id":"ses_01","choices":[{"delta":{"content":""},"finish_reason":"stop"}]}
//! ```

use std::collections::VecDeque;
use std::sync::RwLock;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Sender;

use crate::api::sse::SseBuffer;
use crate::api::{
    ApiError, App, HelixService, ModelEntry, NewInference, Session, SessionChunk, SessionSummary,
    SessionType, User,
};

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    #[serde(rename = "type")]
    session_type: SessionType,
    #[serde(skip_serializing_if = "str::is_empty")]
    model: &'a str,
    stream: bool,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Serialize, Debug)]
struct MessageContent<'a> {
    content_type: &'static str,
    parts: Vec<&'a str>,
}

#[derive(Deserialize, Debug)]
struct CompletionChunk {
    id: String,
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    #[serde(default)]
    delta: Option<Delta>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

impl CompletionChunk {
    fn text(&self) -> &str {
        self.choices
            .first()
            .and_then(|c| c.delta.as_ref())
            .and_then(|d| d.content.as_deref())
            .unwrap_or("")
    }

    fn is_finished(&self) -> bool {
        self.choices
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            .is_some_and(|r| !r.is_empty())
    }
}

#[derive(Deserialize, Debug)]
struct StatusResponse {
    #[serde(default)]
    user: String,
    #[serde(default)]
    admin: bool,
}

#[derive(Deserialize, Debug)]
struct SessionsResponse {
    #[serde(default)]
    sessions: Vec<SessionSummary>,
}

#[derive(Deserialize, Debug)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelData>,
}

#[derive(Deserialize, Debug)]
struct ModelData {
    id: String,
    #[serde(rename = "type", default)]
    model_type: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Decodes one `data:` payload. `Ok(None)` marks the `[DONE]` sentinel.
fn decode_chunk(payload: &str) -> Result<Option<CompletionChunk>, ApiError> {
    if payload == "[DONE]" {
        return Ok(None);
    }
    serde_json::from_str(payload)
        .map(Some)
        .map_err(|e| ApiError::Parse(format!("bad completion chunk: {e}")))
}

fn model_session_type(model_type: Option<&str>) -> Option<SessionType> {
    match model_type {
        Some("image") => Some(SessionType::Image),
        Some("chat") | Some("text") => Some(SessionType::Text),
        _ => None,
    }
}

// ============================================================================
// Backend Implementation
// ============================================================================

pub struct HelixBackend {
    base_url: String,
    api_key: RwLock<Option<String>>,
    client: reqwest::Client,
}

impl HelixBackend {
    /// Creates a backend for the server at `base_url` (e.g. `http://localhost:8080`).
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: RwLock::new(api_key.filter(|k| !k.trim().is_empty())),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_key(&self) -> Option<String> {
        self.api_key.read().ok().and_then(|key| key.clone())
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.client.get(format!("{}{}", self.base_url, path)))
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.client.post(format!("{}{}", self.base_url, path)))
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.api_key() {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    /// Sends the request and turns non-2xx answers into `ApiError::Api`.
    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        debug!("{} -> {}", response.url().path(), response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Helix API error: {} - {}", status, err_body);
            return Err(ApiError::Api {
                status,
                message: err_body,
            });
        }

        Ok(response)
    }

    async fn json<T: serde::de::DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(builder).await?;
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[async_trait]
impl HelixService for HelixBackend {
    fn name(&self) -> &str {
        "helix"
    }

    fn set_api_key(&self, api_key: String) {
        if let Ok(mut key) = self.api_key.write() {
            *key = Some(api_key);
        }
    }

    async fn current_user(&self) -> Result<Option<User>, ApiError> {
        if self.api_key().is_none() {
            debug!("No API key configured, skipping status lookup");
            return Ok(None);
        }

        match self.json::<StatusResponse>(self.get("/api/v1/status")).await {
            Ok(status) if status.user.is_empty() => Ok(None),
            Ok(status) => Ok(Some(User {
                id: status.user,
                admin: status.admin,
            })),
            Err(ApiError::Api { status: 401 | 403, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn start_inference(
        &self,
        request: NewInference,
        sender: Sender<SessionChunk>,
    ) -> Result<Option<Session>, ApiError> {
        let body = ChatRequest {
            session_type: request.session_type,
            model: &request.model_name,
            stream: true,
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent {
                    content_type: "text",
                    parts: vec![request.message.as_str()],
                },
            }],
        };

        info!(
            "Starting {} session: model={:?}, prompt_len={}",
            request.session_type,
            request.model_name,
            request.message.len()
        );

        let response = self
            .send(self.post("/api/v1/sessions/chat").json(&body))
            .await?;

        let mut stream = Box::pin(response.bytes_stream());
        let mut sse = SseBuffer::new();
        let mut backlog: VecDeque<String> = VecDeque::new();

        // Read until the first chunk names the session
        let first = loop {
            if let Some(payload) = backlog.pop_front() {
                match decode_chunk(&payload)? {
                    Some(chunk) => break chunk,
                    None => {
                        warn!("Stream finished before a session id was sent");
                        return Ok(None);
                    }
                }
            }
            match stream.next().await {
                Some(bytes) => {
                    let bytes = bytes.map_err(|e| ApiError::Network(e.to_string()))?;
                    backlog.extend(sse.push(&bytes));
                }
                None => match sse.finish() {
                    Some(payload) => backlog.push_back(payload),
                    None => {
                        warn!("Stream closed before a session id was sent");
                        return Ok(None);
                    }
                },
            }
        };

        let session = Session {
            id: first.id.clone(),
            session_type: request.session_type,
            model_name: request.model_name.clone(),
        };
        info!("Session started: {}", session.id);

        let finished = first.is_finished();
        if (!first.text().is_empty() || finished)
            && sender
                .send(SessionChunk {
                    session_id: session.id.clone(),
                    text: first.text().to_string(),
                    done: finished,
                })
                .await
                .is_err()
        {
            warn!("First chunk send failed: receiver dropped");
            return Ok(Some(session));
        }

        if !finished {
            tokio::spawn(forward_stream(
                session.id.clone(),
                stream,
                sse,
                backlog,
                sender,
            ));
        }

        Ok(Some(session))
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError> {
        let response: SessionsResponse = self.json(self.get("/api/v1/sessions")).await?;
        debug!("Loaded {} sessions", response.sessions.len());
        Ok(response.sessions)
    }

    async fn list_apps(&self) -> Result<Vec<App>, ApiError> {
        let apps: Option<Vec<App>> = self.json(self.get("/api/v1/apps")).await?;
        let apps = apps.unwrap_or_default();
        debug!("Loaded {} apps", apps.len());
        Ok(apps)
    }

    async fn create_empty_app(&self) -> Result<Option<App>, ApiError> {
        let body = serde_json::json!({
            "app_source": "helix",
            "config": {
                "helix": {
                    "name": "",
                    "description": "",
                    "assistants": []
                }
            }
        });
        let app: Option<App> = self.json(self.post("/api/v1/apps").json(&body)).await?;
        match &app {
            Some(app) => info!("Created app {}", app.id),
            None => warn!("Server returned no app"),
        }
        Ok(app)
    }

    async fn list_models(&self) -> Result<Vec<ModelEntry>, ApiError> {
        let response: ModelsResponse = self.json(self.get("/v1/models")).await?;
        Ok(response
            .data
            .into_iter()
            .map(|m| ModelEntry {
                session_type: model_session_type(m.model_type.as_deref()),
                name: m.id,
                description: m.description,
            })
            .collect())
    }
}

/// Drains the rest of a session stream into `sender`.
///
/// Always ends with a `done` chunk so the receiver can stop waiting, even
/// when the server closes the connection early.
async fn forward_stream<S, B>(
    session_id: String,
    mut stream: S,
    mut sse: SseBuffer,
    mut backlog: VecDeque<String>,
    sender: Sender<SessionChunk>,
) where
    S: Stream<Item = reqwest::Result<B>> + Unpin,
    B: AsRef<[u8]>,
{
    let mut forwarded = 0usize;
    loop {
        while let Some(payload) = backlog.pop_front() {
            let chunk = match decode_chunk(&payload) {
                Ok(Some(chunk)) => chunk,
                Ok(None) => {
                    finish(&session_id, &sender, forwarded).await;
                    return;
                }
                Err(e) => {
                    warn!("Skipping chunk for {}: {}", session_id, e);
                    continue;
                }
            };
            let done = chunk.is_finished();
            if !chunk.text().is_empty() || done {
                forwarded += 1;
                let message = SessionChunk {
                    session_id: session_id.clone(),
                    text: chunk.text().to_string(),
                    done,
                };
                if sender.send(message).await.is_err() {
                    warn!("Chunk send failed for {}: receiver dropped", session_id);
                    return;
                }
            }
            if done {
                info!("Session {} stream complete: {} chunks", session_id, forwarded);
                return;
            }
        }

        match stream.next().await {
            Some(Ok(bytes)) => backlog.extend(sse.push(bytes.as_ref())),
            Some(Err(e)) => {
                warn!("Stream error for {}: {}", session_id, e);
                finish(&session_id, &sender, forwarded).await;
                return;
            }
            None => match sse.finish() {
                Some(payload) => backlog.push_back(payload),
                None => {
                    finish(&session_id, &sender, forwarded).await;
                    return;
                }
            },
        }
    }
}

async fn finish(session_id: &str, sender: &Sender<SessionChunk>, forwarded: usize) {
    info!("Session {} stream closed: {} chunks", session_id, forwarded);
    let _ = sender
        .send(SessionChunk {
            session_id: session_id.to_string(),
            text: String::new(),
            done: true,
        })
        .await;
}
