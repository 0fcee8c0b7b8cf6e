use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc::Sender;

use super::types::{App, ModelEntry, NewInference, Session, SessionChunk, SessionSummary, User};

/// Errors that can occur while talking to the server.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Backend misconfigured (bad URL, unusable key). Not retryable.
    #[error("config error: {0}")]
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused).
    #[error("network error: {0}")]
    Network(String),
    /// Server returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },
    /// Failed to parse the server's response.
    #[error("parse error: {0}")]
    Parse(String),
    /// The chunk receiver was dropped before the stream finished.
    #[error("channel closed")]
    ChannelClosed,
}

/// Everything the client asks of the server.
///
/// Each method maps to one collaborator call of the home screen. Backends
/// must be cheap to share across tasks.
#[async_trait]
pub trait HelixService: Send + Sync {
    /// Returns the name of the backend.
    fn name(&self) -> &str;

    /// Replaces the bearer token used for subsequent calls.
    fn set_api_key(&self, api_key: String);

    /// The signed-in account, or `None` when the credentials identify nobody.
    async fn current_user(&self) -> Result<Option<User>, ApiError>;

    /// Starts a new inference session.
    ///
    /// Returns once the server has assigned a session id. The remainder of
    /// the response keeps streaming into `sender` in the background.
    async fn start_inference(
        &self,
        request: NewInference,
        sender: Sender<SessionChunk>,
    ) -> Result<Option<Session>, ApiError>;

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError>;

    async fn list_apps(&self) -> Result<Vec<App>, ApiError>;

    /// Creates an app with an empty configuration. `None` if the server
    /// returned nothing.
    async fn create_empty_app(&self) -> Result<Option<App>, ApiError>;

    async fn list_models(&self) -> Result<Vec<ModelEntry>, ApiError>;
}
