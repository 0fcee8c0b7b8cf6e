pub mod backends;
pub mod service;
pub mod sse;
pub mod types;

pub use backends::{DemoBackend, HelixBackend};
pub use service::{ApiError, HelixService};
pub use types::{
    App, AppConfig, AppDisplayConfig, ModelEntry, NewInference, Session, SessionChunk, SessionMode,
    SessionSummary, SessionType, User,
};
