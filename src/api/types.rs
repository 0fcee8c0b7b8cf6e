use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of inference a session runs.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    #[default]
    Text,
    Image,
}

impl SessionType {
    /// Cycles to the next session type (wraps around)
    pub fn next(self) -> SessionType {
        match self {
            SessionType::Text => SessionType::Image,
            SessionType::Image => SessionType::Text,
        }
    }

    /// Wire value, also used as the `type` route param.
    pub fn as_str(self) -> &'static str {
        match self {
            SessionType::Text => "text",
            SessionType::Image => "image",
        }
    }

    /// Returns a human-readable label for display
    pub fn label(self) -> &'static str {
        match self {
            SessionType::Text => "Text",
            SessionType::Image => "Image",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a new session runs inference or fine-tunes on uploaded documents.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Inference,
    Finetune,
}

impl SessionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionMode::Inference => "inference",
            SessionMode::Finetune => "finetune",
        }
    }
}

/// A freshly started session, as reported by the start call.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    pub session_type: SessionType,
    pub model_name: String,
}

/// One entry of the session list.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SessionSummary {
    pub session_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub session_type: SessionType,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub updated: DateTime<Utc>,
}

/// Display settings of an app.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AppDisplayConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Image reference; the server sends an empty string when unset.
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub helix: AppDisplayConfig,
}

/// A user-owned configured app.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct App {
    pub id: String,
    #[serde(default)]
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub updated: DateTime<Utc>,
    #[serde(default)]
    pub config: AppConfig,
}

impl App {
    pub fn name(&self) -> &str {
        &self.config.helix.name
    }

    pub fn avatar(&self) -> Option<&str> {
        self.config
            .helix
            .avatar
            .as_deref()
            .filter(|a| !a.trim().is_empty())
    }

    /// First letter of the name, uppercased. `?` for unnamed apps.
    pub fn initial(&self) -> String {
        self.name()
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "?".to_string())
    }
}

/// The signed-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub admin: bool,
}

/// Parameters for starting a new inference session.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInference {
    pub session_type: SessionType,
    pub message: String,
    pub model_name: String,
}

/// A piece of streamed response text for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionChunk {
    pub session_id: String,
    pub text: String,
    /// True on the final chunk of the stream.
    pub done: bool,
}

/// A model the user can pick.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ModelEntry {
    pub name: String,
    /// None = usable for every session type.
    #[serde(default)]
    pub session_type: Option<SessionType>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ModelEntry {
    pub fn supports(&self, session_type: SessionType) -> bool {
        self.session_type.is_none_or(|t| t == session_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_named(name: &str, avatar: Option<&str>) -> App {
        App {
            id: "app_1".to_string(),
            config: AppConfig {
                helix: AppDisplayConfig {
                    name: name.to_string(),
                    description: String::new(),
                    avatar: avatar.map(str::to_string),
                },
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_session_type_cycle() {
        assert_eq!(SessionType::Text.next(), SessionType::Image);
        assert_eq!(SessionType::Image.next(), SessionType::Text);
    }

    #[test]
    fn test_app_initial_uppercases_first_letter() {
        assert_eq!(app_named("weather bot", None).initial(), "W");
        assert_eq!(app_named("ßeta", None).initial(), "SS");
        assert_eq!(app_named("", None).initial(), "?");
    }

    #[test]
    fn test_app_blank_avatar_is_none() {
        assert_eq!(app_named("a", Some("")).avatar(), None);
        assert_eq!(app_named("a", Some("  ")).avatar(), None);
        assert_eq!(app_named("a", Some("/img/a.png")).avatar(), Some("/img/a.png"));
    }

    #[test]
    fn test_app_deserializes_sparse_json() {
        let json = r#"{"id":"app_9","updated":"2024-01-03T00:00:00Z","config":{"helix":{"name":"Docs"}}}"#;
        let app: App = serde_json::from_str(json).unwrap();
        assert_eq!(app.id, "app_9");
        assert_eq!(app.name(), "Docs");
        assert_eq!(app.avatar(), None);
        assert_eq!(app.updated.to_rfc3339(), "2024-01-03T00:00:00+00:00");
    }

    #[test]
    fn test_session_summary_reads_type_field() {
        let json = r#"{"session_id":"ses_1","name":"hello","type":"image","model_name":"sdxl"}"#;
        let summary: SessionSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.session_type, SessionType::Image);
        assert_eq!(summary.model_name, "sdxl");
    }

    #[test]
    fn test_model_entry_supports() {
        let any = ModelEntry {
            name: "m".to_string(),
            session_type: None,
            description: None,
        };
        let image_only = ModelEntry {
            session_type: Some(SessionType::Image),
            ..any.clone()
        };
        assert!(any.supports(SessionType::Text));
        assert!(any.supports(SessionType::Image));
        assert!(!image_only.supports(SessionType::Text));
    }
}
