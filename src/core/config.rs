//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.lantern/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::Backend;
use crate::api::{ModelEntry, SessionType};
use clap::ValueEnum;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LanternConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub examples: ExamplesConfig,
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub backend: Option<Backend>,
    pub default_session_type: Option<SessionType>,
    pub default_model: Option<String>,
    pub notification_ttl_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ExamplesConfig {
    pub text: Option<Vec<String>>,
    pub image: Option<Vec<String>>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
pub const DEFAULT_NOTIFICATION_TTL_SECS: u64 = 4;

const DEFAULT_TEXT_EXAMPLES: &[&str] = &[
    "Summarize the key points of the attached meeting notes",
    "Write a friendly reminder email about an overdue invoice",
    "Explain how a hash map works to a new programmer",
    "Draft three taglines for a neighbourhood bakery",
];

const DEFAULT_IMAGE_EXAMPLES: &[&str] = &[
    "A watercolor lighthouse at dusk, soft fog rolling in",
    "An isometric pixel-art workshop full of tiny robots",
    "A cozy reading nook with rain on the window, film photo",
];

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

/// Example prompts offered under the prompt box, per session type.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamplePrompts {
    pub text: Vec<String>,
    pub image: Vec<String>,
}

impl ExamplePrompts {
    pub fn for_type(&self, session_type: SessionType) -> &[String] {
        match session_type {
            SessionType::Text => &self.text,
            SessionType::Image => &self.image,
        }
    }
}

impl Default for ExamplePrompts {
    fn default() -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            text: owned(DEFAULT_TEXT_EXAMPLES),
            image: owned(DEFAULT_IMAGE_EXAMPLES),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub backend: Backend,
    pub server_url: String,
    pub api_key: Option<String>,
    pub session_type: SessionType,
    pub model_name: String,
    pub notification_ttl: Duration,
    pub examples: ExamplePrompts,
    pub models: Vec<ModelEntry>,
}

/// Values given on the command line. `None` = flag not passed.
#[derive(Debug, Default)]
pub struct CliOverrides<'a> {
    pub backend: Option<Backend>,
    pub url: Option<&'a str>,
    pub model: Option<&'a str>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.lantern/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".lantern").join("config.toml"))
}

/// Load config from `~/.lantern/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `LanternConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<LanternConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(LanternConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(LanternConfig::default());
    }

    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<LanternConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: LanternConfig = toml::from_str(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Lantern Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# backend = "helix"                  # "helix" or "demo"
# default_session_type = "text"      # "text" or "image"
# default_model = "llama3:instruct"
# notification_ttl_secs = 4

# [server]
# url = "http://localhost:8080"      # Or set HELIX_URL env var
# api_key = "hl-..."                 # Or set HELIX_API_KEY env var

# [examples]
# text = ["Summarize this article", "Write a haiku about Rust"]
# image = ["A red fox in the snow"]

# [[models]]
# name = "llama3:instruct"
# session_type = "text"
# description = "Fast general chat"

# [[models]]
# name = "stabilityai/stable-diffusion-xl-base-1.0"
# session_type = "image"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Parses a backend name, ignoring case. Unknown names are logged and skipped.
fn parse_backend(name: &str) -> Option<Backend> {
    match Backend::from_str(name.trim(), true) {
        Ok(backend) => Some(backend),
        Err(_) => {
            warn!("Unknown backend '{}' in LANTERN_BACKEND", name);
            None
        }
    }
}

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &LanternConfig, cli: &CliOverrides<'_>) -> ResolvedConfig {
    // Backend: CLI → env → config → default
    let backend = cli
        .backend
        .or_else(|| std::env::var("LANTERN_BACKEND").ok().and_then(|s| parse_backend(&s)))
        .or(config.general.backend)
        .unwrap_or_default();

    // Server URL: CLI → env → config → default
    let server_url = cli
        .url
        .map(|s| s.to_string())
        .or_else(|| std::env::var("HELIX_URL").ok())
        .or_else(|| config.server.url.clone())
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

    // API key: env → config
    let api_key = std::env::var("HELIX_API_KEY")
        .ok()
        .or_else(|| config.server.api_key.clone())
        .filter(|k| !k.trim().is_empty());

    // Model: CLI → env → config → empty (server default)
    let model_name = cli
        .model
        .map(|s| s.to_string())
        .or_else(|| std::env::var("LANTERN_MODEL").ok())
        .or_else(|| config.general.default_model.clone())
        .unwrap_or_default();

    let defaults = ExamplePrompts::default();
    let examples = ExamplePrompts {
        text: config.examples.text.clone().unwrap_or(defaults.text),
        image: config.examples.image.clone().unwrap_or(defaults.image),
    };

    ResolvedConfig {
        backend,
        server_url,
        api_key,
        session_type: config.general.default_session_type.unwrap_or_default(),
        model_name,
        notification_ttl: Duration::from_secs(
            config
                .general
                .notification_ttl_secs
                .unwrap_or(DEFAULT_NOTIFICATION_TTL_SECS),
        ),
        examples,
        models: config.models.clone(),
    }
}
