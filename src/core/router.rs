//! # Routing
//!
//! A stack of routes. Each route has a destination key and a params map,
//! the same shape a web router takes (`navigate("session", { session_id })`).
//!
//! The router records every navigation so callers can tell where the user
//! went and how many times.

use std::collections::BTreeMap;

use log::info;

use crate::api::{SessionMode, SessionType};

/// Parameters for the new-session view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewSessionParams {
    pub app_id: Option<String>,
    pub model: Option<String>,
    pub session_type: Option<SessionType>,
    pub mode: Option<SessionMode>,
    pub rag: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Home,
    Session { session_id: String },
    App { app_id: String },
    New(NewSessionParams),
}

impl Route {
    /// Destination key, as a web router would name the page.
    pub fn key(&self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::Session { .. } => "session",
            Route::App { .. } => "app",
            Route::New(_) => "new",
        }
    }

    pub fn params(&self) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        match self {
            Route::Home => {}
            Route::Session { session_id } => {
                params.insert("session_id", session_id.clone());
            }
            Route::App { app_id } => {
                params.insert("app_id", app_id.clone());
            }
            Route::New(p) => {
                if let Some(app_id) = &p.app_id {
                    params.insert("app_id", app_id.clone());
                }
                if let Some(model) = &p.model {
                    params.insert("model", model.clone());
                }
                if let Some(session_type) = p.session_type {
                    params.insert("type", session_type.as_str().to_string());
                }
                if let Some(mode) = p.mode {
                    params.insert("mode", mode.as_str().to_string());
                }
                if p.rag {
                    params.insert("rag", "true".to_string());
                }
            }
        }
        params
    }
}

pub struct Router {
    stack: Vec<Route>,
    navigations: usize,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self {
            stack: vec![Route::Home],
            navigations: 0,
        }
    }

    pub fn current(&self) -> &Route {
        // The stack is never emptied below its root
        self.stack.last().unwrap_or(&Route::Home)
    }

    pub fn is_home(&self) -> bool {
        matches!(self.current(), Route::Home)
    }

    /// Pushes `route`. Navigating home clears the stack back to its root.
    pub fn navigate(&mut self, route: Route) {
        info!("navigate: {} {:?}", route.key(), route.params());
        self.navigations += 1;
        if route == Route::Home {
            self.stack.truncate(1);
        } else {
            self.stack.push(route);
        }
    }

    /// Pops back one level. Returns false when already at the root.
    pub fn back(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }
        self.stack.pop();
        info!("back: {}", self.current().key());
        true
    }

    /// Number of `navigate` calls so far.
    pub fn navigations(&self) -> usize {
        self.navigations
    }
}
