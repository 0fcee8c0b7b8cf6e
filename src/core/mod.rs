//! # Core Application Logic
//!
//! This module contains Lantern's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (console data) │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │  • Effect (I/O intents) │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┴───────────────────┐
//!            ▼                                       ▼
//!     ┌────────────┐                          ┌────────────┐
//!     │    TUI     │                          │    API     │
//!     │  Adapter   │ ── effect::perform ───►  │  backends  │
//!     │ (ratatui)  │                          │            │
//!     └────────────┘                          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `Console` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update` reducer
//! - [`effect`]: Runs an `Effect` against a `HelixService`
//! - [`router`]: Route stack with `(key, params)` destinations
//! - [`config`]: Layered configuration
//! - [`time_ago`]: Relative age formatting

pub mod action;
pub mod config;
pub mod effect;
pub mod router;
pub mod state;
pub mod time_ago;
