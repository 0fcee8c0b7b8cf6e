//! Lantern library exports for testing

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod api;
pub mod core;
pub mod tui;

#[cfg(test)]
pub mod test_support;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Helix,
    Demo,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Helix => "helix",
            Backend::Demo => "demo",
        }
    }
}
