//! CLI configuration via environment variables
//!
//! Settings that only affect the terminal, not resolution. Resolution
//! settings live in modplan.toml and the MODPLAN_* overrides.

use std::env;

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Disable colored output (MODPLAN_NO_COLOR=1 or NO_COLOR=1)
    pub no_color: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            no_color: env::var("MODPLAN_NO_COLOR").is_ok() || env::var("NO_COLOR").is_ok(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
