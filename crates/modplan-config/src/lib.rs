//! modplan Configuration System
//!
//! Provides configuration management for modplan projects:
//! - Project configuration (modplan.toml)
//! - Discovery by walking up from a start directory
//! - Environment overrides
//!
//! # Configuration Hierarchy
//!
//! Configuration is applied in the following order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Project config (nearest modplan.toml)
//! 3. Environment variables (MODPLAN_*)
//! 4. CLI flags
//!
//! # Example
//!
//! ```no_run
//! use modplan_config::ConfigLoader;
//! use std::path::Path;
//!
//! let loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("parallel: {}", config.parallel());
//! ```

pub mod loader;
pub mod project;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use loader::{Config, ConfigLoader, CONFIG_FILE_NAME};
pub use project::{DescriptorsConfig, OutputConfig, OutputFormat, ProjectConfig, ResolverConfig};
