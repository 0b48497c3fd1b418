//! Configuration Loader
//!
//! Finds the nearest `modplan.toml` and layers environment overrides on top.

use crate::project::{OutputConfig, OutputFormat, ProjectConfig, ResolverConfig};
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Name of the project configuration file
pub const CONFIG_FILE_NAME: &str = "modplan.toml";

const DEFAULT_EXTENSIONS: [&str; 2] = ["toml", "json"];
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Configuration loader
///
/// Loads configuration with the following precedence:
/// 1. Project config (nearest modplan.toml) - lowest priority
/// 2. Environment variables (MODPLAN_PARALLEL, MODPLAN_FORMAT, MODPLAN_LOG)
/// 3. CLI flags - highest priority (handled by caller)
#[derive(Debug, Default)]
pub struct ConfigLoader;

/// Effective configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Project configuration with environment overrides applied
    pub project: ProjectConfig,

    /// Project root directory (where modplan.toml was found)
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find modplan.toml. A missing file is
    /// not an error: defaults apply and there is no project root.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_config) = self.find_project_config(start_dir)?;
        let project = self.apply_env_overrides(project_config)?;

        Ok(Config {
            project,
            project_root,
        })
    }

    /// Load configuration from a specific config file
    pub fn load_from_file(&self, config_path: &Path) -> ConfigResult<Config> {
        let project_config = ProjectConfig::load_from_file(config_path)?;
        let project = self.apply_env_overrides(project_config)?;

        Ok(Config {
            project,
            project_root: config_path.parent().map(|p| p.to_path_buf()),
        })
    }

    /// Find project configuration by walking up directory tree
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);

            if config_path.is_file() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ProjectConfig::default())),
            }
        }
    }

    /// Apply MODPLAN_* environment overrides
    fn apply_env_overrides(&self, mut config: ProjectConfig) -> ConfigResult<ProjectConfig> {
        if let Ok(parallel) = env::var("MODPLAN_PARALLEL") {
            let parallel = parse_bool("MODPLAN_PARALLEL", &parallel)?;
            config
                .resolver
                .get_or_insert_with(ResolverConfig::default)
                .parallel = Some(parallel);
        }

        if let Ok(format) = env::var("MODPLAN_FORMAT") {
            let format: OutputFormat = format.parse()?;
            config.output.get_or_insert_with(OutputConfig::default).format = Some(format);
        }

        if let Ok(level) = env::var("MODPLAN_LOG") {
            if !level.trim().is_empty() {
                config
                    .output
                    .get_or_insert_with(OutputConfig::default)
                    .log_level = Some(level);
            }
        }

        Ok(config)
    }
}

fn parse_bool(field: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected a boolean, got '{}'", other),
        }),
    }
}

impl Config {
    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if this is a project (has modplan.toml)
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }

    /// Descriptor paths resolved against the project root
    pub fn descriptor_paths(&self) -> Vec<PathBuf> {
        self.project
            .descriptor_paths()
            .iter()
            .map(|p| match &self.project_root {
                Some(root) if p.is_relative() => root.join(p),
                _ => p.clone(),
            })
            .collect()
    }

    /// Effective descriptor extensions (project > default)
    pub fn extensions(&self) -> Vec<String> {
        match self.project.extensions() {
            Some(extensions) => extensions.to_vec(),
            None => DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Effective parallel flag (default: true)
    pub fn parallel(&self) -> bool {
        self.project.parallel().unwrap_or(true)
    }

    pub fn roots(&self) -> &[String] {
        self.project.roots()
    }

    /// Effective output format (default: text)
    pub fn format(&self) -> OutputFormat {
        self.project.format().unwrap_or_default()
    }

    /// Effective log filter (default: warn)
    pub fn log_level(&self) -> &str {
        self.project.log_level().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}
