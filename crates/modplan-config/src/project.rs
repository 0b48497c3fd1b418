//! Project Configuration (modplan.toml)
//!
//! Handles project-level configuration stored in `modplan.toml` at the project root.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Project configuration from modplan.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Where descriptor files live
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptors: Option<DescriptorsConfig>,

    /// Resolver behaviour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolver: Option<ResolverConfig>,

    /// Output and logging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

/// Descriptor discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct DescriptorsConfig {
    /// Descriptor files or directories, relative to the project root
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<PathBuf>,

    /// Extensions picked up while walking directories (default: toml, json)
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,
}

/// Resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    /// Propagate visibility in parallel waves (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel: Option<bool>,

    /// Root modules for conflict analysis
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roots: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Output format (default: text)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,

    /// Log filter used when RUST_LOG is unset (default: warn)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// Output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(ConfigError::InvalidValue {
                field: "output.format".to_string(),
                reason: format!("unknown format '{}' (expected text or json)", other),
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(descriptors) = &self.descriptors {
            if descriptors.paths.iter().any(|p| p.as_os_str().is_empty()) {
                return Err(invalid("descriptors.paths", "path cannot be empty"));
            }
            if descriptors
                .extensions
                .iter()
                .any(|e| e.trim_start_matches('.').is_empty())
            {
                return Err(invalid("descriptors.extensions", "extension cannot be empty"));
            }
        }

        if let Some(resolver) = &self.resolver {
            for (i, root) in resolver.roots.iter().enumerate() {
                if root.is_empty() {
                    return Err(invalid("resolver.roots", "root name cannot be empty"));
                }
                if resolver.roots[..i].contains(root) {
                    return Err(invalid(
                        "resolver.roots",
                        &format!("root '{}' listed more than once", root),
                    ));
                }
            }
        }

        if let Some(level) = self.output.as_ref().and_then(|o| o.log_level.as_deref()) {
            if level.trim().is_empty() {
                return Err(invalid("output.log_level", "log level cannot be empty"));
            }
        }

        Ok(())
    }

    /// Configured descriptor paths, as written
    pub fn descriptor_paths(&self) -> &[PathBuf] {
        self.descriptors
            .as_ref()
            .map(|d| d.paths.as_slice())
            .unwrap_or(&[])
    }

    /// Configured descriptor extensions, if any
    pub fn extensions(&self) -> Option<&[String]> {
        self.descriptors
            .as_ref()
            .map(|d| d.extensions.as_slice())
            .filter(|e| !e.is_empty())
    }

    pub fn parallel(&self) -> Option<bool> {
        self.resolver.as_ref().and_then(|r| r.parallel)
    }

    pub fn roots(&self) -> &[String] {
        self.resolver
            .as_ref()
            .map(|r| r.roots.as_slice())
            .unwrap_or(&[])
    }

    pub fn format(&self) -> Option<OutputFormat> {
        self.output.as_ref().and_then(|o| o.format)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.output.as_ref().and_then(|o| o.log_level.as_deref())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_project_config() {
        let config: ProjectConfig = toml::from_str("").unwrap();
        assert!(config.validate().is_ok());
        assert!(config.descriptor_paths().is_empty());
        assert_eq!(config.parallel(), None);
        assert_eq!(config.format(), None);
    }

    #[test]
    fn test_parse_full_project_config() {
        let toml = r#"
[descriptors]
paths = ["modules", "engine/modules.toml"]
extensions = ["toml"]

[resolver]
parallel = false
roots = ["BattleStage"]

[output]
format = "json"
log_level = "modplan_build=debug"
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.descriptor_paths(),
            &[PathBuf::from("modules"), PathBuf::from("engine/modules.toml")]
        );
        assert_eq!(config.extensions(), Some(&["toml".to_string()][..]));
        assert_eq!(config.parallel(), Some(false));
        assert_eq!(config.roots(), &["BattleStage".to_string()]);
        assert_eq!(config.format(), Some(OutputFormat::Json));
        assert_eq!(config.log_level(), Some("modplan_build=debug"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml = r#"
[resolver]
threads = 4
"#;
        assert!(toml::from_str::<ProjectConfig>(toml).is_err());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!(" JSON ".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_duplicate_root_rejected() {
        let config = ProjectConfig {
            resolver: Some(ResolverConfig {
                parallel: None,
                roots: vec!["Game".to_string(), "Game".to_string()],
            }),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("listed more than once"));
    }

    #[test]
    fn test_empty_extension_rejected() {
        let config = ProjectConfig {
            descriptors: Some(DescriptorsConfig {
                paths: vec![],
                extensions: vec![".".to_string()],
            }),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
