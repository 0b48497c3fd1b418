/// Resolution error types
use std::path::PathBuf;
use thiserror::Error;

pub type ResolveResult<T> = Result<T, ResolveError>;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Module not found: {module}")]
    NotFound { module: String },

    #[error("Module '{module}' is described more than once")]
    DuplicateModule { module: String },

    #[error("Module '{module}' depends on unknown module '{missing}'")]
    UnknownDependency { module: String, missing: String },

    #[error("Module '{module}' depends on itself")]
    SelfDependency { module: String },

    #[error("Module '{module}' declares dependency '{dependency}' more than once")]
    DuplicateDeclaration { module: String, dependency: String },

    #[error("Circular dependency detected: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("Failed to read descriptors at {path}: {error}")]
    DescriptorRead { path: PathBuf, error: String },

    #[error("Invalid descriptor file {path}: {error}")]
    DescriptorParse { path: PathBuf, error: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResolveError {
    /// Create a module not found error
    pub fn not_found(module: impl Into<String>) -> Self {
        Self::NotFound {
            module: module.into(),
        }
    }

    /// Create an unknown dependency error
    pub fn unknown_dependency(module: impl Into<String>, missing: impl Into<String>) -> Self {
        Self::UnknownDependency {
            module: module.into(),
            missing: missing.into(),
        }
    }

    /// Create a duplicate declaration error
    pub fn duplicate_declaration(module: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self::DuplicateDeclaration {
            module: module.into(),
            dependency: dependency.into(),
        }
    }

    /// Create a descriptor read error
    pub fn descriptor_read(path: impl Into<PathBuf>, error: impl ToString) -> Self {
        Self::DescriptorRead {
            path: path.into(),
            error: error.to_string(),
        }
    }

    /// Create a descriptor parse error
    pub fn descriptor_parse(path: impl Into<PathBuf>, error: impl ToString) -> Self {
        Self::DescriptorParse {
            path: path.into(),
            error: error.to_string(),
        }
    }

    /// True for errors caused by the descriptor set itself rather than by I/O
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::DuplicateModule { .. }
                | Self::UnknownDependency { .. }
                | Self::SelfDependency { .. }
                | Self::DuplicateDeclaration { .. }
                | Self::Cycle { .. }
        )
    }
}
