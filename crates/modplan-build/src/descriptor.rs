//! Module descriptors: the declarative input records of a build invocation
//!
//! A descriptor names a module, the modules it depends on (publicly or
//! privately), its include paths, and the modules it only resolves at
//! runtime. Descriptors are read once per invocation and never mutated by
//! later stages.

use crate::graph::Visibility;
use serde::{Deserialize, Serialize};

/// Declarative description of one module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleDescriptor {
    /// Unique, case-sensitive module name
    pub name: String,

    /// Dependencies re-exported to this module's own dependents
    #[serde(default, alias = "publicDependencies")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub public_dependencies: Vec<String>,

    /// Dependencies used internally and not re-exported
    #[serde(default, alias = "privateDependencies")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub private_dependencies: Vec<String>,

    /// Include paths local to this module (never propagated)
    #[serde(default, alias = "includePaths")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include_paths: Vec<String>,

    /// Include paths exported to dependents
    #[serde(default, alias = "publicIncludePaths")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub public_include_paths: Vec<String>,

    /// Modules loaded at runtime instead of linked
    #[serde(default, alias = "dynamicModules")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dynamic_modules: Vec<String>,
}

impl ModuleDescriptor {
    /// Create a descriptor with no dependencies or paths
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            public_dependencies: Vec::new(),
            private_dependencies: Vec::new(),
            include_paths: Vec::new(),
            public_include_paths: Vec::new(),
            dynamic_modules: Vec::new(),
        }
    }

    /// Set public dependencies
    pub fn with_public<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.public_dependencies = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set private dependencies
    pub fn with_private<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.private_dependencies = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set local include paths
    pub fn with_include_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Set exported include paths
    pub fn with_public_include_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.public_include_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Set runtime-loaded modules
    pub fn with_dynamic<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dynamic_modules = names.into_iter().map(Into::into).collect();
        self
    }

    /// All declared dependencies in declaration order, public ones first
    pub fn dependencies(&self) -> impl Iterator<Item = (&str, Visibility)> + '_ {
        let public = self
            .public_dependencies
            .iter()
            .map(|name| (name.as_str(), Visibility::Public));
        let private = self
            .private_dependencies
            .iter()
            .map(|name| (name.as_str(), Visibility::Private));
        public.chain(private)
    }
}
