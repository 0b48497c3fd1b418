//! Subcommand implementations

pub mod check;
pub mod groups;
pub mod manifest;
pub mod plan;
pub mod show;

use anyhow::{bail, Context, Result};
use modplan_build::{DescriptorLoader, DescriptorStore, Resolution, Resolver, ResolverOptions};
use modplan_config::{Config, OutputFormat};
use std::path::PathBuf;
use tracing::debug;

/// Arguments shared by every resolving command
#[derive(Debug, Default, Clone)]
pub struct ResolveArgs {
    /// Descriptor files or directories (default: configured paths)
    pub paths: Vec<PathBuf>,
    /// Disable parallel propagation
    pub sequential: bool,
    /// Root modules for conflict analysis (default: configured roots)
    pub roots: Vec<String>,
    /// JSON output
    pub json: bool,
}

impl ResolveArgs {
    /// Command-line flag overrides the configured format
    pub fn use_json(&self, config: &Config) -> bool {
        self.json || config.format() == OutputFormat::Json
    }

    /// Resolver options, CLI flags taking precedence over config
    pub fn options(&self, config: &Config) -> ResolverOptions {
        ResolverOptions {
            parallel: !self.sequential && config.parallel(),
            roots: if self.roots.is_empty() {
                config.roots().to_vec()
            } else {
                self.roots.clone()
            },
        }
    }

    fn descriptor_paths(&self, config: &Config) -> Vec<PathBuf> {
        if self.paths.is_empty() {
            config.descriptor_paths()
        } else {
            self.paths.clone()
        }
    }
}

/// Load the descriptor snapshot named by the arguments
pub fn load_store(args: &ResolveArgs, config: &Config) -> Result<DescriptorStore> {
    let paths = args.descriptor_paths(config);
    if paths.is_empty() {
        bail!("No descriptor paths given and none configured in modplan.toml");
    }

    let descriptors = DescriptorLoader::new()
        .with_extensions(config.extensions())
        .load_paths(&paths)
        .context("Failed to load module descriptors")?;
    debug!(
        "Loaded {} descriptors from {} path(s)",
        descriptors.len(),
        paths.len()
    );

    DescriptorStore::new(descriptors).context("Invalid descriptor set")
}

/// Load descriptors and run the full resolution pipeline
pub fn resolve(args: &ResolveArgs, config: &Config) -> Result<Resolution> {
    let store = load_store(args, config)?;
    Resolver::new()
        .with_options(args.options(config))
        .resolve(&store)
        .context("Resolution failed")
}
