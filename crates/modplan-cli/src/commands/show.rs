//! Show command - effective include paths and link targets of one module

use super::ResolveArgs;
use crate::render;
use anyhow::{Context, Result};
use modplan_config::Config;

/// Run the show command
pub fn run(module: &str, args: &ResolveArgs, config: &Config) -> Result<()> {
    let resolution = super::resolve(args, config)?;
    let resolved = resolution
        .module(module)
        .with_context(|| format!("Cannot show module '{}'", module))?;

    if args.use_json(config) {
        println!("{}", serde_json::to_string_pretty(resolved)?);
    } else {
        print!("{}", render::module(resolved));
    }

    Ok(())
}
