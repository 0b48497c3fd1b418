//! Manifest command - list modules loaded at runtime instead of linked

use super::ResolveArgs;
use crate::render;
use anyhow::Result;
use modplan_config::Config;

pub fn run(args: &ResolveArgs, config: &Config) -> Result<()> {
    let resolution = super::resolve(args, config)?;

    if args.use_json(config) {
        println!("{}", serde_json::to_string_pretty(&resolution.manifest)?);
    } else {
        print!("{}", render::manifest(&resolution.manifest));
    }

    Ok(())
}
