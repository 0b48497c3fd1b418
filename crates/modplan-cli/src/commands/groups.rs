//! Groups command - modules that can be built concurrently, wave by wave

use super::ResolveArgs;
use crate::render;
use anyhow::Result;
use modplan_config::Config;

/// Run the groups command
pub fn run(args: &ResolveArgs, config: &Config) -> Result<()> {
    let resolution = super::resolve(args, config)?;

    if args.use_json(config) {
        println!("{}", serde_json::to_string_pretty(&resolution.plan.groups)?);
    } else {
        print!("{}", render::groups(&resolution.plan));
    }

    Ok(())
}
