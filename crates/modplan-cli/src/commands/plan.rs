//! Plan command - resolve descriptors into a build order and runtime manifest

use super::ResolveArgs;
use crate::render;
use anyhow::Result;
use modplan_config::Config;

/// Run the plan command
pub fn run(args: &ResolveArgs, config: &Config) -> Result<()> {
    let resolution = super::resolve(args, config)?;

    if args.use_json(config) {
        let output = serde_json::json!({
            "order": resolution.plan.order,
            "groups": resolution.plan.groups,
            "manifest": resolution.manifest,
            "conflicts": resolution.conflicts,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render::plan(&resolution));
    }

    Ok(())
}
