//! Check command - validate descriptors without emitting a plan
//!
//! Runs graph construction, cycle detection and conflict analysis only.
//! Conflicts are reported as warnings; any validation error fails the command.

use super::ResolveArgs;
use crate::render;
use anyhow::{Context, Result};
use colored::*;
use modplan_build::Resolver;
use modplan_config::Config;

/// Run the check command
pub fn run(args: &ResolveArgs, config: &Config) -> Result<()> {
    let store = super::load_store(args, config)?;
    let conflicts = Resolver::new()
        .with_options(args.options(config))
        .check(&store)
        .context("Validation failed")?;

    if args.use_json(config) {
        let output = serde_json::json!({
            "ok": true,
            "modules": store.len(),
            "conflicts": conflicts,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for report in render::sorted_reports(&conflicts) {
        println!("{}: {}", "warning".yellow().bold(), report);
    }
    println!(
        "{} ({} modules, {} conflicts)",
        "ok".green().bold(),
        store.len(),
        conflicts.len()
    );

    Ok(())
}
