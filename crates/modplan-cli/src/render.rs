//! Human-readable rendering
//!
//! Every renderer is a pure function of its input, so the same resolution
//! always prints the same text.

use modplan_build::{
    BuildPlan, DynamicModuleManifest, Resolution, ResolvedModule, VisibilityConflict,
};
use std::collections::BTreeSet;

fn lines_to_string(lines: Vec<String>) -> String {
    lines.into_iter().map(|line| line + "\n").collect()
}

/// Build order, manifest, and conflicts
pub fn plan(resolution: &Resolution) -> String {
    let mut lines = vec![format!("Build order ({} modules):", resolution.plan.len())];
    for (i, module) in resolution.plan.iter().enumerate() {
        lines.push(format!("{:>4}. {}", i + 1, module));
    }

    if !resolution.manifest.is_empty() {
        lines.push(format!("Dynamic modules ({}):", resolution.manifest.len()));
        lines.extend(resolution.manifest.iter().map(|m| format!("  {}", m)));
    }

    if !resolution.conflicts.is_empty() {
        lines.push(format!("Conflicts ({}):", resolution.conflicts.len()));
        lines.extend(
            sorted_reports(&resolution.conflicts)
                .into_iter()
                .map(|r| format!("  {}", r)),
        );
    }

    lines_to_string(lines)
}

/// One line per parallel build group
pub fn groups(plan: &BuildPlan) -> String {
    lines_to_string(
        plan.groups
            .iter()
            .enumerate()
            .map(|(i, group)| format!("Group {}: {}", i + 1, group.join(", ")))
            .collect(),
    )
}

/// Effective visibility of one module
pub fn module(module: &ResolvedModule) -> String {
    let mut lines = vec![format!("Module {}", module.name)];
    section(&mut lines, "Include paths", &module.include_paths);
    section(&mut lines, "Link targets", &module.link_targets);
    section(&mut lines, "Exported include paths", &module.exported_include_paths);
    section(&mut lines, "Exported link targets", &module.exported_link_targets);
    lines_to_string(lines)
}

fn section(lines: &mut Vec<String>, title: &str, items: &BTreeSet<String>) {
    lines.push(format!("  {}:", title));
    if items.is_empty() {
        lines.push("    (none)".to_string());
    }
    lines.extend(items.iter().map(|item| format!("    {}", item)));
}

/// Runtime-loaded modules, one per line
pub fn manifest(manifest: &DynamicModuleManifest) -> String {
    lines_to_string(manifest.iter().map(str::to_string).collect())
}

/// Conflict reports ordered by module name, then root
pub fn sorted_reports(conflicts: &[VisibilityConflict]) -> Vec<String> {
    let mut sorted: Vec<&VisibilityConflict> = conflicts.iter().collect();
    sorted.sort_by(|a, b| (&a.module, &a.root).cmp(&(&b.module, &b.root)));
    sorted.into_iter().map(VisibilityConflict::report).collect()
}
