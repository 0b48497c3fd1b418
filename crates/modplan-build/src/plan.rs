//! Build plan emission using topological sort
use crate::error::{ResolveError, ResolveResult};
use crate::graph::ModuleGraph;
use crate::propagate::ResolvedModules;
use crate::validate::GraphValidator;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Dependency-respecting compile/link order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuildPlan {
    /// Modules in build order: every link dependency precedes its dependents
    pub order: Vec<String>,
    /// Modules grouped into waves that can be built concurrently
    pub groups: Vec<Vec<String>>,
}

impl BuildPlan {
    /// Position of a module in the build order
    pub fn position(&self, module: &str) -> Option<usize> {
        self.order.iter().position(|m| m == module)
    }

    /// Check whether a module is part of the plan
    pub fn contains(&self, module: &str) -> bool {
        self.position(module).is_some()
    }

    /// Iterate over modules in build order
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Modules resolved lazily at runtime, name-sorted and deduplicated
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicModuleManifest {
    modules: BTreeSet<String>,
}

impl DynamicModuleManifest {
    pub fn new<I, S>(modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            modules: modules.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, module: &str) -> bool {
        self.modules.contains(module)
    }

    /// Module names in ascending order
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.modules.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Build plan emitter
pub struct PlanEmitter;

impl PlanEmitter {
    /// Emit the build plan and the dynamic module manifest
    ///
    /// Every module in the graph must have been resolved.
    pub fn emit(
        graph: &ModuleGraph,
        resolved: &ResolvedModules,
    ) -> ResolveResult<(BuildPlan, DynamicModuleManifest)> {
        if let Some(missing) = graph.modules().iter().find(|m| !resolved.contains_key(*m)) {
            return Err(ResolveError::not_found(missing.as_str()));
        }

        let plan = BuildPlan {
            order: Self::build_order(graph)?,
            groups: Self::parallel_groups(graph)?,
        };
        let manifest = DynamicModuleManifest::new(graph.dynamic_modules().iter().cloned());

        debug!(
            "Emitted build plan: {} modules in {} groups, {} runtime modules",
            plan.len(),
            plan.groups.len(),
            manifest.len()
        );

        Ok((plan, manifest))
    }

    /// Compute topological build order using Kahn's algorithm
    ///
    /// Among modules that are ready at the same time the smallest name goes
    /// first, so identical inputs always give identical output.
    pub fn build_order(graph: &ModuleGraph) -> ResolveResult<Vec<String>> {
        let mut remaining = Self::dependency_counts(graph);
        let mut ready: BTreeSet<&str> = remaining
            .iter()
            .filter(|(_, &count)| count == 0)
            .map(|(&name, _)| name)
            .collect();
        let mut order = Vec::with_capacity(graph.len());

        while let Some(module) = ready.pop_first() {
            order.push(module.to_string());

            for edge in graph.dependents(module) {
                if let Some(count) = remaining.get_mut(edge.from.as_str()) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(edge.from.as_str());
                    }
                }
            }
        }

        if order.len() != graph.len() {
            return Err(Self::cycle_error(graph));
        }

        Ok(order)
    }

    /// Find modules that can be built in parallel
    /// Returns groups where each group only depends on earlier groups
    pub fn parallel_groups(graph: &ModuleGraph) -> ResolveResult<Vec<Vec<String>>> {
        let mut remaining = Self::dependency_counts(graph);
        let mut group: Vec<&str> = graph
            .sorted_modules()
            .into_iter()
            .filter(|m| remaining.get(m) == Some(&0))
            .collect();
        let mut groups = Vec::new();
        let mut placed = 0;

        while !group.is_empty() {
            let mut next = Vec::new();
            for &module in &group {
                for edge in graph.dependents(module) {
                    if let Some(count) = remaining.get_mut(edge.from.as_str()) {
                        *count -= 1;
                        if *count == 0 {
                            next.push(edge.from.as_str());
                        }
                    }
                }
            }

            placed += group.len();
            groups.push(group.iter().map(|m| m.to_string()).collect());

            // Sort group for deterministic output
            next.sort_unstable();
            group = next;
        }

        if placed != graph.len() {
            return Err(Self::cycle_error(graph));
        }

        Ok(groups)
    }

    fn dependency_counts(graph: &ModuleGraph) -> HashMap<&str, usize> {
        graph
            .modules()
            .iter()
            .map(|m| (m.as_str(), graph.dependency_count(m)))
            .collect()
    }

    fn cycle_error(graph: &ModuleGraph) -> ResolveError {
        match GraphValidator::check_acyclic(graph) {
            Err(err) => err,
            Ok(()) => ResolveError::Cycle { path: Vec::new() },
        }
    }
}
