//! Visibility propagation
//!
//! A module's exports are its own name (as a link target) and its public
//! include paths, plus the exports of every module it depends on publicly.
//! A module compiles against the exports of all of its dependencies, public
//! or private; private dependencies are never re-exported, so their effect
//! stops after one hop.
//!
//! Modules are released for resolution by a per-module counter of
//! unresolved dependencies. In parallel mode every released wave is
//! resolved concurrently with rayon; each task reads only finished entries
//! and produces only its own.

use crate::error::{ResolveError, ResolveResult};
use crate::graph::ModuleGraph;
use crate::store::DescriptorStore;
use crate::validate::GraphValidator;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use tracing::debug;

/// A module together with its transitively propagated visibility sets
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolvedModule {
    /// Module name
    pub name: String,
    /// Include paths visible when compiling this module
    pub include_paths: BTreeSet<String>,
    /// Modules this module links against
    pub link_targets: BTreeSet<String>,
    /// Include paths this module exports to its dependents
    pub exported_include_paths: BTreeSet<String>,
    /// Link targets this module exports to its dependents (including itself)
    pub exported_link_targets: BTreeSet<String>,
}

impl ResolvedModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Check whether a module's exports are visible to this module
    pub fn sees(&self, module: &str) -> bool {
        self.link_targets.contains(module)
    }

    /// Check whether this module re-exports another module
    pub fn exports(&self, module: &str) -> bool {
        self.exported_link_targets.contains(module)
    }
}

/// Resolved modules keyed by name
pub type ResolvedModules = BTreeMap<String, ResolvedModule>;

/// Visibility propagator
#[derive(Debug, Clone, Copy)]
pub struct Propagator {
    parallel: bool,
}

impl Propagator {
    /// Create a propagator; `parallel` resolves independent modules concurrently
    pub fn new(parallel: bool) -> Self {
        Self { parallel }
    }

    /// Compute the resolved module for every module in an acyclic graph
    pub fn propagate(
        &self,
        graph: &ModuleGraph,
        store: &DescriptorStore,
    ) -> ResolveResult<ResolvedModules> {
        let mut remaining: HashMap<&str, usize> = graph
            .modules()
            .iter()
            .map(|m| (m.as_str(), graph.dependency_count(m)))
            .collect();

        let mut ready: Vec<&str> = graph
            .sorted_modules()
            .into_iter()
            .filter(|m| remaining.get(m) == Some(&0))
            .collect();

        let mut resolved: HashMap<String, ResolvedModule> = HashMap::with_capacity(graph.len());

        if self.parallel {
            let mut waves = 0;
            while !ready.is_empty() {
                let wave: Vec<ResolvedModule> = ready
                    .par_iter()
                    .map(|name| resolve_one(name, graph, store, &resolved))
                    .collect::<ResolveResult<_>>()?;

                let mut next = Vec::new();
                for module in wave {
                    release_dependents(graph, &module.name, &mut remaining, |m| next.push(m));
                    resolved.insert(module.name.clone(), module);
                }
                next.sort_unstable();
                ready = next;
                waves += 1;
            }
            debug!("Propagated visibility in {} parallel waves", waves);
        } else {
            let mut queue: VecDeque<&str> = ready.drain(..).collect();
            while let Some(name) = queue.pop_front() {
                let module = resolve_one(name, graph, store, &resolved)?;
                release_dependents(graph, name, &mut remaining, |m| queue.push_back(m));
                resolved.insert(module.name.clone(), module);
            }
        }

        if resolved.len() != graph.len() {
            GraphValidator::check_acyclic(graph)?;
        }

        debug!("Resolved {} modules", resolved.len());
        Ok(resolved.into_iter().collect())
    }
}

impl Default for Propagator {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Decrement the counters of every module linking against `name`, reporting
/// those that become ready
fn release_dependents<'a>(
    graph: &'a ModuleGraph,
    name: &str,
    remaining: &mut HashMap<&'a str, usize>,
    mut on_ready: impl FnMut(&'a str),
) {
    for edge in graph.dependents(name) {
        if let Some(count) = remaining.get_mut(edge.from.as_str()) {
            *count -= 1;
            if *count == 0 {
                on_ready(edge.from.as_str());
            }
        }
    }
}

fn resolve_one(
    name: &str,
    graph: &ModuleGraph,
    store: &DescriptorStore,
    resolved: &HashMap<String, ResolvedModule>,
) -> ResolveResult<ResolvedModule> {
    let descriptor = store.get(name)?;
    let mut module = ResolvedModule::new(name);

    module
        .include_paths
        .extend(descriptor.include_paths.iter().cloned());
    module
        .include_paths
        .extend(descriptor.public_include_paths.iter().cloned());
    module
        .exported_include_paths
        .extend(descriptor.public_include_paths.iter().cloned());
    module.exported_link_targets.insert(name.to_string());

    for edge in graph.dependencies(name) {
        let dep = resolved
            .get(&edge.to)
            .ok_or_else(|| ResolveError::not_found(edge.to.as_str()))?;

        module
            .include_paths
            .extend(dep.exported_include_paths.iter().cloned());
        module
            .link_targets
            .extend(dep.exported_link_targets.iter().cloned());

        if edge.visibility.is_public() {
            module
                .exported_include_paths
                .extend(dep.exported_include_paths.iter().cloned());
            module
                .exported_link_targets
                .extend(dep.exported_link_targets.iter().cloned());
        }
    }

    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ModuleDescriptor;

    fn propagate(descriptors: Vec<ModuleDescriptor>, parallel: bool) -> ResolvedModules {
        let store = DescriptorStore::new(descriptors).unwrap();
        let graph = ModuleGraph::build(&store).unwrap();
        Propagator::new(parallel).propagate(&graph, &store).unwrap()
    }

    fn chain() -> Vec<ModuleDescriptor> {
        vec![
            ModuleDescriptor::new("D").with_public(["A"]),
            ModuleDescriptor::new("A").with_private(["B"]),
            ModuleDescriptor::new("B")
                .with_public(["C"])
                .with_public_include_paths(["B/Public"]),
            ModuleDescriptor::new("C").with_public_include_paths(["C/Public"]),
        ]
    }

    #[test]
    fn test_two_hop_public_propagation() {
        let resolved = propagate(
            vec![
                ModuleDescriptor::new("A").with_public(["B"]),
                ModuleDescriptor::new("B").with_public(["C"]),
                ModuleDescriptor::new("C").with_public_include_paths(["C/Public"]),
            ],
            false,
        );

        let a = &resolved["A"];
        assert!(a.exports("C"));
        assert!(a.exported_include_paths.contains("C/Public"));
        assert!(a.sees("B"));
        assert!(a.sees("C"));
    }

    #[test]
    fn test_private_propagation_stops_after_one_hop() {
        let resolved = propagate(chain(), false);

        let a = &resolved["A"];
        assert!(a.sees("B"));
        assert!(a.sees("C"));
        assert!(a.include_paths.contains("C/Public"));
        assert!(!a.exports("B"));
        assert!(!a.exports("C"));

        let d = &resolved["D"];
        assert!(d.sees("A"));
        assert!(!d.sees("B"));
        assert!(!d.sees("C"));
        assert!(!d.include_paths.contains("C/Public"));
    }

    #[test]
    fn test_local_include_paths_not_exported() {
        let resolved = propagate(
            vec![
                ModuleDescriptor::new("Game").with_public(["Core"]),
                ModuleDescriptor::new("Core")
                    .with_include_paths(["Core/Private"])
                    .with_public_include_paths(["Core/Public"]),
            ],
            false,
        );

        let core = &resolved["Core"];
        assert!(core.include_paths.contains("Core/Private"));
        assert!(core.include_paths.contains("Core/Public"));
        assert!(!core.exported_include_paths.contains("Core/Private"));

        let game = &resolved["Game"];
        assert!(game.include_paths.contains("Core/Public"));
        assert!(!game.include_paths.contains("Core/Private"));
    }

    #[test]
    fn test_module_exports_itself_but_does_not_link_itself() {
        let resolved = propagate(vec![ModuleDescriptor::new("Core")], false);
        let core = &resolved["Core"];
        assert!(core.exports("Core"));
        assert!(!core.sees("Core"));
    }

    #[test]
    fn test_deferred_edges_contribute_nothing() {
        let resolved = propagate(
            vec![
                ModuleDescriptor::new("Game")
                    .with_public(["Online"])
                    .with_dynamic(["Online"]),
                ModuleDescriptor::new("Online").with_public_include_paths(["Online/Public"]),
            ],
            false,
        );
        let game = &resolved["Game"];
        assert!(!game.sees("Online"));
        assert!(game.include_paths.is_empty());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut descriptors = chain();
        descriptors.push(ModuleDescriptor::new("E").with_public(["C", "D"]));
        descriptors.push(ModuleDescriptor::new("F").with_private(["E", "B"]));

        let sequential = propagate(descriptors.clone(), false);
        let parallel = propagate(descriptors, true);
        assert_eq!(sequential, parallel);
        assert_eq!(parallel.len(), 6);
    }

    #[test]
    fn test_cyclic_graph_reports_cycle() {
        let store = DescriptorStore::new(vec![
            ModuleDescriptor::new("A").with_public(["B"]),
            ModuleDescriptor::new("B").with_public(["A"]),
        ])
        .unwrap();
        let graph = ModuleGraph::build(&store).unwrap();

        let result = Propagator::new(true).propagate(&graph, &store);
        assert!(matches!(result, Err(ResolveError::Cycle { .. })));
    }
}
