//! Property tests for resolution invariants over generated acyclic descriptor sets

use modplan_build::{DescriptorStore, ModuleDescriptor, ModuleGraph, Resolver};
use proptest::prelude::*;

/// Generate descriptors whose link edges only point from later to earlier
/// modules (so the set is acyclic), with shuffled names and some modules
/// marked as runtime-loaded.
fn acyclic_descriptors() -> impl Strategy<Value = Vec<ModuleDescriptor>> {
    (1usize..14).prop_flat_map(|n| {
        let names: Vec<String> = (0..n).map(|i| format!("m{:02}", i)).collect();
        (
            Just(names).prop_shuffle(),
            prop::collection::vec(0u8..4, n * n),
            prop::collection::vec(prop::bool::weighted(0.15), n),
        )
            .prop_map(move |(names, edges, dynamic)| {
                let mut descriptors = Vec::with_capacity(n);
                for i in 0..n {
                    let mut public = Vec::new();
                    let mut private = Vec::new();
                    for j in 0..i {
                        match edges[i * n + j] {
                            1 => public.push(names[j].clone()),
                            2 => private.push(names[j].clone()),
                            _ => {}
                        }
                    }
                    descriptors.push(
                        ModuleDescriptor::new(names[i].clone())
                            .with_public(public)
                            .with_private(private),
                    );
                }

                let runtime: Vec<String> = names
                    .iter()
                    .zip(&dynamic)
                    .filter(|(_, &flag)| flag)
                    .map(|(name, _)| name.clone())
                    .collect();
                let last = descriptors.len() - 1;
                descriptors[last].dynamic_modules = runtime;
                descriptors
            })
    })
}

proptest! {
    #[test]
    fn test_plan_covers_every_module_once(descriptors in acyclic_descriptors()) {
        let count = descriptors.len();
        let store = DescriptorStore::new(descriptors).unwrap();
        let resolution = Resolver::new().resolve(&store).unwrap();

        prop_assert_eq!(resolution.plan.len(), count);
        let mut sorted = resolution.plan.order.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), count);
    }

    #[test]
    fn test_dependencies_precede_dependents(descriptors in acyclic_descriptors()) {
        let store = DescriptorStore::new(descriptors).unwrap();
        let graph = ModuleGraph::build(&store).unwrap();
        let resolution = Resolver::new().resolve(&store).unwrap();

        for edge in graph.edges() {
            let from = resolution.plan.position(&edge.from).unwrap();
            let to = resolution.plan.position(&edge.to).unwrap();
            prop_assert!(to < from, "{} must precede {}", edge.to, edge.from);
        }
    }

    #[test]
    fn test_groups_respect_dependencies(descriptors in acyclic_descriptors()) {
        let store = DescriptorStore::new(descriptors).unwrap();
        let graph = ModuleGraph::build(&store).unwrap();
        let resolution = Resolver::new().resolve(&store).unwrap();

        let group_of = |name: &str| {
            resolution
                .plan
                .groups
                .iter()
                .position(|group| group.iter().any(|m| m == name))
                .unwrap()
        };
        for edge in graph.edges() {
            prop_assert!(group_of(&edge.to) < group_of(&edge.from));
        }
        let placed: usize = resolution.plan.groups.iter().map(Vec::len).sum();
        prop_assert_eq!(placed, graph.len());
    }

    #[test]
    fn test_resolution_is_deterministic(descriptors in acyclic_descriptors()) {
        let store = DescriptorStore::new(descriptors).unwrap();
        let first = Resolver::new().with_parallel(true).resolve(&store).unwrap();
        let second = Resolver::new().with_parallel(false).resolve(&store).unwrap();

        prop_assert_eq!(
            serde_json::to_string(&first.plan).unwrap(),
            serde_json::to_string(&second.plan).unwrap()
        );
        prop_assert_eq!(
            serde_json::to_string(&first.manifest).unwrap(),
            serde_json::to_string(&second.manifest).unwrap()
        );
        prop_assert_eq!(first.modules, second.modules);
        prop_assert_eq!(first.conflicts, second.conflicts);
    }

    #[test]
    fn test_dynamic_modules_never_link_targets(descriptors in acyclic_descriptors()) {
        let store = DescriptorStore::new(descriptors).unwrap();
        let graph = ModuleGraph::build(&store).unwrap();
        let resolution = Resolver::new().resolve(&store).unwrap();

        for edge in graph.edges() {
            prop_assert!(!resolution.manifest.contains(&edge.to));
        }
        for edge in graph.deferred_edges() {
            prop_assert!(resolution.manifest.contains(&edge.to));
        }
    }

    #[test]
    fn test_exports_follow_public_edges(descriptors in acyclic_descriptors()) {
        let store = DescriptorStore::new(descriptors).unwrap();
        let graph = ModuleGraph::build(&store).unwrap();
        let resolution = Resolver::new().resolve(&store).unwrap();

        for edge in graph.edges() {
            let from = resolution.module(&edge.from).unwrap();
            let to = resolution.module(&edge.to).unwrap();
            // A module sees everything its dependency exports
            prop_assert!(to.exported_link_targets.is_subset(&from.link_targets));
            if edge.visibility.is_public() {
                prop_assert!(to.exported_link_targets.is_subset(&from.exported_link_targets));
            }
        }
    }
}
