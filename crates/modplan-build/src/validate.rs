//! Cycle and visibility-conflict detection over the link graph
//!
//! Both traversals use explicit stacks/queues so that a deep or
//! misconfigured descriptor set cannot exhaust the call stack.

use crate::error::{ResolveError, ResolveResult};
use crate::graph::{ModuleGraph, Visibility};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

/// A module observed from one root with both public and private visibility.
///
/// Advisory only: the module is treated as public (the more permissive
/// visibility wins). Diamond dependencies produce these routinely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityConflict {
    /// Module reached along both kinds of path
    pub module: String,
    /// Root the paths start from
    pub root: String,
    /// A path made only of public edges
    pub public_path: Vec<String>,
    /// A path containing at least one private edge
    pub private_path: Vec<String>,
    /// Visibility the module resolves to
    pub resolved: Visibility,
}

impl VisibilityConflict {
    /// Human-readable one-line report
    pub fn report(&self) -> String {
        format!(
            "'{}' is reachable from '{}' as public ({}) and private ({}); resolved as {}",
            self.module,
            self.root,
            self.public_path.join(" -> "),
            self.private_path.join(" -> "),
            self.resolved
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    OnPath,
    Done,
}

struct Frame<'a> {
    node: &'a str,
    deps: Vec<&'a str>,
    next: usize,
}

impl<'a> Frame<'a> {
    fn new(graph: &'a ModuleGraph, node: &'a str) -> Self {
        Self {
            node,
            deps: sorted_targets(graph, node),
            next: 0,
        }
    }
}

fn sorted_targets<'a>(graph: &'a ModuleGraph, node: &str) -> Vec<&'a str> {
    let mut deps: Vec<&str> = graph.dependencies(node).map(|e| e.to.as_str()).collect();
    deps.sort_unstable();
    deps
}

/// Graph validator
pub struct GraphValidator;

impl GraphValidator {
    /// Validate the graph: reject link cycles, then collect advisory conflicts
    ///
    /// `roots` selects the root set for conflict analysis; when empty, every
    /// module that nothing links against is a root.
    pub fn validate(
        graph: &ModuleGraph,
        roots: &[String],
    ) -> ResolveResult<Vec<VisibilityConflict>> {
        Self::check_acyclic(graph)?;
        let roots = Self::conflict_roots(graph, roots)?;
        Ok(Self::find_conflicts(graph, &roots))
    }

    /// Root set for conflict analysis, name-sorted and deduplicated
    ///
    /// Configured roots must name modules in the graph; an empty selection
    /// means every module that nothing links against.
    pub fn conflict_roots<'a>(
        graph: &'a ModuleGraph,
        roots: &'a [String],
    ) -> ResolveResult<Vec<&'a str>> {
        if roots.is_empty() {
            return Ok(graph.roots());
        }

        let mut selected = Vec::with_capacity(roots.len());
        for root in roots {
            if !graph.contains(root) {
                return Err(ResolveError::not_found(root.as_str()));
            }
            selected.push(root.as_str());
        }
        selected.sort_unstable();
        selected.dedup();
        Ok(selected)
    }

    /// Depth-first search over link edges for a back-edge
    ///
    /// Starts from modules in ascending name order and follows dependencies
    /// in ascending name order, so the reported path is canonical.
    pub fn check_acyclic(graph: &ModuleGraph) -> ResolveResult<()> {
        let mut marks: HashMap<&str, Mark> = HashMap::new();

        for start in graph.sorted_modules() {
            if marks.contains_key(start) {
                continue;
            }

            marks.insert(start, Mark::OnPath);
            let mut stack = vec![Frame::new(graph, start)];

            while let Some(frame) = stack.last_mut() {
                let Some(&dep) = frame.deps.get(frame.next) else {
                    marks.insert(frame.node, Mark::Done);
                    stack.pop();
                    continue;
                };
                frame.next += 1;

                match marks.get(dep).copied() {
                    Some(Mark::OnPath) => {
                        let begin = stack.iter().position(|f| f.node == dep).unwrap_or(0);
                        let mut path: Vec<String> =
                            stack[begin..].iter().map(|f| f.node.to_string()).collect();
                        path.push(dep.to_string());
                        return Err(ResolveError::Cycle { path });
                    }
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(dep, Mark::OnPath);
                        stack.push(Frame::new(graph, dep));
                    }
                }
            }
        }

        debug!("Link graph is acyclic ({} modules)", graph.len());
        Ok(())
    }

    /// Find modules reachable from a root through both a public-only path and
    /// a path with a private edge
    ///
    /// Each module is reported once, for the first root (in the given order)
    /// that observes the conflict. Results are sorted by module name.
    pub fn find_conflicts(graph: &ModuleGraph, roots: &[&str]) -> Vec<VisibilityConflict> {
        let mut reported = HashSet::new();
        let mut conflicts = Vec::new();

        for &root in roots {
            let predecessors = Self::explore(graph, root);

            for module in graph.sorted_modules() {
                if module == root || reported.contains(module) {
                    continue;
                }
                let public = (module, Visibility::Public);
                let private = (module, Visibility::Private);
                if !predecessors.contains_key(&public) || !predecessors.contains_key(&private) {
                    continue;
                }

                let conflict = VisibilityConflict {
                    module: module.to_string(),
                    root: root.to_string(),
                    public_path: Self::witness(&predecessors, public),
                    private_path: Self::witness(&predecessors, private),
                    resolved: Visibility::Public,
                };
                warn!("Visibility conflict: {}", conflict.report());
                reported.insert(module);
                conflicts.push(conflict);
            }
        }

        conflicts.sort_by(|a, b| a.module.cmp(&b.module));
        conflicts
    }

    /// Breadth-first search over (module, path visibility) states
    ///
    /// Returns each reached state mapped to the state it was first reached
    /// from; the root maps to itself.
    fn explore<'a>(
        graph: &'a ModuleGraph,
        root: &'a str,
    ) -> HashMap<(&'a str, Visibility), (&'a str, Visibility)> {
        let start = (root, Visibility::Public);
        let mut predecessors = HashMap::new();
        let mut queue = VecDeque::new();

        predecessors.insert(start, start);
        queue.push_back(start);

        while let Some(state @ (node, visibility)) = queue.pop_front() {
            let mut edges: Vec<_> = graph.dependencies(node).collect();
            edges.sort_by(|a, b| a.to.cmp(&b.to));

            for edge in edges {
                let next_visibility = if visibility.is_public() {
                    edge.visibility
                } else {
                    Visibility::Private
                };
                let next = (edge.to.as_str(), next_visibility);
                if !predecessors.contains_key(&next) {
                    predecessors.insert(next, state);
                    queue.push_back(next);
                }
            }
        }

        predecessors
    }

    fn witness<'a>(
        predecessors: &HashMap<(&'a str, Visibility), (&'a str, Visibility)>,
        end: (&'a str, Visibility),
    ) -> Vec<String> {
        let mut path = vec![end.0.to_string()];
        let mut current = end;

        while let Some(&prev) = predecessors.get(&current) {
            if prev == current {
                break;
            }
            path.push(prev.0.to_string());
            current = prev;
        }

        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ModuleDescriptor;
    use crate::store::DescriptorStore;

    fn graph(descriptors: Vec<ModuleDescriptor>) -> ModuleGraph {
        ModuleGraph::build(&DescriptorStore::new(descriptors).unwrap()).unwrap()
    }

    #[test]
    fn test_two_module_cycle() {
        let g = graph(vec![
            ModuleDescriptor::new("A").with_public(["B"]),
            ModuleDescriptor::new("B").with_private(["A"]),
        ]);

        match GraphValidator::check_acyclic(&g) {
            Err(ResolveError::Cycle { path }) => assert_eq!(path, vec!["A", "B", "A"]),
            other => panic!("Expected Cycle error, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_path_excludes_prefix() {
        let g = graph(vec![
            ModuleDescriptor::new("A").with_public(["B"]),
            ModuleDescriptor::new("B").with_public(["C"]),
            ModuleDescriptor::new("C").with_public(["D"]),
            ModuleDescriptor::new("D").with_public(["B"]),
        ]);

        match GraphValidator::check_acyclic(&g) {
            Err(ResolveError::Cycle { path }) => assert_eq!(path, vec!["B", "C", "D", "B"]),
            other => panic!("Expected Cycle error, got {:?}", other),
        }
    }

    #[test]
    fn test_diamond_is_acyclic() {
        let g = graph(vec![
            ModuleDescriptor::new("a").with_public(["b", "c"]),
            ModuleDescriptor::new("b").with_public(["d"]),
            ModuleDescriptor::new("c").with_public(["d"]),
            ModuleDescriptor::new("d"),
        ]);
        assert!(GraphValidator::check_acyclic(&g).is_ok());
    }

    #[test]
    fn test_deferred_edges_cannot_form_cycles() {
        let g = graph(vec![
            ModuleDescriptor::new("A").with_public(["B"]),
            ModuleDescriptor::new("B")
                .with_public(["A"])
                .with_dynamic(["A"]),
        ]);
        assert!(GraphValidator::check_acyclic(&g).is_ok());
    }

    #[test]
    fn test_diamond_conflict_resolves_public() {
        // Game sees Core publicly through Engine and privately through Slate
        let g = graph(vec![
            ModuleDescriptor::new("Game")
                .with_public(["Engine"])
                .with_private(["Slate"]),
            ModuleDescriptor::new("Engine").with_public(["Core"]),
            ModuleDescriptor::new("Slate").with_public(["Core"]),
            ModuleDescriptor::new("Core"),
        ]);

        let conflicts = GraphValidator::validate(&g, &[]).unwrap();
        assert_eq!(conflicts.len(), 1);
        let conflict = &conflicts[0];
        assert_eq!(conflict.module, "Core");
        assert_eq!(conflict.root, "Game");
        assert_eq!(conflict.public_path, vec!["Game", "Engine", "Core"]);
        assert_eq!(conflict.private_path, vec!["Game", "Slate", "Core"]);
        assert_eq!(conflict.resolved, Visibility::Public);
    }

    #[test]
    fn test_all_public_diamond_has_no_conflict() {
        let g = graph(vec![
            ModuleDescriptor::new("a").with_public(["b", "c"]),
            ModuleDescriptor::new("b").with_public(["d"]),
            ModuleDescriptor::new("c").with_public(["d"]),
            ModuleDescriptor::new("d"),
        ]);
        assert!(GraphValidator::validate(&g, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_conflict_reported_once_across_roots() {
        let g = graph(vec![
            ModuleDescriptor::new("Game")
                .with_public(["Core"])
                .with_private(["Util"]),
            ModuleDescriptor::new("Tool")
                .with_public(["Core"])
                .with_private(["Util"]),
            ModuleDescriptor::new("Util").with_public(["Core"]),
            ModuleDescriptor::new("Core"),
        ]);

        let conflicts = GraphValidator::validate(&g, &[]).unwrap();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].root, "Game");
    }

    #[test]
    fn test_explicit_roots() {
        let g = graph(vec![
            ModuleDescriptor::new("Game")
                .with_public(["Core"])
                .with_private(["Util"]),
            ModuleDescriptor::new("Util").with_public(["Core"]),
            ModuleDescriptor::new("Core"),
        ]);

        let conflicts = GraphValidator::validate(&g, &["Util".to_string()]).unwrap();
        assert!(conflicts.is_empty());

        let result = GraphValidator::validate(&g, &["Missing".to_string()]);
        assert!(matches!(result, Err(ResolveError::NotFound { .. })));
    }

    #[test]
    fn test_cycle_reported_before_conflicts() {
        let g = graph(vec![
            ModuleDescriptor::new("A").with_public(["B"]),
            ModuleDescriptor::new("B").with_public(["A"]),
        ]);
        assert!(matches!(
            GraphValidator::validate(&g, &[]),
            Err(ResolveError::Cycle { .. })
        ));
    }

    #[test]
    fn test_conflict_roots_selection() {
        let g = graph(vec![
            ModuleDescriptor::new("Game").with_public(["Core"]),
            ModuleDescriptor::new("Editor").with_public(["Core"]),
            ModuleDescriptor::new("Core"),
        ]);

        assert_eq!(
            GraphValidator::conflict_roots(&g, &[]).unwrap(),
            vec!["Editor", "Game"]
        );

        let configured = vec!["Game".to_string(), "Core".to_string(), "Game".to_string()];
        assert_eq!(
            GraphValidator::conflict_roots(&g, &configured).unwrap(),
            vec!["Core", "Game"]
        );

        let unknown = vec!["Core".to_string(), "Server".to_string()];
        match GraphValidator::conflict_roots(&g, &unknown) {
            Err(ResolveError::NotFound { module }) => assert_eq!(module, "Server"),
            other => panic!("Expected NotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_conflict_report_text() {
        let conflict = VisibilityConflict {
            module: "Core".into(),
            root: "Game".into(),
            public_path: vec!["Game".into(), "Core".into()],
            private_path: vec!["Game".into(), "Util".into(), "Core".into()],
            resolved: Visibility::Public,
        };
        let report = conflict.report();
        assert!(report.contains("Game -> Util -> Core"));
        assert!(report.ends_with("resolved as public"));
    }
}
