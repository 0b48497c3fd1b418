//! Dependency graph construction from a descriptor store
use crate::error::{ResolveError, ResolveResult};
use crate::store::DescriptorStore;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use tracing::debug;

/// Visibility of a dependency edge
///
/// Ordered so that the more permissive visibility compares greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Used internally, not re-exported
    Private,
    /// Re-exported to the declaring module's dependents
    Public,
}

impl Visibility {
    pub fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed "depends on" relation between two modules
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Declaring module
    pub from: String,
    /// Module depended upon
    pub to: String,
    /// Declared visibility
    pub visibility: Visibility,
}

impl DependencyEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            visibility,
        }
    }
}

/// Module dependency graph for one build invocation.
///
/// Link edges drive ordering, cycle detection and propagation. Edges whose
/// target is a runtime-loaded module are kept apart as deferred edges and
/// never constrain the build. The graph is rebuilt from scratch on every
/// resolution; edges are never removed once inserted.
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    /// Module names in descriptor order
    modules: Vec<String>,
    /// Link edges in declaration order
    edges: Vec<DependencyEdge>,
    /// Edges to runtime-loaded modules
    deferred: Vec<DependencyEdge>,
    /// Module -> indices of its outgoing link edges
    outgoing: HashMap<String, Vec<usize>>,
    /// Module -> indices of its incoming link edges
    incoming: HashMap<String, Vec<usize>>,
    /// Union of every descriptor's runtime-loaded modules
    dynamic: BTreeSet<String>,
}

impl ModuleGraph {
    /// Build the graph from a descriptor store, validating every declaration
    pub fn build(store: &DescriptorStore) -> ResolveResult<Self> {
        let dynamic = store.dynamic_modules();
        let mut graph = Self {
            dynamic: dynamic.iter().map(|name| name.to_string()).collect(),
            ..Self::default()
        };

        for descriptor in store.all() {
            graph.modules.push(descriptor.name.clone());
            graph.outgoing.entry(descriptor.name.clone()).or_default();
            graph.incoming.entry(descriptor.name.clone()).or_default();
        }

        for descriptor in store.all() {
            let module = descriptor.name.as_str();
            let mut declared = HashSet::new();

            for (dep, visibility) in descriptor.dependencies() {
                if dep == module {
                    return Err(ResolveError::SelfDependency {
                        module: module.to_string(),
                    });
                }

                if !declared.insert(dep) {
                    return Err(ResolveError::duplicate_declaration(module, dep));
                }

                let edge = DependencyEdge::new(module, dep, visibility);

                // Runtime resolution takes precedence over linking
                if dynamic.contains(dep) {
                    debug!("Deferring {} -> {} (runtime-loaded)", module, dep);
                    graph.deferred.push(edge);
                    continue;
                }

                if !store.contains(dep) {
                    return Err(ResolveError::unknown_dependency(module, dep));
                }

                graph.insert_edge(edge);
            }
        }

        debug!(
            "Built module graph: {} modules, {} link edges, {} deferred edges",
            graph.modules.len(),
            graph.edges.len(),
            graph.deferred.len()
        );

        Ok(graph)
    }

    fn insert_edge(&mut self, edge: DependencyEdge) {
        let index = self.edges.len();
        self.outgoing
            .entry(edge.from.clone())
            .or_default()
            .push(index);
        self.incoming.entry(edge.to.clone()).or_default().push(index);
        self.edges.push(edge);
    }

    /// Module names in descriptor order
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    /// Module names in ascending order
    pub fn sorted_modules(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modules.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Check whether the graph contains a module
    pub fn contains(&self, name: &str) -> bool {
        self.outgoing.contains_key(name)
    }

    /// All link edges
    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// Edges to runtime-loaded modules
    pub fn deferred_edges(&self) -> &[DependencyEdge] {
        &self.deferred
    }

    /// Runtime-loaded module names, ascending
    pub fn dynamic_modules(&self) -> &BTreeSet<String> {
        &self.dynamic
    }

    /// Outgoing link edges of a module
    pub fn dependencies<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a DependencyEdge> + 'a {
        self.outgoing
            .get(name)
            .into_iter()
            .flatten()
            .map(move |&i| &self.edges[i])
    }

    /// Incoming link edges of a module
    pub fn dependents<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a DependencyEdge> + 'a {
        self.incoming
            .get(name)
            .into_iter()
            .flatten()
            .map(move |&i| &self.edges[i])
    }

    /// Number of link dependencies of a module
    pub fn dependency_count(&self, name: &str) -> usize {
        self.outgoing.get(name).map_or(0, Vec::len)
    }

    /// Modules no other module links against, in ascending order
    pub fn roots(&self) -> Vec<&str> {
        self.sorted_modules()
            .into_iter()
            .filter(|name| self.incoming.get(*name).map_or(true, Vec::is_empty))
            .collect()
    }

    /// Get module count
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if graph is empty
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
