//! Resolution pipeline
//!
//! Runs the stages in order: graph construction, cycle check, root
//! selection, visibility propagation, conflict analysis, plan emission. Each
//! stage only reads the output of earlier ones, and the first validation
//! failure aborts the run before any plan is produced.

use crate::descriptor::ModuleDescriptor;
use crate::error::{ResolveError, ResolveResult};
use crate::graph::ModuleGraph;
use crate::plan::{BuildPlan, DynamicModuleManifest, PlanEmitter};
use crate::propagate::{Propagator, ResolvedModule, ResolvedModules};
use crate::store::DescriptorStore;
use crate::validate::{GraphValidator, VisibilityConflict};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::info;

/// Resolver options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Resolve independent modules concurrently during propagation
    pub parallel: bool,
    /// Root set for conflict analysis (empty: modules nothing links against)
    pub roots: Vec<String>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            roots: Vec::new(),
        }
    }
}

/// Resolution statistics
#[derive(Debug, Clone, Default)]
pub struct ResolveStats {
    /// Number of modules
    pub total_modules: usize,
    /// Number of link edges
    pub link_edges: usize,
    /// Number of edges deferred to runtime
    pub deferred_edges: usize,
    /// Number of parallel build groups
    pub parallel_groups: usize,
    /// Time spent on graph construction and validation
    pub validation_time: Duration,
    /// Time spent propagating visibility
    pub propagation_time: Duration,
    /// Total resolution time
    pub total_time: Duration,
}

/// Result of a successful resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    /// Compile/link order
    pub plan: BuildPlan,
    /// Modules loaded at runtime
    pub manifest: DynamicModuleManifest,
    /// Effective visibility of every module
    pub modules: ResolvedModules,
    /// Advisory visibility conflicts
    pub conflicts: Vec<VisibilityConflict>,
    /// Timing and size information
    #[serde(skip)]
    pub stats: ResolveStats,
}

impl Resolution {
    /// Get the resolved view of a module
    pub fn module(&self, name: &str) -> ResolveResult<&ResolvedModule> {
        self.modules
            .get(name)
            .ok_or_else(|| ResolveError::not_found(name))
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Resolves descriptor stores into build plans
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    options: ResolverOptions,
}

impl Resolver {
    /// Create a resolver with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set resolver options
    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Enable/disable parallel propagation
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.options.parallel = parallel;
        self
    }

    /// Set the root set for conflict analysis
    pub fn with_roots<I, S>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.roots = roots.into_iter().map(Into::into).collect();
        self
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Validate a store without propagating or emitting
    pub fn check(&self, store: &DescriptorStore) -> ResolveResult<Vec<VisibilityConflict>> {
        let graph = ModuleGraph::build(store)?;
        GraphValidator::validate(&graph, &self.options.roots)
    }

    /// Run the full pipeline
    pub fn resolve(&self, store: &DescriptorStore) -> ResolveResult<Resolution> {
        let start = Instant::now();

        let graph = ModuleGraph::build(store)?;
        GraphValidator::check_acyclic(&graph)?;
        let roots = GraphValidator::conflict_roots(&graph, &self.options.roots)?;
        let validation_time = start.elapsed();

        let propagation_start = Instant::now();
        let modules = Propagator::new(self.options.parallel).propagate(&graph, store)?;
        let propagation_time = propagation_start.elapsed();

        let conflicts = GraphValidator::find_conflicts(&graph, &roots);
        let (plan, manifest) = PlanEmitter::emit(&graph, &modules)?;

        let stats = ResolveStats {
            total_modules: graph.len(),
            link_edges: graph.edges().len(),
            deferred_edges: graph.deferred_edges().len(),
            parallel_groups: plan.groups.len(),
            validation_time,
            propagation_time,
            total_time: start.elapsed(),
        };

        info!(
            "Resolved {} modules ({} link edges, {} runtime modules, {} conflicts) in {:.2}ms",
            stats.total_modules,
            stats.link_edges,
            manifest.len(),
            conflicts.len(),
            stats.total_time.as_secs_f64() * 1000.0
        );

        Ok(Resolution {
            plan,
            manifest,
            modules,
            conflicts,
            stats,
        })
    }
}

/// Resolve a descriptor snapshot with default options
pub fn resolve(
    descriptors: impl IntoIterator<Item = ModuleDescriptor>,
) -> ResolveResult<Resolution> {
    let store = DescriptorStore::new(descriptors)?;
    Resolver::new().resolve(&store)
}
