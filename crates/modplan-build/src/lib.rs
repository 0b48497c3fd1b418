//! modplan module resolution engine
//!
//! Turns a snapshot of module descriptors into a validated build plan:
//! - Descriptor store (read-only lookup for one invocation)
//! - Dependency graph construction and validation
//! - Cycle detection and visibility-conflict analysis
//! - Public/private visibility propagation (optionally parallel)
//! - Deterministic build order, parallel build groups, and the manifest of
//!   runtime-loaded modules
//!
//! # Example
//!
//! ```
//! use modplan_build::{resolve, ModuleDescriptor};
//!
//! let resolution = resolve(vec![
//!     ModuleDescriptor::new("Game")
//!         .with_public(["Engine"])
//!         .with_dynamic(["OnlineSubsystemNull"]),
//!     ModuleDescriptor::new("Engine").with_public(["Core"]),
//!     ModuleDescriptor::new("Core"),
//! ])
//! .unwrap();
//!
//! assert_eq!(resolution.plan.order, vec!["Core", "Engine", "Game"]);
//! assert!(resolution.manifest.contains("OnlineSubsystemNull"));
//! ```

pub mod descriptor;
pub mod error;
pub mod graph;
pub mod loader;
pub mod plan;
pub mod propagate;
pub mod resolver;
pub mod store;
pub mod validate;

// Re-export main types
pub use descriptor::ModuleDescriptor;
pub use error::{ResolveError, ResolveResult};
pub use graph::{DependencyEdge, ModuleGraph, Visibility};
pub use loader::{DescriptorFile, DescriptorLoader};
pub use plan::{BuildPlan, DynamicModuleManifest, PlanEmitter};
pub use propagate::{Propagator, ResolvedModule, ResolvedModules};
pub use resolver::{resolve, Resolution, ResolveStats, Resolver, ResolverOptions};
pub use store::DescriptorStore;
pub use validate::{GraphValidator, VisibilityConflict};
