//! Descriptor store scoped to a single build invocation
use crate::descriptor::ModuleDescriptor;
use crate::error::{ResolveError, ResolveResult};
use std::collections::{BTreeSet, HashMap};

/// Read-only lookup of module descriptors by name.
///
/// A store is built once from a complete descriptor snapshot and passed
/// explicitly to every stage; there is no process-wide registry.
#[derive(Debug, Clone, Default)]
pub struct DescriptorStore {
    /// Descriptors in insertion order
    descriptors: Vec<ModuleDescriptor>,
    /// Module name -> position in `descriptors`
    index: HashMap<String, usize>,
}

impl DescriptorStore {
    /// Create a store from a descriptor snapshot
    ///
    /// Fails with `DuplicateModule` when two descriptors share a name.
    pub fn new(descriptors: impl IntoIterator<Item = ModuleDescriptor>) -> ResolveResult<Self> {
        let mut store = Self::default();

        for descriptor in descriptors {
            if store.index.contains_key(&descriptor.name) {
                return Err(ResolveError::DuplicateModule {
                    module: descriptor.name,
                });
            }
            store
                .index
                .insert(descriptor.name.clone(), store.descriptors.len());
            store.descriptors.push(descriptor);
        }

        Ok(store)
    }

    /// Get a descriptor by name
    pub fn get(&self, name: &str) -> ResolveResult<&ModuleDescriptor> {
        self.index
            .get(name)
            .map(|&i| &self.descriptors[i])
            .ok_or_else(|| ResolveError::not_found(name))
    }

    /// Check whether a module is described
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All descriptors in insertion order
    pub fn all(&self) -> &[ModuleDescriptor] {
        &self.descriptors
    }

    /// Module names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.descriptors.iter().map(|d| d.name.as_str())
    }

    /// Union of every descriptor's runtime-loaded modules
    pub fn dynamic_modules(&self) -> BTreeSet<&str> {
        self.descriptors
            .iter()
            .flat_map(|d| d.dynamic_modules.iter().map(String::as_str))
            .collect()
    }

    /// Number of descriptors
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
