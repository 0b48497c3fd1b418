//! Descriptor file loading
//!
//! Descriptor files hold a list of module records, either as TOML
//! (`[[module]]` tables) or JSON (an object with a `modules` array, or a
//! bare array). Directories are walked recursively; files are read in path
//! order so the resulting snapshot is the same on every run.

use crate::descriptor::ModuleDescriptor;
use crate::error::{ResolveError, ResolveResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Contents of one descriptor file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DescriptorFile {
    /// Module records in file order
    #[serde(default, rename = "module", alias = "modules")]
    pub modules: Vec<ModuleDescriptor>,
}

impl DescriptorFile {
    /// Parse TOML descriptor content
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Parse JSON descriptor content
    ///
    /// A top-level array is a bare list of records; anything else must be an
    /// object with a `modules` array.
    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        if content.trim_start().starts_with('[') {
            Ok(Self {
                modules: serde_json::from_str(content)?,
            })
        } else {
            serde_json::from_str(content)
        }
    }

    /// Load a descriptor file, choosing the format by extension
    pub fn load(path: &Path) -> ResolveResult<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| ResolveError::descriptor_read(path, e))?;

        match extension(path).as_deref() {
            Some("toml") => {
                Self::from_toml_str(&content).map_err(|e| ResolveError::descriptor_parse(path, e))
            }
            Some("json") => {
                Self::from_json_str(&content).map_err(|e| ResolveError::descriptor_parse(path, e))
            }
            _ => Err(ResolveError::descriptor_parse(
                path,
                "unsupported descriptor format (expected .toml or .json)",
            )),
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
}

/// Collects descriptors from files and directories
#[derive(Debug, Clone)]
pub struct DescriptorLoader {
    /// File extensions picked up while walking directories
    extensions: Vec<String>,
}

impl DescriptorLoader {
    /// Create a loader accepting `.toml` and `.json` files
    pub fn new() -> Self {
        Self {
            extensions: vec!["toml".to_string(), "json".to_string()],
        }
    }

    /// Restrict the extensions picked up while walking directories
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| {
                let e: String = e.into();
                e.trim_start_matches('.').to_ascii_lowercase()
            })
            .collect();
        self
    }

    /// Load every descriptor reachable from the given paths, in order
    pub fn load_paths(&self, paths: &[PathBuf]) -> ResolveResult<Vec<ModuleDescriptor>> {
        let mut descriptors = Vec::new();

        for path in paths {
            for file in self.discover(path)? {
                let loaded = DescriptorFile::load(&file)?;
                debug!(
                    "Loaded {} descriptors from {}",
                    loaded.modules.len(),
                    file.display()
                );
                descriptors.extend(loaded.modules);
            }
        }

        Ok(descriptors)
    }

    /// Expand a path into the descriptor files it names
    ///
    /// A file is taken as-is regardless of extension; a directory is walked
    /// for files with an accepted extension, sorted by path.
    pub fn discover(&self, path: &Path) -> ResolveResult<Vec<PathBuf>> {
        if !path.exists() {
            return Err(ResolveError::descriptor_read(path, "path does not exist"));
        }

        if path.is_file() {
            return Ok(vec![path.to_path_buf()]);
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(path).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(|e| ResolveError::descriptor_read(path, e))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let accepted = extension(entry.path())
                .map(|ext| self.extensions.contains(&ext))
                .unwrap_or(false);
            if accepted {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }
}

impl Default for DescriptorLoader {
    fn default() -> Self {
        Self::new()
    }
}
