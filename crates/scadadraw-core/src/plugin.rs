//! Plugin manifest loading.
//!
//! A manifest lists plugin packages by path. Each path is looked up in a
//! [`PluginCatalog`] of compiled-in registration functions and run once, in
//! manifest order, against the registry.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::ElementRegistry;

/// Errors raised while loading plugins.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed manifest: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Unknown plugin `{0}`")]
    UnknownPlugin(String),
}

/// Result type for plugin loading.
pub type LoaderResult<T> = Result<T, LoaderError>;

/// One manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginPackage {
    pub path: String,
}

/// `{ "packages": [{ "path": ... }] }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    #[serde(default)]
    pub packages: Vec<PluginPackage>,
}

impl PluginManifest {
    pub fn new(paths: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            packages: paths.into_iter().map(|path| PluginPackage { path: path.into() }).collect(),
        }
    }

    pub fn from_json(json: &str) -> LoaderResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> LoaderResult<Self> {
        let json = fs::read_to_string(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// Registration function of one plugin.
pub type RegisterFn = fn(&mut ElementRegistry);

/// Plugin path → registration function.
#[derive(Debug, Clone, Default)]
pub struct PluginCatalog {
    plugins: HashMap<String, RegisterFn>,
}

impl PluginCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<String>, register: RegisterFn) -> &mut Self {
        self.plugins.insert(path.into(), register);
        self
    }

    pub fn get(&self, path: &str) -> Option<RegisterFn> {
        self.plugins.get(path).copied()
    }
}

/// Run every plugin named by `manifest`, in order. A path listed twice is
/// only run once. Returns the number of plugins run.
///
/// Stops at the first unknown path; plugins before it stay registered.
pub fn load_all(
    manifest: &PluginManifest,
    catalog: &PluginCatalog,
    registry: &mut ElementRegistry,
) -> LoaderResult<usize> {
    let mut loaded = HashSet::new();
    for package in &manifest.packages {
        if !loaded.insert(package.path.as_str()) {
            log::debug!("Plugin `{}` already loaded", package.path);
            continue;
        }
        let register = catalog
            .get(&package.path)
            .ok_or_else(|| LoaderError::UnknownPlugin(package.path.clone()))?;
        let before = registry.len();
        register(registry);
        log::info!(
            "Loaded plugin `{}` ({} new element kinds)",
            package.path,
            registry.len().saturating_sub(before)
        );
    }
    registry.mark_populated();
    Ok(loaded.len())
}
