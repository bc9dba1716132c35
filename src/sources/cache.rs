//! Module cache lookup.
//!
//! Dependencies are never fetched by ccgx itself. The host toolchain
//! downloads them into its shared module cache (`ccgx tidy`), and ccgx only
//! locates the extracted directory for each `path@version`.

use std::path::PathBuf;

use anyhow::Result;
use miette::Diagnostic;
use thiserror::Error;

use crate::core::DependencyRef;
use crate::util::config::ToolchainSettings;

/// A dependency resolved to its directory in the module cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub dependency: DependencyRef,
    pub path: PathBuf,
}

/// Errors locating a dependency in the module cache.
#[derive(Debug, Error, Diagnostic)]
pub enum CacheError {
    #[error("cannot find GX module `{dependency}`: {} does not exist", path.display())]
    #[diagnostic(
        code(ccgx::cache::not_found),
        help("Run `ccgx tidy` to download missing modules, then `ccgx link`")
    )]
    NotFound {
        dependency: DependencyRef,
        path: PathBuf,
    },

    #[error("cannot use GX module `{dependency}`: {} is not a directory", path.display())]
    #[diagnostic(
        code(ccgx::cache::not_a_directory),
        help("Run `ccgx tidy` to download missing modules, then `ccgx link`")
    )]
    NotADirectory {
        dependency: DependencyRef,
        path: PathBuf,
    },
}

/// Maps dependency coordinates to on-disk directories.
pub trait CacheResolver {
    /// Locate `dependency`, checking that its directory exists.
    fn resolve(&self, dependency: &DependencyRef) -> Result<CacheEntry, CacheError>;
}

/// The host toolchain's module cache, laid out as `<root>/<path>@<version>`.
#[derive(Debug, Clone)]
pub struct ModuleCache {
    root: PathBuf,
}

impl ModuleCache {
    /// Use the cache rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ModuleCache { root: root.into() }
    }

    /// Find the cache root: the configured one if set, otherwise the one
    /// `query` obtains from the host toolchain. `query` is not called when
    /// the root is configured, so linking works without Go installed.
    pub fn locate<F>(settings: &ToolchainSettings, query: F) -> Result<Self>
    where
        F: FnOnce() -> Result<PathBuf>,
    {
        let root = match &settings.cache_root {
            Some(root) => root.clone(),
            None => query()?,
        };
        tracing::debug!("Module cache at {}", root.display());
        Ok(ModuleCache::new(root))
    }

    /// Where `dependency` is extracted, whether or not it exists.
    pub fn entry_path(&self, dependency: &DependencyRef) -> PathBuf {
        let name = format!(
            "{}@{}",
            escape_path(dependency.path()),
            escape_path(dependency.version())
        );
        let mut path = self.root.clone();
        for part in name.split('/') {
            path.push(part);
        }
        path
    }
}

impl CacheResolver for ModuleCache {
    fn resolve(&self, dependency: &DependencyRef) -> Result<CacheEntry, CacheError> {
        let path = self.entry_path(dependency);
        // Follows symlinks: a cache entry may itself be a link.
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => Ok(CacheEntry {
                dependency: dependency.clone(),
                path,
            }),
            Ok(_) => Err(CacheError::NotADirectory {
                dependency: dependency.clone(),
                path,
            }),
            Err(_) => Err(CacheError::NotFound {
                dependency: dependency.clone(),
                path,
            }),
        }
    }
}

/// Escape a module path or version for use on case-insensitive filesystems:
/// every upper-case letter becomes `!` followed by its lower-case form.
pub fn escape_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            escaped.push('!');
            escaped.push(c.to_ascii_lowercase());
        } else {
            escaped.push(c);
        }
    }
    escaped
}
