//! Test fixtures: throwaway modules on disk.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::manifest::GoMod;
use crate::core::{DependencyRef, Module, Workspace};
use crate::util::Config;

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

/// A module rooted at `root` requiring `deps`, without touching the disk.
pub fn module_with_deps(root: &Path, deps: &[(&str, &str)]) -> Module {
    Module::from_go_mod(
        root.to_path_buf(),
        GoMod {
            module: "example.org/app".to_string(),
            go: None,
            require: deps
                .iter()
                .map(|(path, version)| DependencyRef::new(*path, *version))
                .collect(),
        },
    )
}

/// A module in a temporary directory, plus a module cache next to it.
pub struct ProjectFixture {
    _tmp: TempDir,
    root: PathBuf,
    cache: PathBuf,
}

impl ProjectFixture {
    /// A module named `name` with no requirements.
    pub fn new(name: &str) -> Self {
        Self::with_go_mod(&format!("module {}\n\ngo 1.24\n", name))
    }

    /// A module with the given go.mod contents.
    pub fn with_go_mod(go_mod: &str) -> Self {
        let tmp = TempDir::new().unwrap();
        // Canonical so it matches what Module::load reports.
        let base = tmp.path().canonicalize().unwrap();
        let root = base.join("proj");
        let cache = base.join("modcache");
        std::fs::create_dir_all(&cache).unwrap();
        write_file(&root.join("go.mod"), go_mod);
        ProjectFixture {
            _tmp: tmp,
            root,
            cache,
        }
    }

    /// Module root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Default staging directory.
    pub fn staging(&self) -> PathBuf {
        self.root.join(crate::util::config::DEFAULT_STAGING_DIR)
    }

    /// Write a file relative to the module root.
    pub fn file(&self, rel: &str, content: &str) {
        write_file(&self.root.join(rel), content);
    }

    /// Create `path@version` in the fixture's module cache and return the cache root.
    pub fn cache_entry(&self, path: &str, version: &str) -> PathBuf {
        let dir = self.cache.join(format!("{}@{}", path, version));
        write_file(&dir.join("go.mod"), &format!("module {}\n", path));
        self.cache.clone()
    }

    /// Load the module from disk.
    pub fn module(&self) -> Module {
        Module::load(&self.root).unwrap()
    }

    /// Load the module into a workspace with `config`.
    pub fn workspace(&self, config: Config) -> Workspace {
        Workspace::new(self.module(), config)
    }
}
