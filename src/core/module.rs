//! In-memory model of the current Go/GX module.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::manifest::{parse_go_mod, GoMod, ManifestError, MANIFEST_FILE};
use crate::core::package_path::PackagePath;
use crate::util::config::GX_MODULE;

/// A versioned module coordinate, e.g. `github.com/gx-org/gx@v0.3.0`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DependencyRef {
    path: String,
    version: String,
}

impl DependencyRef {
    /// Create a new coordinate.
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        DependencyRef {
            path: path.into(),
            version: version.into(),
        }
    }

    /// Module path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Module version.
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for DependencyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.path, self.version)
    }
}

/// The module being built: its root, its name and what it requires.
///
/// Created once per invocation and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Module {
    root: PathBuf,
    name: String,
    dependencies: Vec<DependencyRef>,
}

impl Module {
    /// Build a module from an already-parsed manifest. No I/O.
    pub fn from_go_mod(root: PathBuf, gomod: GoMod) -> Self {
        Module {
            root,
            name: gomod.module,
            dependencies: gomod.require,
        }
    }

    /// Load the module rooted at `root` by reading its `go.mod`.
    pub fn load(root: &Path) -> Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("failed to resolve module root: {}", root.display()))?;
        if !root.is_dir() {
            return Err(ManifestError::BadRoot { path: root }.into());
        }

        let manifest_path = root.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&manifest_path)
            .with_context(|| format!("failed to read {}", manifest_path.display()))?;
        let gomod = parse_go_mod(&content)
            .with_context(|| format!("failed to parse {}", manifest_path.display()))?;

        tracing::debug!(
            "Loaded module `{}` at {} ({} requirements)",
            gomod.module,
            root.display(),
            gomod.require.len()
        );
        Ok(Module::from_go_mod(root, gomod))
    }

    /// Absolute module root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Module path declared in go.mod.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Required modules, in manifest order.
    pub fn dependencies(&self) -> &[DependencyRef] {
        &self.dependencies
    }

    /// Look up the required version of a module.
    pub fn dependency(&self, path: &str) -> Option<&DependencyRef> {
        self.dependencies.iter().find(|d| d.path() == path)
    }

    /// Version of the GX toolchain this module requires.
    pub fn gx_version(&self) -> Option<&str> {
        self.dependency(GX_MODULE).map(DependencyRef::version)
    }

    /// Map a directory inside the module to the package it holds.
    ///
    /// Returns `None` for directories outside the module root or with
    /// components that are not plain UTF-8 names.
    pub fn package_path_for(&self, dir: &Path) -> Option<PackagePath> {
        let rel = dir.strip_prefix(&self.root).ok()?;

        let mut path = self.name.clone();
        for component in rel.components() {
            match component {
                Component::Normal(part) => {
                    path.push('/');
                    path.push_str(part.to_str()?);
                }
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(PackagePath::new(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn module(root: &str, name: &str) -> Module {
        Module::from_go_mod(
            PathBuf::from(root),
            GoMod {
                module: name.to_string(),
                go: None,
                require: vec![DependencyRef::new(GX_MODULE, "v0.3.0")],
            },
        )
    }

    #[test]
    fn test_package_path_for() {
        let m = module("/proj", "example.org/app");
        assert_eq!(
            m.package_path_for(Path::new("/proj")),
            Some(PackagePath::new("example.org/app"))
        );
        assert_eq!(
            m.package_path_for(Path::new("/proj/models/mlp")),
            Some(PackagePath::new("example.org/app/models/mlp"))
        );
        assert_eq!(m.package_path_for(Path::new("/elsewhere/pkg")), None);
    }

    #[test]
    fn test_gx_version() {
        let m = module("/proj", "app");
        assert_eq!(m.gx_version(), Some("v0.3.0"));
        assert_eq!(DependencyRef::new("example.org/m", "v1.0.0").to_string(), "example.org/m@v1.0.0");
    }

    #[test]
    fn test_load() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("go.mod"),
            "module helloworld\n\ngo 1.24\n\nrequire github.com/gx-org/gx v0.3.0\n",
        )
        .unwrap();

        let m = Module::load(tmp.path()).unwrap();
        assert!(m.root().is_absolute());
        assert_eq!(m.name(), "helloworld");
        assert_eq!(m.dependencies().len(), 1);
    }

    #[test]
    fn test_load_without_manifest() {
        let tmp = TempDir::new().unwrap();
        let err = Module::load(tmp.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("go.mod"));
    }
}
