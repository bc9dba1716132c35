//! Workspace - the module plus everything derived from its configuration.
//!
//! Commands open a workspace once and hand its parts to the operations.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::binder::ImportRoots;
use crate::core::module::{DependencyRef, Module};
use crate::core::package_path::PackagePath;
use crate::toolchain::ToolchainError;
use crate::util::fs::relative_path;
use crate::util::{Config, GlobalContext};

/// A loaded module with its merged configuration.
#[derive(Debug)]
pub struct Workspace {
    module: Module,
    config: Config,
    staging_dir: PathBuf,
}

impl Workspace {
    /// Open the workspace enclosing the context's working directory.
    pub fn open(ctx: &GlobalContext) -> Result<Self> {
        let root = ctx.find_module_root()?;
        let module = Module::load(&root)?;
        let config = ctx.load_config(module.root());
        Ok(Workspace::new(module, config))
    }

    /// Assemble a workspace from parts.
    pub fn new(module: Module, config: Config) -> Self {
        let staging_dir = module.root().join(config.staging_dir());
        Workspace {
            module,
            config,
            staging_dir,
        }
    }

    /// The module.
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Merged configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Module root directory.
    pub fn root(&self) -> &Path {
        self.module.root()
    }

    /// Staging directory holding dependency links and generated files.
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Import path under which a package's generated bindings are compiled.
    ///
    /// The staging directory lives inside the module, so its generated Go
    /// sources are importable as `<module>/<staging>/<package>`.
    pub fn binding_import_path(&self, package: &PackagePath) -> String {
        let staging = relative_path(self.root(), &self.staging_dir);
        let staging: Vec<_> = staging
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        format!("{}/{}/{}", self.module.name(), staging.join("/"), package)
    }

    /// The module providing the GX standard library, at the version GX tools run at.
    pub fn stdlib(&self) -> Result<DependencyRef> {
        let version = self
            .config
            .toolchain
            .gx_version
            .as_deref()
            .or_else(|| self.module.gx_version())
            .ok_or(ToolchainError::UnknownGxVersion)?;
        Ok(DependencyRef::new(self.config.stdlib_module(), version))
    }

    /// Roots GX imports of this workspace resolve from.
    pub fn import_roots(&self) -> Result<ImportRoots> {
        Ok(ImportRoots {
            local: self.root().to_path_buf(),
            stdlib: self.stdlib()?,
        })
    }
}
