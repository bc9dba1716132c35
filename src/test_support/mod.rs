//! Test utilities and mocks for ccgx unit tests.
//!
//! The host toolchain and the GX tools are external processes; the doubles
//! here stand in for them so that every stage can run in a temporary
//! directory without Go installed.

pub mod fixtures;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;

use crate::binder::{
    BindError, Binder, BindingFile, BuildService, ImportRoots, PackageIr, Packager,
};
use crate::core::PackagePath;
use crate::toolchain::{HostToolchain, ToolchainError};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Host toolchain double recording every call.
///
/// `mod_init` writes a minimal go.mod so the module can be loaded
/// afterwards; every other operation only records itself.
#[derive(Debug, Default)]
pub struct MockToolchain {
    cache_root: PathBuf,
    calls: Mutex<Vec<String>>,
    archive_failure: Option<String>,
}

impl MockToolchain {
    /// A toolchain reporting `cache_root` as its module cache.
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        MockToolchain {
            cache_root: cache_root.into(),
            ..Default::default()
        }
    }

    /// Make `build_archive` fail with `stderr`.
    pub fn fail_archive(mut self, stderr: impl Into<String>) -> Self {
        self.archive_failure = Some(stderr.into());
        self
    }

    /// Calls made so far, as `"<operation> <args...>"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl HostToolchain for MockToolchain {
    fn cache_root(&self) -> Result<PathBuf> {
        Ok(self.cache_root.clone())
    }

    fn mod_init(&self, root: &Path, name: &str) -> Result<()> {
        self.record(format!("mod_init {} {}", root.display(), name));
        std::fs::write(root.join("go.mod"), format!("module {}\n\ngo 1.24\n", name))?;
        Ok(())
    }

    fn tidy(&self, root: &Path) -> Result<()> {
        self.record(format!("tidy {}", root.display()));
        Ok(())
    }

    fn build_archive(&self, root: &Path, source: &Path, output: &Path) -> Result<()> {
        self.record(format!(
            "build_archive {} {} {}",
            root.display(),
            source.display(),
            output.display()
        ));
        if let Some(stderr) = &self.archive_failure {
            return Err(ToolchainError::Failed {
                command: "go build -buildmode=c-archive".to_string(),
                code: Some(1),
                stderr: stderr.clone(),
            }
            .into());
        }
        Ok(())
    }

    fn build_header(&self, root: &Path, source: &Path, output: &Path) -> Result<()> {
        self.record(format!(
            "build_header {} {} {}",
            root.display(),
            source.display(),
            output.display()
        ));
        Ok(())
    }
}

/// In-memory GX compiler, binder and packager.
///
/// Binding a package yields `<name>.h` and `<name>.cc` whose contents
/// depend only on the package path.
#[derive(Debug, Default)]
pub struct MockGx {
    build_failures: HashMap<String, String>,
    extra_outputs: Vec<String>,
    built: Mutex<Vec<String>>,
    packed: Mutex<Vec<String>>,
}

impl MockGx {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make building `package` fail with `diagnostic`.
    pub fn fail_build(mut self, package: &str, diagnostic: &str) -> Self {
        self.build_failures
            .insert(package.to_string(), diagnostic.to_string());
        self
    }

    /// Emit an additional file for every package.
    pub fn with_extra_output(mut self, name: &str) -> Self {
        self.extra_outputs.push(name.to_string());
        self
    }

    /// Packages built so far.
    pub fn built(&self) -> Vec<String> {
        self.built.lock().unwrap().clone()
    }

    /// Packages packed so far.
    pub fn packed(&self) -> Vec<String> {
        self.packed.lock().unwrap().clone()
    }
}

impl BuildService for MockGx {
    fn build(&self, package: &PackagePath, _roots: &ImportRoots) -> Result<PackageIr> {
        self.built.lock().unwrap().push(package.to_string());
        if let Some(diagnostic) = self.build_failures.get(package.as_str()) {
            return Err(BindError::Build {
                package: package.clone(),
                diagnostic: diagnostic.clone(),
            }
            .into());
        }
        Ok(PackageIr::new(package.clone()))
    }
}

impl Binder for MockGx {
    fn bind(&self, ir: &PackageIr) -> Result<Vec<BindingFile>> {
        let name = ir.name();
        let mut files = vec![
            BindingFile::new(
                format!("{}.h", name),
                format!("// {}\n#pragma once\nvoid {}_init();\n", ir.package(), name),
            ),
            BindingFile::new(
                format!("{}.cc", name),
                format!("#include \"{}.h\"\nvoid {}_init() {{}}\n", name, name),
            ),
        ];
        for extra in &self.extra_outputs {
            files.push(BindingFile::new(extra.clone(), Vec::new()));
        }
        Ok(files)
    }
}

impl Packager for MockGx {
    fn pack(&self, package: &PackagePath, _roots: &ImportRoots) -> Result<()> {
        self.packed.lock().unwrap().push(package.to_string());
        Ok(())
    }
}
