//! Binding generation for GX packages.
//!
//! The GX compiler and binder are external services. ccgx drives them
//! through three seams:
//!
//! - [`BuildService`] compiles a package into a [`PackageIr`],
//! - [`Binder`] turns a `PackageIr` into C++ header/source buffers,
//! - [`Packager`] generates the Go package embedding a GX package.
//!
//! [`GxTool`] implements all three by running the GX tools through the Go
//! toolchain. Tests substitute in-memory doubles.

pub mod gx;
pub mod hooks;

use std::path::{Path, PathBuf};

use anyhow::Result;
use miette::Diagnostic;
use tempfile::TempDir;
use thiserror::Error;

use crate::core::{DependencyRef, PackagePath};

pub use gx::GxTool;
pub use hooks::{hook_fn, BuildFileHook, HookContext, PostBindHook};

/// Errors raised while building or binding a package.
#[derive(Debug, Error, Diagnostic)]
pub enum BindError {
    #[error("failed to build GX package `{package}`:\n{}", diagnostic.trim_end())]
    #[diagnostic(code(ccgx::bind::build))]
    Build {
        package: PackagePath,
        diagnostic: String,
    },

    #[error("failed to bind GX package `{package}`:\n{}", diagnostic.trim_end())]
    #[diagnostic(code(ccgx::bind::bind))]
    Bind {
        package: PackagePath,
        diagnostic: String,
    },

    #[error("binder produced unexpected outputs for `{package}`: expected one header and one source, found [{}]", found.join(", "))]
    #[diagnostic(code(ccgx::bind::unexpected_outputs))]
    UnexpectedOutputs {
        package: PackagePath,
        found: Vec<String>,
    },
}

/// Where imports of a package are resolved from.
#[derive(Debug, Clone)]
pub struct ImportRoots {
    /// Local filesystem root (the module root).
    pub local: PathBuf,
    /// Module providing the GX standard library.
    pub stdlib: DependencyRef,
}

/// A compiled GX package, ready to be bound.
#[derive(Debug)]
pub struct PackageIr {
    package: PackagePath,
    workdir: Option<TempDir>,
}

impl PackageIr {
    /// An IR with no backing files.
    pub fn new(package: PackagePath) -> Self {
        PackageIr {
            package,
            workdir: None,
        }
    }

    /// An IR whose artifacts live in a scratch directory, removed on drop.
    pub fn with_workdir(package: PackagePath, workdir: TempDir) -> Self {
        PackageIr {
            package,
            workdir: Some(workdir),
        }
    }

    /// The package this IR was built from.
    pub fn package(&self) -> &PackagePath {
        &self.package
    }

    /// Package name (last path segment).
    pub fn name(&self) -> &str {
        self.package.name()
    }

    /// Scratch directory holding the build artifacts, if any.
    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_ref().map(TempDir::path)
    }
}

/// Kind of a generated binding file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Header,
    Source,
}

impl OutputKind {
    /// Classify a generated file by its name.
    pub fn from_file_name(name: &str) -> Self {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        match ext {
            "h" | "hh" | "hpp" | "hxx" => OutputKind::Header,
            _ => OutputKind::Source,
        }
    }
}

/// One generated binding file, held in memory until written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingFile {
    pub kind: OutputKind,
    pub name: String,
    pub contents: Vec<u8>,
}

impl BindingFile {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        BindingFile {
            kind: OutputKind::from_file_name(&name),
            name,
            contents: contents.into(),
        }
    }

    /// Path of this file under `target`: `<target>/<package path>/<name>`.
    pub fn path_in(&self, target: &Path, ir: &PackageIr) -> PathBuf {
        target.join(ir.package().to_rel_path()).join(&self.name)
    }
}

/// The files written for one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingOutput {
    pub package: PackagePath,
    pub header: PathBuf,
    pub source: PathBuf,
}

/// Compiles GX packages.
pub trait BuildService {
    /// Build `package`, resolving its imports from `roots`.
    ///
    /// Compiler diagnostics are returned verbatim as [`BindError::Build`].
    fn build(&self, package: &PackagePath, roots: &ImportRoots) -> Result<PackageIr>;
}

/// Generates C++ bindings from compiled packages.
pub trait Binder {
    /// The generated files for `ir`, in the binder's order.
    fn bind(&self, ir: &PackageIr) -> Result<Vec<BindingFile>>;
}

/// Generates the Go package embedding a GX package.
pub trait Packager {
    fn pack(&self, package: &PackagePath, roots: &ImportRoots) -> Result<()>;
}
